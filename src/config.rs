/*!
 * Configuration types for dzcp
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::{Path, PathBuf};

use crate::error::{DzcpError, Result};

/// Workers started per logical CPU when `-p` is omitted
pub const DEFAULT_WORKERS_PER_CPU: usize = 4;

/// Block size encoded as `65536 * 2^(shift - 6)` bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ShiftValue(pub(crate) u32);

impl ShiftValue {
    /// Smallest accepted shift (64 KiB blocks)
    pub const MIN: u32 = 6;

    /// Largest accepted shift (1 GiB blocks)
    pub const MAX: u32 = 20;

    /// 1 MiB blocks
    pub const DEFAULT: ShiftValue = ShiftValue(10);

    pub fn new(shift: u32) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&shift) {
            return Err(DzcpError::Config(format!(
                "shift value {} out of range ({}..={})",
                shift,
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(shift))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn block_size(self) -> u64 {
        65536u64 << (self.0 - Self::MIN)
    }

    pub fn block_size_kib(self) -> u64 {
        self.block_size() / 1024
    }
}

impl Default for ShiftValue {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for ShiftValue {
    type Error = DzcpError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ShiftValue> for u32 {
    fn from(value: ShiftValue) -> Self {
        value.0
    }
}

impl fmt::Display for ShiftValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One source-to-destination copy with a fixed worker count and block size.
///
/// Built once per invocation (or once per benchmark grid cell) and never
/// mutated; every component that needs the block size receives it from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRequest {
    source: PathBuf,
    destination: PathBuf,
    worker_count: NonZeroUsize,
    block_size: NonZeroU64,
}

impl TransferRequest {
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        worker_count: usize,
        block_size: u64,
    ) -> Result<Self> {
        let worker_count = NonZeroUsize::new(worker_count)
            .ok_or_else(|| DzcpError::Config("worker count must be positive".to_string()))?;
        let block_size = NonZeroU64::new(block_size)
            .ok_or_else(|| DzcpError::Config("block size must be positive".to_string()))?;

        Ok(Self {
            source: source.into(),
            destination: destination.into(),
            worker_count,
            block_size,
        })
    }

    /// Apply command-line defaults: a missing or zero worker count becomes
    /// `4 * cpu_count`, a missing or zero shift becomes 10 (1 MiB).
    pub fn resolve(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        workers: Option<usize>,
        shift: Option<u32>,
        cpu_count: usize,
    ) -> Result<Self> {
        let workers = match workers {
            Some(n) if n > 0 => n,
            _ => DEFAULT_WORKERS_PER_CPU * cpu_count.max(1),
        };
        let shift = match shift {
            Some(s) if s > 0 => ShiftValue::new(s)?,
            _ => ShiftValue::DEFAULT,
        };
        Self::new(source, destination, workers, shift.block_size())
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count.get()
    }

    pub fn block_size(&self) -> u64 {
        self.block_size.get()
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    #[default]
    Warn,

    /// Info, warnings, and errors
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub level: LogLevel,

    /// Log file path (None = stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Shorthand for level = debug
    #[serde(default)]
    pub verbose: bool,
}
