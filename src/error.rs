/*!
 * Error types for dzcp
 */

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DzcpError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FATAL: i32 = 1;

/// A single worker that terminated with a fatal transfer error
#[derive(Debug)]
pub struct WorkerFailure {
    pub worker: usize,
    pub error: DzcpError,
}

impl fmt::Display for WorkerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker {}: {}", self.worker, self.error)
    }
}

#[derive(Error, Debug)]
pub enum DzcpError {
    /// Bad arguments or an invalid request
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source file does not exist or cannot be inspected
    #[error("Source not found: {0}")]
    SourceNotFound(PathBuf),

    /// A privileged mode was requested without the required privilege
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Destination could not be prepared before fan-out
    #[error("Failed to prepare {}: {source}", .path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Fatal error inside one worker's transfer loop
    #[error("Transfer failed at offset {offset}: {source}")]
    Transfer {
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// One or more workers terminated with a fatal error
    #[error("{} of {total} workers failed; destination is incomplete ({})", .failed.len(), join_failures(.failed))]
    WorkersFailed {
        failed: Vec<WorkerFailure>,
        total: usize,
    },

    /// A worker thread could not be spawned or panicked
    #[error("Worker error: {0}")]
    Worker(String),

    /// Destination could not be removed between benchmark runs
    #[error("Failed to delete {}: {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The page cache could not be flushed
    #[error("Cache flush failed: {0}")]
    CacheFlush(#[source] io::Error),
}

fn join_failures(failed: &[WorkerFailure]) -> String {
    failed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error categories for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Setup,
    Transfer,
    Cleanup,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Setup => "setup",
            ErrorCategory::Transfer => "transfer",
            ErrorCategory::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

impl DzcpError {
    /// Get the process exit code for this error.
    ///
    /// Every error that reaches the top level is fatal.
    pub fn exit_code(&self) -> i32 {
        EXIT_FATAL
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DzcpError::Config(_)
            | DzcpError::SourceNotFound(_)
            | DzcpError::PermissionDenied(_) => ErrorCategory::Configuration,
            DzcpError::Setup { .. } | DzcpError::CacheFlush(_) => ErrorCategory::Setup,
            DzcpError::Transfer { .. } | DzcpError::WorkersFailed { .. } | DzcpError::Worker(_) => {
                ErrorCategory::Transfer
            }
            DzcpError::Cleanup { .. } => ErrorCategory::Cleanup,
        }
    }

    /// Suggestion shown under the error message, if any
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            DzcpError::PermissionDenied(_) | DzcpError::CacheFlush(_) => {
                Some("benchmark mode drops the page cache and must run as root")
            }
            DzcpError::WorkersFailed { .. } => {
                Some("the destination file is not a valid copy; rerun the transfer")
            }
            _ => None,
        }
    }
}

/// Interrupted or would-block: retried by the caller, never reported
pub fn is_transient_io(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(DzcpError::Config("bad".into()).exit_code(), EXIT_FATAL);
        assert_eq!(
            DzcpError::Cleanup {
                path: PathBuf::from("/tmp/x"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }
            .exit_code(),
            1
        );
        assert_eq!(EXIT_SUCCESS, 0);
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            DzcpError::PermissionDenied("root".into()).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            DzcpError::Setup {
                path: PathBuf::from("d"),
                source: io::Error::from(io::ErrorKind::NotFound),
            }
            .category(),
            ErrorCategory::Setup
        );
        assert_eq!(
            DzcpError::Transfer {
                offset: 0,
                source: io::Error::from(io::ErrorKind::Other),
            }
            .category(),
            ErrorCategory::Transfer
        );
        assert_eq!(ErrorCategory::Cleanup.to_string(), "cleanup");
    }

    #[test]
    fn test_transient_io_errors() {
        assert!(is_transient_io(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(is_transient_io(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(!is_transient_io(&io::Error::from(io::ErrorKind::BrokenPipe)));
        assert!(!is_transient_io(&io::Error::from(
            io::ErrorKind::UnexpectedEof
        )));
    }

    #[test]
    fn test_workers_failed_display() {
        let err = DzcpError::WorkersFailed {
            failed: vec![WorkerFailure {
                worker: 3,
                error: DzcpError::Transfer {
                    offset: 4096,
                    source: io::Error::new(io::ErrorKind::Other, "disk gone"),
                },
            }],
            total: 8,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("1 of 8 workers failed"));
        assert!(msg.contains("worker 3"));
        assert!(msg.contains("offset 4096"));
        assert!(err.hint().is_some());
    }
}
