/*!
 * Page-cache flushing for cold benchmark measurements
 *
 * Flushing is a privileged operation provided by the kernel; dzcp only
 * invokes it. The privilege check runs once, before a benchmark sweep starts.
 */

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DzcpError, Result};

/// Kernel control file that drops clean page-cache, dentry and inode entries
pub const DROP_CACHES_PATH: &str = "/proc/sys/vm/drop_caches";

/// Forces the next read of a file to come from storage rather than memory
pub trait CacheFlusher: Send + Sync {
    fn flush(&self) -> Result<()>;
}

/// Writes `3` to [`DROP_CACHES_PATH`]
#[derive(Debug, Clone)]
pub struct DropCaches {
    control: PathBuf,
}

impl DropCaches {
    pub fn new() -> Self {
        Self {
            control: PathBuf::from(DROP_CACHES_PATH),
        }
    }

    /// Use a different control file (tests)
    pub fn with_control_path(control: impl Into<PathBuf>) -> Self {
        Self {
            control: control.into(),
        }
    }

    pub fn control_path(&self) -> &Path {
        &self.control
    }
}

impl Default for DropCaches {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheFlusher for DropCaches {
    fn flush(&self) -> Result<()> {
        // drop_caches only discards clean pages
        #[cfg(unix)]
        unsafe {
            libc::sync();
        }

        let mut control = OpenOptions::new()
            .write(true)
            .open(&self.control)
            .map_err(DzcpError::CacheFlush)?;
        control.write_all(b"3").map_err(DzcpError::CacheFlush)?;

        debug!("dropped page cache via {}", self.control.display());
        Ok(())
    }
}

/// Leaves the cache alone; for warm-cache sweeps and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFlusher;

impl CacheFlusher for NoopFlusher {
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Fail unless the effective user is root
pub fn require_root() -> Result<()> {
    if is_root() {
        Ok(())
    } else {
        Err(DzcpError::PermissionDenied(
            "you need to be root to run with -o".to_string(),
        ))
    }
}

pub fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_drop_caches_writes_three() {
        let dir = tempdir().unwrap();
        let control = dir.path().join("drop_caches");
        fs::write(&control, b"").unwrap();

        let flusher = DropCaches::with_control_path(&control);
        flusher.flush().unwrap();
        assert_eq!(fs::read(&control).unwrap(), b"3");
    }

    #[test]
    fn test_missing_control_file_is_fatal() {
        let dir = tempdir().unwrap();
        let flusher = DropCaches::with_control_path(dir.path().join("absent/drop_caches"));
        assert!(matches!(flusher.flush(), Err(DzcpError::CacheFlush(_))));
    }

    #[test]
    fn test_default_control_path() {
        assert_eq!(DropCaches::default().control_path(), Path::new(DROP_CACHES_PATH));
    }

    #[test]
    fn test_require_root_matches_euid() {
        assert_eq!(require_root().is_ok(), is_root());
        if !is_root() {
            assert!(matches!(require_root(), Err(DzcpError::PermissionDenied(_))));
        }
    }

    #[test]
    fn test_noop_flusher() {
        assert!(NoopFlusher.flush().is_ok());
    }
}
