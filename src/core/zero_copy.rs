/*!
 * Zero-copy transfer primitive
 *
 * Bytes move kernel-side from the source descriptor to the destination
 * descriptor without passing through a user-space buffer. On Linux this is
 * sendfile(2): the source offset is an explicit in/out cursor, the destination
 * is written at its current file position, which the caller controls with a seek.
 */

use std::fs::File;
use std::io;

/// Kernel-side copy between two open files
pub trait ZeroCopy: Send + Sync {
    /// Move up to `len` bytes from `source` starting at `*offset` to the
    /// current position of `dest`.
    ///
    /// Returns the number of bytes moved, which may be less than `len`, and
    /// advances `*offset` by that amount. `Ok(0)` means the source had no
    /// bytes at `*offset`.
    fn transfer(&self, dest: &File, source: &File, offset: &mut u64, len: usize)
        -> io::Result<usize>;

    /// Name of the underlying mechanism, for logs
    fn method(&self) -> &'static str;
}

/// Capabilities for zero-copy operations on this platform
#[derive(Debug, Clone)]
pub struct ZeroCopyCapabilities {
    pub available: bool,
    pub method: &'static str,
}

impl ZeroCopyCapabilities {
    /// Detect available zero-copy capabilities at runtime
    pub fn detect() -> Self {
        #[cfg(target_os = "linux")]
        {
            Self {
                available: true,
                method: "sendfile",
            }
        }

        #[cfg(not(target_os = "linux"))]
        {
            Self {
                available: false,
                method: "none",
            }
        }
    }
}

/// sendfile(2) on Linux
#[derive(Debug, Clone, Copy, Default)]
pub struct SendFile;

impl ZeroCopy for SendFile {
    fn transfer(
        &self,
        dest: &File,
        source: &File,
        offset: &mut u64,
        len: usize,
    ) -> io::Result<usize> {
        #[cfg(target_os = "linux")]
        {
            linux::sendfile(dest, source, offset, len)
        }

        #[cfg(not(target_os = "linux"))]
        {
            let _ = (dest, source, offset, len);
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "sendfile is only available on Linux",
            ))
        }
    }

    fn method(&self) -> &'static str {
        "sendfile"
    }
}

// ============================================================================
// Linux implementation using sendfile
// ============================================================================

#[cfg(target_os = "linux")]
mod linux {
    use std::fs::File;
    use std::io;
    use std::os::unix::io::AsRawFd;

    /// The kernel moves at most this many bytes per call
    const MAX_SENDFILE: usize = 0x7fff_f000;

    pub fn sendfile(dest: &File, source: &File, offset: &mut u64, len: usize) -> io::Result<usize> {
        let mut off = libc::off_t::try_from(*offset).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("offset {} exceeds off_t", offset),
            )
        })?;

        let n = unsafe {
            libc::sendfile(
                dest.as_raw_fd(),
                source.as_raw_fd(),
                &mut off as *mut libc::off_t,
                len.min(MAX_SENDFILE),
            )
        };

        if n < 0 {
            return Err(io::Error::last_os_error());
        }

        *offset = off as u64;
        Ok(n as usize)
    }
}
