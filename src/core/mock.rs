//! Scripted zero-copy primitive for testing
//!
//! Moves bytes with positional reads and plain writes so tests can exercise
//! short transfers, transient interruptions and fatal errors deterministically.

use super::zero_copy::ZeroCopy;
use std::fs::File;
use std::io::{self, Write};
use std::os::unix::fs::FileExt;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ScriptedCopy {
    /// Largest number of bytes moved per call (0 = no limit)
    pub max_chunk: usize,
    /// Fail every n-th call with EINTR or EAGAIN before moving any data (0 = never)
    pub interrupt_every: u64,
    /// Fail fatally once the source cursor reaches this offset
    pub fail_at: Option<u64>,
    pub(crate) calls: AtomicU64,
}

impl ScriptedCopy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn short(max_chunk: usize) -> Self {
        Self {
            max_chunk,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ZeroCopy for ScriptedCopy {
    fn transfer(
        &self,
        mut dest: &File,
        source: &File,
        offset: &mut u64,
        len: usize,
    ) -> io::Result<usize> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if self.interrupt_every > 0 && call % self.interrupt_every == 0 {
            let kind = if call % 2 == 0 {
                io::ErrorKind::Interrupted
            } else {
                io::ErrorKind::WouldBlock
            };
            return Err(io::Error::from(kind));
        }

        if let Some(at) = self.fail_at {
            if *offset >= at {
                return Err(io::Error::new(io::ErrorKind::Other, "scripted failure"));
            }
        }

        let want = if self.max_chunk > 0 {
            len.min(self.max_chunk)
        } else {
            len
        };
        let mut buf = vec![0u8; want];
        let n = source.read_at(&mut buf, *offset)?;
        dest.write_all(&buf[..n])?;
        *offset += n as u64;
        Ok(n)
    }

    fn method(&self) -> &'static str {
        "scripted"
    }
}
