/*!
 * Per-worker transfer loop
 *
 * Each worker opens its own read-only source handle and write-only
 * destination handle, so no file position is shared with any sibling. Ranges
 * are copied in order; the destination cursor is positioned explicitly before
 * every range because workers interleave into one file.
 */

use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, trace};

use super::partition::{ByteRange, WorkerAssignment};
use super::zero_copy::ZeroCopy;
use crate::error::{is_transient_io, DzcpError, Result};

/// What a worker did, returned when it finishes successfully
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub index: usize,
    pub ranges: usize,
    pub bytes: u64,
    /// Primitive invocations, including retried ones
    pub calls: u64,
    /// Interrupted or would-block results that were retried
    pub retries: u64,
}

/// Copy every range in `assignment` from `source` to `destination`.
///
/// The destination must already exist; it is opened without create or
/// truncate so blocks written by sibling workers are never discarded. Both
/// handles are closed when this returns, on success or failure.
pub fn run_worker(
    assignment: &WorkerAssignment,
    source: &Path,
    destination: &Path,
    primitive: &dyn ZeroCopy,
) -> Result<WorkerReport> {
    let source_file = File::open(source).map_err(|e| DzcpError::Setup {
        path: source.to_path_buf(),
        source: e,
    })?;
    let mut dest_file = OpenOptions::new()
        .write(true)
        .open(destination)
        .map_err(|e| DzcpError::Setup {
            path: destination.to_path_buf(),
            source: e,
        })?;

    let mut report = WorkerReport {
        index: assignment.index,
        ..Default::default()
    };

    debug!(
        "worker {}: {} ranges, {} bytes via {}",
        assignment.index,
        assignment.ranges.len(),
        assignment.total_bytes(),
        primitive.method()
    );

    for range in &assignment.ranges {
        copy_range(range, &mut dest_file, &source_file, primitive, &mut report)?;
        report.ranges += 1;
    }

    debug!(
        "worker {}: done, {} calls, {} retries",
        report.index, report.calls, report.retries
    );
    Ok(report)
}

fn copy_range(
    range: &ByteRange,
    dest: &mut File,
    source: &File,
    primitive: &dyn ZeroCopy,
    report: &mut WorkerReport,
) -> Result<()> {
    dest.seek(SeekFrom::Start(range.offset))
        .map_err(|e| DzcpError::Transfer {
            offset: range.offset,
            source: e,
        })?;

    let end = range.end();
    let mut offset = range.offset;

    while offset < end {
        let remaining = usize::try_from(end - offset).unwrap_or(usize::MAX);
        report.calls += 1;

        match primitive.transfer(dest, source, &mut offset, remaining) {
            Ok(0) => {
                return Err(DzcpError::Transfer {
                    offset,
                    source: io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "source ended before the range was copied",
                    ),
                });
            }
            Ok(n) => report.bytes += n as u64,
            // No backoff and no cap: the same call is simply issued again
            Err(e) if is_transient_io(&e) => {
                report.retries += 1;
                trace!("worker {}: retrying at {}: {}", report.index, offset, e);
            }
            Err(e) => return Err(DzcpError::Transfer { offset, source: e }),
        }
    }

    Ok(())
}
