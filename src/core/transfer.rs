/*!
 * Parallel transfer orchestration
 *
 * Creates the destination once, fans out one OS thread per worker, joins all
 * of them and measures the wall-clock time in between. Workers never create
 * or truncate the destination themselves.
 */

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};
use tracing::{error, info};

use super::partition::assignment_for;
use super::worker::{run_worker, WorkerReport};
use super::zero_copy::{SendFile, ZeroCopy};
use crate::config::TransferRequest;
use crate::error::{DzcpError, Result, WorkerFailure};

const MIB: f64 = 1024.0 * 1024.0;

/// Outcome of one orchestrated copy
#[derive(Debug, Clone, Serialize)]
pub struct TransferResult {
    pub worker_count: usize,
    pub block_size: u64,
    pub file_size: u64,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
    /// Zero for an empty file or an unmeasurably short run
    pub throughput_mib_s: f64,
    /// Primitive invocations across all workers
    pub calls: u64,
    /// Transient results retried across all workers
    pub retries: u64,
}

fn as_secs_f64<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl TransferResult {
    pub fn new(worker_count: usize, block_size: u64, file_size: u64, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        let throughput_mib_s = if file_size == 0 || secs <= 0.0 {
            0.0
        } else {
            file_size as f64 / secs / MIB
        };

        Self {
            worker_count,
            block_size,
            file_size,
            elapsed,
            throughput_mib_s,
            calls: 0,
            retries: 0,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn block_size_kib(&self) -> u64 {
        self.block_size / 1024
    }
}

/// Copy `request.source()` to `request.destination()` with sendfile(2)
pub fn perform_copy(request: &TransferRequest) -> Result<TransferResult> {
    perform_copy_with(request, &SendFile)
}

/// Copy with an explicit zero-copy primitive.
///
/// Every worker runs to completion or to its own fatal error; a failing worker
/// does not stop its siblings. Once all have been joined, any failure makes
/// the whole transfer fail with [`DzcpError::WorkersFailed`].
pub fn perform_copy_with(request: &TransferRequest, primitive: &dyn ZeroCopy) -> Result<TransferResult> {
    let file_size = source_size(request.source())?;
    prepare_destination(request.destination())?;

    let worker_count = request.worker_count();
    let block_size = request.block_size();

    info!(
        "copying {} bytes with {} workers, {} KiB blocks",
        file_size,
        worker_count,
        block_size / 1024
    );

    let start = Instant::now();
    let outcomes = run_workers(request, file_size, primitive);
    let elapsed = start.elapsed();

    let mut reports = Vec::with_capacity(worker_count);
    let mut failed = Vec::new();
    for (worker, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!("worker {} failed: {}", worker, e);
                failed.push(WorkerFailure { worker, error: e });
            }
        }
    }

    if !failed.is_empty() {
        return Err(DzcpError::WorkersFailed {
            failed,
            total: worker_count,
        });
    }

    let result = TransferResult {
        calls: reports.iter().map(|r| r.calls).sum(),
        retries: reports.iter().map(|r| r.retries).sum(),
        ..TransferResult::new(worker_count, block_size, file_size, elapsed)
    };

    info!(
        "completed in {:.2}s ({:.2} MiB/s)",
        result.elapsed_secs(),
        result.throughput_mib_s
    );
    Ok(result)
}

/// Spawn exactly `worker_count` threads and wait for all of them, in any order
fn run_workers(
    request: &TransferRequest,
    file_size: u64,
    primitive: &dyn ZeroCopy,
) -> Vec<Result<WorkerReport>> {
    let worker_count = request.worker_count();
    let block_size = request.block_size();
    let source = request.source();
    let destination = request.destination();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..worker_count)
            .map(|index| {
                thread::Builder::new()
                    .name(format!("dzcp-worker-{}", index))
                    .spawn_scoped(scope, move || {
                        let assignment = assignment_for(file_size, block_size, worker_count, index);
                        run_worker(&assignment, source, destination, primitive)
                    })
            })
            .collect();

        handles
            .into_iter()
            .map(|spawned| match spawned {
                Ok(handle) => handle
                    .join()
                    .unwrap_or_else(|_| Err(DzcpError::Worker("worker thread panicked".to_string()))),
                Err(e) => Err(DzcpError::Worker(format!("failed to spawn worker: {}", e))),
            })
            .collect()
    })
}

fn source_size(source: &Path) -> Result<u64> {
    let metadata = fs::metadata(source).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DzcpError::SourceNotFound(source.to_path_buf()),
        _ => DzcpError::Setup {
            path: source.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_file() {
        return Err(DzcpError::Config(format!(
            "{} is not a regular file",
            source.display()
        )));
    }
    Ok(metadata.len())
}

/// Create or truncate the destination and close it again.
///
/// Runs once, before any worker starts; workers reopen the file without
/// truncation.
pub fn prepare_destination(destination: &Path) -> Result<()> {
    File::create(destination).map_err(|e| DzcpError::Setup {
        path: destination.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
