/*!
 * Core copy engine
 *
 * Data flows strictly downward: benchmark -> transfer -> worker -> partition.
 */

pub mod benchmark;
pub mod cache;
pub mod partition;
pub mod probe;
pub mod transfer;
pub mod worker;
pub mod zero_copy;

#[cfg(all(test, unix))]
pub(crate) mod mock;

pub use benchmark::{
    find_optimal_settings, BenchmarkGrid, BenchmarkReport, BenchmarkRun, BenchmarkSearch,
    SweepEvent,
};
pub use cache::{require_root, CacheFlusher, DropCaches, NoopFlusher};
pub use partition::{assign_all, assignment_for, plan_ranges, ByteRange, WorkerAssignment};
pub use probe::logical_cpu_count;
pub use transfer::{perform_copy, perform_copy_with, TransferResult};
pub use worker::{run_worker, WorkerReport};
pub use zero_copy::{SendFile, ZeroCopy, ZeroCopyCapabilities};
