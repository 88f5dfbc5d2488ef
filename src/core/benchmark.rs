/*!
 * Benchmark search over worker counts and block sizes
 *
 * Sweeps a grid of `cpu_count * k` workers (k = 1..=6) against the block-size
 * ladder 64 KiB .. 1 MiB (shift 6..=10), optionally from a cold page cache,
 * and ranks the runs by elapsed time.
 */

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use super::cache::CacheFlusher;
use super::transfer::{perform_copy_with, TransferResult};
use super::zero_copy::{SendFile, ZeroCopy};
use crate::config::{ShiftValue, TransferRequest};
use crate::error::{DzcpError, Result};

/// Upper bound on collected runs; the sweep stops early with a warning
pub const MAX_RUNS: usize = 1000;

/// Worker-count multipliers applied to the CPU count
pub const MAX_WORKERS_PER_CPU: usize = 6;

/// Block-size ladder, as shift values
pub const BLOCK_SHIFTS: [u32; 5] = [6, 7, 8, 9, 10];

/// Runs shown at each end of the ranking
pub const REPORT_SIZE: usize = 5;

/// One grid cell's measurement
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkRun {
    pub shift: ShiftValue,
    #[serde(flatten)]
    pub result: TransferResult,
}

impl BenchmarkRun {
    pub fn worker_count(&self) -> usize {
        self.result.worker_count
    }

    pub fn block_size_kib(&self) -> u64 {
        self.result.block_size_kib()
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.result.elapsed_secs()
    }
}

/// Worker counts crossed with block sizes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkGrid {
    pub worker_counts: Vec<usize>,
    pub shifts: Vec<ShiftValue>,
}

impl BenchmarkGrid {
    /// The standard grid: `{cpu_count * k : k = 1..=6}` x shifts 6..=10
    pub fn for_cpus(cpu_count: usize) -> Self {
        let cpu_count = cpu_count.max(1);
        Self {
            worker_counts: (1..=MAX_WORKERS_PER_CPU).map(|k| cpu_count * k).collect(),
            shifts: BLOCK_SHIFTS.iter().map(|&s| ShiftValue(s)).collect(),
        }
    }

    /// Cells in sweep order: worker count outer, block size inner
    pub fn cells(&self) -> impl Iterator<Item = (usize, ShiftValue)> + '_ {
        self.worker_counts
            .iter()
            .flat_map(move |&w| self.shifts.iter().map(move |&s| (w, s)))
    }

    pub fn len(&self) -> usize {
        self.worker_counts.len() * self.shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Progress notifications emitted while sweeping
#[derive(Debug)]
pub enum SweepEvent<'a> {
    Starting {
        index: usize,
        total: usize,
        worker_count: usize,
        shift: ShiftValue,
    },
    Finished(&'a BenchmarkRun),
}

/// Runs sorted ascending by elapsed time
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    runs: Vec<BenchmarkRun>,
    /// True when the run cap stopped the sweep before the grid was exhausted
    pub truncated: bool,
}

impl BenchmarkReport {
    pub fn from_runs(mut runs: Vec<BenchmarkRun>, truncated: bool) -> Self {
        runs.sort_unstable_by_key(|r| r.result.elapsed);
        Self { runs, truncated }
    }

    pub fn runs(&self) -> &[BenchmarkRun] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn best(&self) -> Option<&BenchmarkRun> {
        self.runs.first()
    }

    /// The first `n` runs of the ranking, fastest first
    pub fn fastest(&self, n: usize) -> &[BenchmarkRun] {
        &self.runs[..n.min(self.runs.len())]
    }

    /// The last `n` runs of the ranking, slowest first
    pub fn slowest(&self, n: usize) -> impl Iterator<Item = &BenchmarkRun> {
        self.runs.iter().rev().take(n)
    }
}

/// A configured sweep over one source/destination pair
pub struct BenchmarkSearch<'a> {
    source: PathBuf,
    destination: PathBuf,
    grid: BenchmarkGrid,
    flusher: &'a dyn CacheFlusher,
    primitive: &'a dyn ZeroCopy,
    max_runs: usize,
}

impl<'a> BenchmarkSearch<'a> {
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        grid: BenchmarkGrid,
        flusher: &'a dyn CacheFlusher,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            grid,
            flusher,
            primitive: &SendFile,
            max_runs: MAX_RUNS,
        }
    }

    pub fn with_primitive(mut self, primitive: &'a dyn ZeroCopy) -> Self {
        self.primitive = primitive;
        self
    }

    pub fn with_max_runs(mut self, max_runs: usize) -> Self {
        self.max_runs = max_runs;
        self
    }

    pub fn grid(&self) -> &BenchmarkGrid {
        &self.grid
    }

    /// Sweep the grid and rank the results.
    ///
    /// Each cell flushes the cache, copies, then deletes the destination so
    /// the next cell starts from a freshly created file. Any fatal error aborts
    /// the remaining sweep.
    pub fn run(&self, mut on_event: impl FnMut(SweepEvent<'_>)) -> Result<BenchmarkReport> {
        let total = self.grid.len();
        let mut runs = Vec::with_capacity(total.min(self.max_runs));
        let mut truncated = false;

        for (index, (worker_count, shift)) in self.grid.cells().enumerate() {
            if runs.len() >= self.max_runs {
                warn!(
                    "exceeded maximum runs ({}), stopping sweep after {} of {} cells",
                    self.max_runs,
                    runs.len(),
                    total
                );
                truncated = true;
                break;
            }

            self.flusher.flush()?;

            on_event(SweepEvent::Starting {
                index,
                total,
                worker_count,
                shift,
            });
            info!(
                "testing with -p {} -s {} ({} KiB)",
                worker_count,
                shift,
                shift.block_size_kib()
            );

            let request = TransferRequest::new(
                &self.source,
                &self.destination,
                worker_count,
                shift.block_size(),
            )?;
            let result = perform_copy_with(&request, self.primitive)?;
            remove_destination(&self.destination)?;

            let run = BenchmarkRun { shift, result };
            on_event(SweepEvent::Finished(&run));
            runs.push(run);
        }

        Ok(BenchmarkReport::from_runs(runs, truncated))
    }
}

fn remove_destination(destination: &Path) -> Result<()> {
    fs::remove_file(destination).map_err(|e| DzcpError::Cleanup {
        path: destination.to_path_buf(),
        source: e,
    })
}

/// Sweep the standard grid for `cpu_count` with sendfile(2)
pub fn find_optimal_settings(
    source: &Path,
    destination: &Path,
    cpu_count: usize,
    flusher: &dyn CacheFlusher,
    on_event: impl FnMut(SweepEvent<'_>),
) -> Result<BenchmarkReport> {
    BenchmarkSearch::new(source, destination, BenchmarkGrid::for_cpus(cpu_count), flusher)
        .run(on_event)
}
