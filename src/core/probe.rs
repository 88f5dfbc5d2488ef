/*!
 * System Probe - logical CPU detection
 *
 * Worker-count defaults and the benchmark grid both scale with the number of
 * logical processing units the OS reports.
 */

use std::thread;

use sysinfo::System;
use tracing::warn;

/// Number of logical CPUs, never less than 1.
///
/// Uses sysinfo first; falls back to `available_parallelism` (which honours
/// cgroup quotas) and finally to 1 if neither can tell.
pub fn logical_cpu_count() -> usize {
    let mut sys = System::new();
    sys.refresh_cpu_all();

    match sys.cpus().len() {
        0 => fallback_cpu_count(),
        n => n,
    }
}

fn fallback_cpu_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or_else(|e| {
            warn!(
                "failed to detect available parallelism: {}; assuming 1 CPU",
                e
            );
            1
        })
}
