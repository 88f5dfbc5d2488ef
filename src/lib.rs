/*!
 * dzcp - parallel zero-copy duplication of very large files
 *
 * Splits one file into fixed-size blocks, deals the blocks round-robin to N
 * worker threads and moves every block kernel-side with sendfile(2). A
 * benchmark mode sweeps worker counts and block sizes from a cold page cache
 * to find the fastest setting for the machine.
 */

pub mod cli_style;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod output;

// Re-export commonly used types
pub use config::{LogConfig, LogLevel, ShiftValue, TransferRequest};
pub use crate::core::{
    find_optimal_settings, perform_copy, BenchmarkReport, BenchmarkRun, TransferResult,
};
pub use error::{DzcpError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Whether the zero-copy primitive is available on this platform
pub fn is_zero_copy_available() -> bool {
    crate::core::ZeroCopyCapabilities::detect().available
}
