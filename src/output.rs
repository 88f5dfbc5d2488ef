//! Result reporting in human-readable and JSON modes.

use serde::Serialize;

use crate::cli_style::{self, Icons, Theme};
use crate::core::benchmark::REPORT_SIZE;
use crate::core::{BenchmarkReport, BenchmarkRun, TransferResult};

/// Output mode for CLI results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// JSON document for a benchmark sweep
#[derive(Debug, Serialize)]
struct BenchmarkSummary<'a> {
    runs: usize,
    truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    best: Option<&'a BenchmarkRun>,
    fastest: &'a [BenchmarkRun],
    slowest: Vec<&'a BenchmarkRun>,
}

#[derive(Debug, Serialize)]
struct ErrorDocument<'a> {
    success: bool,
    category: String,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'a str>,
}

/// Writes results either as styled text or as one JSON document per result
#[derive(Debug, Clone)]
pub struct OutputWriter {
    pub mode: OutputMode,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            mode: if json { OutputMode::Json } else { OutputMode::Human },
        }
    }

    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Announce a single copy before it starts (suppressed in JSON mode)
    pub fn starting(&self, worker_count: usize, block_size_kib: u64) {
        if !self.is_json() {
            println!(
                "Starting {} workers with a transfer size of {} KiB per block.",
                worker_count, block_size_kib
            );
        }
    }

    /// Announce one benchmark cell (suppressed in JSON mode)
    pub fn testing(&self, worker_count: usize, shift: u32, block_size_kib: u64) -> Option<String> {
        if self.is_json() {
            return None;
        }
        Some(format!(
            "Testing with -p {} -s {} ({} KiB)",
            worker_count, shift, block_size_kib
        ))
    }

    pub fn transfer_result(&self, result: &TransferResult) {
        match self.mode {
            OutputMode::Json => {
                if let Ok(json) = serde_json::to_string(result) {
                    println!("{}", json);
                }
            }
            OutputMode::Human => {
                if let Some(lines) = self.run_result(result) {
                    println!("{}", lines);
                }
                println!("{}", cli_style::transfer_summary_table(result));
            }
        }
    }

    /// Elapsed time and throughput of one copy, as two lines (suppressed in JSON mode)
    pub fn run_result(&self, result: &TransferResult) -> Option<String> {
        if self.is_json() {
            return None;
        }
        Some(format!(
            "Operation completed in {:.2} seconds.\n{} Throughput: {:.2} MiB/s",
            result.elapsed_secs(),
            Theme::primary(Icons::LIGHTNING),
            result.throughput_mib_s
        ))
    }

    pub fn benchmark_report(&self, report: &BenchmarkReport) {
        match self.mode {
            OutputMode::Json => {
                let summary = BenchmarkSummary {
                    runs: report.len(),
                    truncated: report.truncated,
                    best: report.best(),
                    fastest: report.fastest(REPORT_SIZE),
                    slowest: report.slowest(REPORT_SIZE).collect(),
                };
                if let Ok(json) = serde_json::to_string(&summary) {
                    println!("{}", json);
                }
            }
            OutputMode::Human => {
                if report.is_empty() {
                    cli_style::print_warning("No benchmark runs completed");
                    return;
                }
                if report.truncated {
                    cli_style::print_warning(&format!(
                        "Sweep stopped early after {} runs",
                        report.len()
                    ));
                }

                cli_style::section_header(&format!("Fastest {} runs:", REPORT_SIZE));
                for (i, run) in report.fastest(REPORT_SIZE).iter().enumerate() {
                    println!("{}", run_line(i + 1, run));
                }

                cli_style::section_header(&format!("Slowest {} runs:", REPORT_SIZE));
                for (i, run) in report.slowest(REPORT_SIZE).enumerate() {
                    println!("{}", run_line(i + 1, run));
                }

                println!();
                println!("{}", cli_style::benchmark_table(report.runs()));

                if let Some(best) = report.best() {
                    cli_style::print_success(&format!(
                        "Best setting: -p {} -s {}",
                        best.worker_count(),
                        best.shift
                    ));
                }
            }
        }
    }

    /// Print a fatal error with its category and hint
    pub fn error(&self, err: &crate::DzcpError) {
        match self.mode {
            OutputMode::Json => {
                let doc = ErrorDocument {
                    success: false,
                    category: err.category().to_string(),
                    error: sanitize_error(&err.to_string()),
                    hint: err.hint(),
                };
                if let Ok(json) = serde_json::to_string(&doc) {
                    eprintln!("{}", json);
                }
            }
            OutputMode::Human => {
                cli_style::print_error(&sanitize_error(&err.to_string()), err.hint());
            }
        }
    }

    /// Print an info message (suppressed in JSON mode)
    pub fn info(&self, msg: &str) {
        if !self.is_json() {
            cli_style::print_info(msg);
        }
    }
}

/// `Run i: -p N -s S (K KiB), T seconds`
pub fn run_line(rank: usize, run: &BenchmarkRun) -> String {
    format!(
        "Run {}: -p {} -s {} ({} KiB), {:.2} seconds",
        rank,
        run.worker_count(),
        run.shift,
        run.block_size_kib(),
        run.elapsed_secs()
    )
}

/// Sanitize error messages by collapsing whitespace
pub fn sanitize_error(msg: &str) -> String {
    msg.split_whitespace().collect::<Vec<&str>>().join(" ")
}
