/*!
 * CLI Style System
 *
 * Styling helpers for terminal output: themed text, tables, and
 * human-readable byte and duration formatting.
 */

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::{style, StyledObject};

use crate::core::{BenchmarkRun, TransferResult};

// ============================================================================
// THEME COLORS
// ============================================================================

pub struct Theme;

impl Theme {
    /// Primary accent color (cyan)
    pub fn primary<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan()
    }

    pub fn success<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).green()
    }

    pub fn warning<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).yellow()
    }

    pub fn error<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).red()
    }

    pub fn muted<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).dim()
    }

    /// Header style (bold cyan)
    pub fn header<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan().bold()
    }
}

// ============================================================================
// ICONS
// ============================================================================

pub struct Icons;

impl Icons {
    pub const SUCCESS: &'static str = "✓";
    pub const ERROR: &'static str = "✗";
    pub const WARNING: &'static str = "⚠";
    pub const INFO: &'static str = "ℹ";
    pub const LIGHTNING: &'static str = "⚡";
    pub const ARROW_RIGHT: &'static str = "→";
}

// ============================================================================
// TABLES
// ============================================================================

/// Create a styled data table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Summary of a single transfer
pub fn transfer_summary_table(result: &TransferResult) -> Table {
    let mut table = create_table();
    table.set_header(vec![header_cell("Transfer Summary"), Cell::new("")]);

    table.add_row(vec![
        Cell::new("Workers"),
        Cell::new(result.worker_count.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Block Size"),
        Cell::new(format!("{} KiB", result.block_size_kib())),
    ]);
    table.add_row(vec![
        Cell::new("Total Size"),
        Cell::new(format_bytes(result.file_size))
            .fg(Color::White)
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Duration"),
        Cell::new(format_duration(result.elapsed_secs())),
    ]);
    table.add_row(vec![
        Cell::new("Throughput"),
        Cell::new(format!("{:.2} MiB/s", result.throughput_mib_s))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
    ]);

    if result.retries > 0 {
        table.add_row(vec![
            Cell::new("Retried Calls"),
            Cell::new(result.retries.to_string()).fg(Color::Yellow),
        ]);
    }

    table
}

/// Ranked benchmark runs; `rank` numbers each row starting at 1
pub fn benchmark_table<'a>(runs: impl IntoIterator<Item = &'a BenchmarkRun>) -> Table {
    let mut table = create_table();
    table.set_header(vec![
        header_cell("Run"),
        header_cell("-p"),
        header_cell("-s"),
        header_cell("Block"),
        header_cell("Elapsed"),
        header_cell("Throughput"),
    ]);

    for (rank, run) in runs.into_iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1).set_alignment(CellAlignment::Right),
            Cell::new(run.worker_count()).set_alignment(CellAlignment::Right),
            Cell::new(run.shift).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} KiB", run.block_size_kib())).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}s", run.elapsed_secs())).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2} MiB/s", run.result.throughput_mib_s))
                .fg(Color::DarkGrey)
                .set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Format bytes into human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let base = 1024.0_f64;
    let exp = (bytes_f.ln() / base.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);

    let value = bytes_f / base.powi(exp as i32);

    if exp == 0 {
        format!("{} {}", bytes, UNITS[exp])
    } else {
        format!("{:.2} {}", value, UNITS[exp])
    }
}

/// Format duration into human-readable string
pub fn format_duration(secs: f64) -> String {
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.2}s", secs)
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        let remaining = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining)
    } else {
        let hours = (secs / 3600.0).floor();
        let mins = ((secs % 3600.0) / 60.0).floor();
        format!("{}h {}m", hours, mins)
    }
}

/// Print a styled error message with optional suggestion
pub fn print_error(message: &str, suggestion: Option<&str>) {
    eprintln!(
        "{} {}",
        Theme::error(format!("{} Error:", Icons::ERROR)),
        message
    );

    if let Some(hint) = suggestion {
        eprintln!(
            "  {} {}",
            Theme::muted(Icons::ARROW_RIGHT),
            Theme::muted(hint)
        );
    }
}

pub fn print_warning(message: &str) {
    eprintln!(
        "{} {}",
        Theme::warning(Icons::WARNING.to_string()),
        Theme::warning(message)
    );
}

pub fn print_success(message: &str) {
    println!(
        "{} {}",
        Theme::success(Icons::SUCCESS.to_string()),
        Theme::success(message)
    );
}

pub fn print_info(message: &str) {
    println!("{} {}", Theme::primary(Icons::INFO.to_string()), message);
}

/// Print a section title followed by a blank-line separator
pub fn section_header(title: &str) {
    println!();
    println!("{}", Theme::header(title));
}

/// One-line startup banner
pub fn print_banner() {
    println!(
        "{} {}",
        Theme::header(format!("{} dzcp", Icons::LIGHTNING)),
        Theme::muted(format!("v{} parallel zero-copy", env!("CARGO_PKG_VERSION")))
    );
}
