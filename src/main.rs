/*!
 * dzcp CLI - parallel zero-copy file duplication
 */

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use dzcp::{
    cli_style,
    config::{LogConfig, LogLevel, TransferRequest},
    core::{
        find_optimal_settings, logical_cpu_count, perform_copy, require_root, BenchmarkGrid,
        DropCaches, SweepEvent, ZeroCopyCapabilities,
    },
    error::{Result, EXIT_FATAL, EXIT_SUCCESS},
    logging,
    output::OutputWriter,
};

#[derive(Parser)]
#[command(name = "dzcp")]
#[command(version, about = "Copy one large file in parallel with sendfile(2)", long_about = None)]
struct Cli {
    /// File to copy
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Where to write the copy (created or truncated)
    #[arg(value_name = "DESTINATION")]
    destination: PathBuf,

    /// Number of workers (0 = 4 x logical CPUs)
    #[arg(short = 'p', long = "workers", value_name = "N")]
    workers: Option<usize>,

    /// Block size as a shift: 65536 * 2^(S - 6) bytes (0 = 10, i.e. 1 MiB)
    #[arg(short = 's', long = "shift", value_name = "S")]
    shift: Option<u32>,

    /// Search for the fastest -p/-s combination from a cold cache (root only)
    #[arg(short = 'o', long = "optimize")]
    optimize: bool,

    /// Emit results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging (debug level)
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevelArg,

    /// Write JSON logs to this file instead of stderr
    #[arg(long = "log", value_name = "FILE")]
    log: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures
            let code = if e.use_stderr() { EXIT_FATAL } else { EXIT_SUCCESS };
            std::process::exit(code);
        }
    };

    let output = OutputWriter::new(cli.json);
    let code = match run(cli, &output) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            output.error(&e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli, output: &OutputWriter) -> Result<()> {
    let log_config = LogConfig {
        level: cli.log_level.into(),
        log_file: cli.log.clone(),
        verbose: cli.verbose,
    };
    if let Err(e) = logging::init_logging(&log_config) {
        cli_style::print_warning(&format!("Failed to initialize logging: {}", e));
    }

    if cli.optimize {
        require_root()?;
    }

    if !output.is_json() {
        cli_style::print_banner();
    }

    let caps = ZeroCopyCapabilities::detect();
    if caps.available {
        debug!("zero-copy via {}", caps.method);
    } else {
        cli_style::print_warning("sendfile(2) is not available on this platform");
    }

    let cpu_count = logical_cpu_count();

    if cli.optimize {
        if cli.workers.is_some() || cli.shift.is_some() {
            cli_style::print_warning("-p and -s are ignored with -o");
        }
        run_benchmark(&cli, cpu_count, output)
    } else {
        let request =
            TransferRequest::resolve(&cli.source, &cli.destination, cli.workers, cli.shift, cpu_count)?;
        output.starting(request.worker_count(), request.block_size() / 1024);

        let result = perform_copy(&request)?;
        output.transfer_result(&result);
        Ok(())
    }
}

fn run_benchmark(cli: &Cli, cpu_count: usize, output: &OutputWriter) -> Result<()> {
    let flusher = DropCaches::new();
    let total = BenchmarkGrid::for_cpus(cpu_count).len();

    output.info(&format!(
        "Sweeping {} combinations on {} logical CPUs",
        total, cpu_count
    ));

    let bar = sweep_progress(total as u64, output.is_json());
    let result = find_optimal_settings(
        &cli.source,
        &cli.destination,
        cpu_count,
        &flusher,
        |event| match event {
            SweepEvent::Starting {
                worker_count,
                shift,
                ..
            } => {
                if let Some(line) = output.testing(worker_count, shift.get(), shift.block_size_kib())
                {
                    bar.println(line);
                }
                bar.set_message(format!("-p {} -s {}", worker_count, shift));
            }
            SweepEvent::Finished(run) => {
                if let Some(lines) = output.run_result(&run.result) {
                    bar.println(lines);
                }
                bar.inc(1);
            }
        },
    );
    bar.finish_and_clear();

    let report = result?;
    output.benchmark_report(&report);
    Ok(())
}

fn sweep_progress(total: u64, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}
