use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    HumanReadable,
    /// Emit JSON lines (NDJSON) to stdout.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "loadstat",
    author,
    version,
    about = "Recompute load-test statistics from persisted result logs",
    long_about = "loadstat re-derives request counts, success rate, latency percentiles and throughput from a comma-delimited result log (one row per request), without re-running the test.\n\nThe log needs a header row; only the `timeStamp`, `elapsed` and `success` columns are required. Malformed rows are skipped.",
    after_help = "Examples:\n  loadstat report results.jtl\n  loadstat report results.jtl --by-label --output json\n  loadstat report results.jtl --config thresholds.yaml\n  loadstat replay results.jtl --workers 8 --progress-interval 500ms\n\nSet RUST_LOG=debug to see skipped rows."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute statistics from a result log
    Report(ReportArgs),

    /// Feed a result log through live collectors and compare with the batch report
    #[command(
        long_about = "Replay every row of a result log through concurrent live collectors, as the execution engine would while a test runs, printing progress snapshots.\n\nThe final live snapshots must equal the batch report; a mismatch exits with code 13."
    )]
    Replay(ReplayArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Path to the result log
    pub log: PathBuf,

    /// Also report statistics per label
    #[arg(long)]
    pub by_label: bool,

    /// YAML file with pass/fail thresholds
    #[arg(long, short = 'c', env = "LOADSTAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Path to the result log
    pub log: PathBuf,

    /// Number of concurrent producer threads
    #[arg(long, default_value_t = 4)]
    pub workers: usize,

    /// Interval between progress snapshots (e.g. 1s, 250ms)
    #[arg(long, value_parser = humantime::parse_duration, default_value = "1s")]
    pub progress_interval: Duration,

    /// One live collector per label
    #[arg(long)]
    pub by_label: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}
