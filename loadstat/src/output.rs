use std::path::Path;

use loadstat_core::{MetricsSnapshot, ProgressFn, Report, ThresholdViolation};

use crate::cli::OutputFormat;

mod human;
mod json;

/// Live snapshots of a replay and whether they matched the batch report.
pub(crate) struct ReplayView<'a> {
    pub matched: bool,
    pub workers: usize,
    pub live: &'a [(String, MetricsSnapshot)],
}

pub(crate) struct SummaryView<'a> {
    pub source: &'a Path,
    pub report: &'a Report,
    pub by_label: bool,
    pub violations: &'a [ThresholdViolation],
    pub replay: Option<ReplayView<'a>>,
}

pub(crate) trait OutputFormatter: Send + Sync {
    fn progress(&self) -> Option<ProgressFn>;
    fn print_summary(&self, view: &SummaryView<'_>) -> anyhow::Result<()>;
}

pub(crate) fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::HumanReadable => Box::new(human::HumanReadableOutput),
        OutputFormat::Json => Box::new(json::JsonOutput),
    }
}
