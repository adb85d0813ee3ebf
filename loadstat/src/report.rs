use loadstat_core::{Report, Thresholds};

use crate::cli::ReportArgs;
use crate::command_error::CommandError;
use crate::config_yaml;
use crate::exit_codes::ExitCode;
use crate::output::{self, SummaryView};

fn load_thresholds(config: Option<&std::path::Path>) -> Result<Thresholds, CommandError> {
    match config {
        Some(path) => config_yaml::load_thresholds(path).map_err(CommandError::InvalidInput),
        None => Ok(Thresholds::default()),
    }
}

fn read_report(log: &std::path::Path) -> Result<Report, CommandError> {
    Ok(Report::read(log)?)
}

pub fn report(args: ReportArgs) -> Result<ExitCode, CommandError> {
    let thresholds = load_thresholds(args.config.as_deref())?;
    let report = read_report(&args.log)?;

    let violations = thresholds.evaluate(&report.overall);
    tracing::info!(
        log = %args.log.display(),
        requests = report.overall.total_requests,
        skipped = report.skipped_rows,
        violations = violations.len(),
        "report assembled"
    );

    let out = output::formatter(args.output);
    out.print_summary(&SummaryView {
        source: &args.log,
        report: &report,
        by_label: args.by_label,
        violations: &violations,
        replay: None,
    })
    .map_err(CommandError::RuntimeError)?;

    Ok(ExitCode::from_quality_gates(!violations.is_empty(), false))
}
