use std::sync::Arc;

use anyhow::Context as _;

use loadstat_core::{
    ALL_SCENARIO, CollectorRegistry, MetricsSnapshot, ProgressTicker, ReplayOptions, Report,
    ResultLog,
};

use crate::cli::ReplayArgs;
use crate::command_error::CommandError;
use crate::exit_codes::ExitCode;
use crate::output::{self, ReplayView, SummaryView};

pub async fn replay(args: ReplayArgs) -> Result<ExitCode, CommandError> {
    if args.workers == 0 {
        return Err(loadstat_core::Error::InvalidWorkers.into());
    }

    let log = ResultLog::read(&args.log)?;
    let report = Report::from_log(&log);

    let out = output::formatter(args.output);
    let registry = Arc::new(CollectorRegistry::new());
    let ticker = out
        .progress()
        .map(|f| ProgressTicker::spawn(registry.clone(), args.progress_interval, f));

    let options = ReplayOptions {
        workers: args.workers,
        by_label: args.by_label,
    };
    let replay_registry = registry.clone();
    let joined = tokio::task::spawn_blocking(move || {
        loadstat_core::replay(&log.records, options, &replay_registry)
    })
    .await;

    let ticks = match ticker {
        Some(t) => t.stop().await,
        None => 0,
    };

    let stats = joined
        .context("replay task failed")
        .map_err(CommandError::RuntimeError)??;

    let live = registry.snapshots();
    let matched = live_matches_report(&live, &report, args.by_label);
    tracing::info!(
        records = stats.records,
        workers = stats.workers,
        ticks,
        matched,
        "replay finished"
    );

    out.print_summary(&SummaryView {
        source: &args.log,
        report: &report,
        by_label: args.by_label,
        violations: &[],
        replay: Some(ReplayView {
            matched,
            workers: stats.workers,
            live: &live,
        }),
    })
    .map_err(CommandError::RuntimeError)?;

    Ok(ExitCode::from_quality_gates(false, !matched))
}

fn live_matches_report(
    live: &[(String, MetricsSnapshot)],
    report: &Report,
    by_label: bool,
) -> bool {
    if by_label {
        live.len() == report.by_label.len()
            && live
                .iter()
                .all(|(label, s)| report.label(label) == Some(s))
    } else {
        match live {
            [] => report.overall.is_empty(),
            [(scenario, s)] => scenario == ALL_SCENARIO && *s == report.overall,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadstat_core::{LogRecord, Sample};

    fn report() -> Report {
        let records: Vec<LogRecord> = [Sample::success(10, 0), Sample::failure(20, 5)]
            .into_iter()
            .zip(["a", "b"])
            .map(|(s, l)| LogRecord::from_sample(s).with_label(l))
            .collect();
        Report::from_records(&records)
    }

    #[test]
    fn overall_parity_requires_single_all_scenario() {
        let report = report();
        let live = vec![(ALL_SCENARIO.to_string(), report.overall)];
        assert!(live_matches_report(&live, &report, false));

        let renamed = vec![("other".to_string(), report.overall)];
        assert!(!live_matches_report(&renamed, &report, false));
    }

    #[test]
    fn label_parity_compares_each_label() {
        let report = report();
        let live: Vec<_> = report
            .by_label
            .iter()
            .map(|l| (l.label.clone(), l.snapshot))
            .collect();
        assert!(live_matches_report(&live, &report, true));

        let mut off = live.clone();
        off[0].1.total_requests += 1;
        assert!(!live_matches_report(&off, &report, true));
        assert!(!live_matches_report(&live[..1], &report, true));
    }

    #[test]
    fn empty_log_matches_empty_registry() {
        assert!(live_matches_report(&[], &Report::default(), false));
    }
}
