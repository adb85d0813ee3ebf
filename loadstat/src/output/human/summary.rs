use std::fmt::Write as _;

use loadstat_core::{MetricsSnapshot, ProgressUpdate};

use super::format::*;
use crate::output::SummaryView;

pub(crate) fn render(view: &SummaryView<'_>) -> String {
    let mut out = String::new();
    let report = view.report;

    writeln!(&mut out, "source: {}", view.source.display()).ok();
    writeln!(&mut out, "window: {}", format_window(report.window)).ok();
    if report.skipped_rows > 0 {
        writeln!(&mut out, "skipped rows: {}", report.skipped_rows).ok();
    }
    out.push('\n');

    if report.overall.is_empty() {
        out.push_str("summary: no requests\n");
    } else {
        out.push_str("overall\n");
        render_snapshot(&report.overall, &mut out);
    }

    if view.by_label {
        for l in &report.by_label {
            out.push('\n');
            writeln!(&mut out, "label: {}", l.label).ok();
            render_snapshot(&l.snapshot, &mut out);
        }
    }

    if let Some(replay) = &view.replay {
        out.push('\n');
        writeln!(
            &mut out,
            "replay: workers={} scenarios={} {}",
            replay.workers,
            replay.live.len(),
            if replay.matched {
                "matches batch report"
            } else {
                "MISMATCH"
            }
        )
        .ok();
        if !replay.matched {
            for (scenario, s) in replay.live {
                writeln!(&mut out, "live scenario: {scenario}").ok();
                render_snapshot(s, &mut out);
            }
        }
    }

    out
}

fn render_snapshot(s: &MetricsSnapshot, out: &mut String) {
    writeln!(
        out,
        "  requests: {} (success {}, failed {}, errors {})",
        s.total_requests, s.success_count, s.failure_count, s.error_count
    )
    .ok();
    writeln!(out, "  success rate: {}", format_percent(s.success_rate_percent)).ok();
    writeln!(
        out,
        "  latency = avg={} min={} p90={} p95={} p99={} max={}",
        format_ms_f64(s.average_response_time_ms),
        format_ms(s.min_response_time_ms),
        format_ms(s.p90),
        format_ms(s.p95),
        format_ms(s.p99),
        format_ms(s.max_response_time_ms),
    )
    .ok();
    writeln!(out, "  throughput: {} req/s", format_rate(s.throughput_per_second)).ok();
}

pub(crate) fn render_progress(u: &ProgressUpdate) -> String {
    let s = &u.snapshot;
    format!(
        "{}scenario={} elapsed={} requests={} success={} avg={} p95={} rps={}",
        if u.is_final { "final " } else { "" },
        u.scenario,
        humantime::format_duration(std::time::Duration::from_millis(
            u64::try_from(u.elapsed.as_millis()).unwrap_or(u64::MAX)
        )),
        s.total_requests,
        format_percent(s.success_rate_percent),
        format_ms_f64(s.average_response_time_ms),
        format_ms(s.p95),
        format_rate(s.throughput_per_second),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadstat_core::{LogRecord, Report, Sample};
    use std::path::Path;
    use std::time::Duration;

    fn report() -> Report {
        let records: Vec<LogRecord> = [
            Sample::success(100, 0),
            Sample::failure(300, 500),
            Sample::success(200, 1_800),
        ]
        .into_iter()
        .zip(["a", "b", "a"])
        .map(|(s, l)| LogRecord::from_sample(s).with_label(l))
        .collect();
        Report::from_records(&records)
    }

    #[test]
    fn renders_overall_and_labels() {
        let report = report();
        let out = render(&SummaryView {
            source: Path::new("run.jtl"),
            report: &report,
            by_label: true,
            violations: &[],
            replay: None,
        });

        assert!(out.contains("source: run.jtl"));
        assert!(out.contains("overall\n  requests: 3 (success 2, failed 1, errors 0)"));
        assert!(out.contains("success rate: 66.67%"));
        assert!(out.contains("label: a\n"));
        assert!(out.contains("label: b\n"));
        assert!(out.contains("throughput: 1.50 req/s"));
    }

    #[test]
    fn renders_empty_report() {
        let report = Report::default();
        let out = render(&SummaryView {
            source: Path::new("empty.jtl"),
            report: &report,
            by_label: false,
            violations: &[],
            replay: None,
        });
        assert!(out.contains("summary: no requests"));
    }

    #[test]
    fn renders_progress_line() {
        let line = render_progress(&ProgressUpdate {
            tick: 2,
            elapsed: Duration::from_millis(1_500),
            scenario: "all".to_string(),
            snapshot: report().overall,
            is_final: true,
        });
        assert!(line.starts_with("final scenario=all elapsed=1s 500ms requests=3"));
    }
}
