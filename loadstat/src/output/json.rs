use serde::Serialize;
use std::io::Write as _;
use std::sync::Arc;

use loadstat_core::{MetricsSnapshot, ProgressFn, ProgressUpdate, ThresholdViolation};

use super::{OutputFormatter, SummaryView};

pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn progress(&self) -> Option<ProgressFn> {
        Some(Arc::new(move |u| {
            let line = build_progress_line(&u);
            emit_json_line(&line);
        }))
    }

    fn print_summary(&self, view: &SummaryView<'_>) -> anyhow::Result<()> {
        let line = build_summary_line(view);
        emit_json_line(&line);
        Ok(())
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct JsonSnapshot {
    pub total_requests: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub error_count: u64,
    pub success_rate_percent: f64,
    pub average_response_time_ms: f64,
    pub min_response_time_ms: u64,
    pub max_response_time_ms: u64,
    pub p90_ms: u64,
    pub p95_ms: u64,
    pub p99_ms: u64,
    pub throughput_per_second: f64,
}

impl From<&MetricsSnapshot> for JsonSnapshot {
    fn from(s: &MetricsSnapshot) -> Self {
        Self {
            total_requests: s.total_requests,
            success_count: s.success_count,
            failure_count: s.failure_count,
            error_count: s.error_count,
            success_rate_percent: s.success_rate_percent,
            average_response_time_ms: s.average_response_time_ms,
            min_response_time_ms: s.min_response_time_ms,
            max_response_time_ms: s.max_response_time_ms,
            p90_ms: s.p90,
            p95_ms: s.p95,
            p99_ms: s.p99,
            throughput_per_second: s.throughput_per_second,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonProgressLine {
    pub kind: &'static str,
    pub tick: u64,
    pub elapsed_secs: f64,
    pub scenario: String,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub snapshot: JsonSnapshot,
}

fn build_progress_line(u: &ProgressUpdate) -> JsonProgressLine {
    JsonProgressLine {
        kind: "progress",
        tick: u.tick,
        elapsed_secs: u.elapsed.as_secs_f64(),
        scenario: u.scenario.clone(),
        is_final: u.is_final,
        snapshot: JsonSnapshot::from(&u.snapshot),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonLabel {
    pub label: String,
    #[serde(flatten)]
    pub snapshot: JsonSnapshot,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonViolation {
    pub metric: String,
    pub op: String,
    pub limit: f64,
    pub observed: f64,
}

impl From<&ThresholdViolation> for JsonViolation {
    fn from(v: &ThresholdViolation) -> Self {
        Self {
            metric: v.metric.to_string(),
            op: v.op.to_string(),
            limit: v.limit,
            observed: v.observed,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonReplay {
    pub matched: bool,
    pub workers: usize,
    pub live: Vec<JsonLabel>,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonSummaryLine {
    pub kind: &'static str,
    pub source: String,
    pub window_start_ms: i64,
    pub window_end_ms: i64,
    pub duration_ms: i64,
    pub skipped_rows: usize,
    pub overall: JsonSnapshot,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<JsonLabel>,
    pub thresholds_passed: bool,
    pub threshold_violations: Vec<JsonViolation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replay: Option<JsonReplay>,
}

fn build_summary_line(view: &SummaryView<'_>) -> JsonSummaryLine {
    let report = view.report;

    let labels = if view.by_label {
        report
            .by_label
            .iter()
            .map(|l| JsonLabel {
                label: l.label.clone(),
                snapshot: JsonSnapshot::from(&l.snapshot),
            })
            .collect()
    } else {
        Vec::new()
    };

    JsonSummaryLine {
        kind: "summary",
        source: view.source.display().to_string(),
        window_start_ms: report.window.start_ms,
        window_end_ms: report.window.end_ms,
        duration_ms: report.window.duration_ms(),
        skipped_rows: report.skipped_rows,
        overall: JsonSnapshot::from(&report.overall),
        labels,
        thresholds_passed: view.violations.is_empty(),
        threshold_violations: view.violations.iter().map(JsonViolation::from).collect(),
        replay: view.replay.as_ref().map(|r| JsonReplay {
            matched: r.matched,
            workers: r.workers,
            live: r
                .live
                .iter()
                .map(|(scenario, s)| JsonLabel {
                    label: scenario.clone(),
                    snapshot: JsonSnapshot::from(s),
                })
                .collect(),
        }),
    }
}

fn emit_json_line<T: Serialize>(line: &T) {
    let mut out = std::io::stdout().lock();
    if serde_json::to_writer(&mut out, line).is_ok() {
        let _ = writeln!(out);
    }
}
