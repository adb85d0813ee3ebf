//! Batch-mode snapshot computation over a completed list of samples.
//!
//! Produces exactly what a [`Collector`](crate::Collector) would report had it
//! observed the same samples through [`Collector::record`](crate::Collector::record)
//! over the same run window.

use crate::calc::{self, Counts, RunWindow};
use crate::sample::{Outcome, Sample};
use crate::snapshot::MetricsSnapshot;

/// Wall-clock span the samples occupied: earliest start to latest completion.
/// Empty input yields an empty window at the epoch.
#[must_use]
pub fn window_of(samples: &[Sample]) -> RunWindow {
    let start = samples.iter().map(|s| s.timestamp_ms).min();
    let end = samples.iter().map(Sample::completed_at_ms).max();
    match (start, end) {
        (Some(start_ms), Some(end_ms)) => RunWindow::new(start_ms, end_ms),
        _ => RunWindow::default(),
    }
}

/// Snapshot over `samples`, with the run window reconstructed from their timestamps.
#[must_use]
pub fn assemble(samples: &[Sample]) -> MetricsSnapshot {
    assemble_within(samples, window_of(samples))
}

/// Snapshot over `samples` for an explicitly supplied run window.
#[must_use]
pub fn assemble_within(samples: &[Sample], window: RunWindow) -> MetricsSnapshot {
    let mut counts = Counts::default();
    let mut sum: u128 = 0;
    let mut response_times = Vec::with_capacity(samples.len());

    for s in samples {
        counts.total += 1;
        match s.outcome {
            Outcome::Success => counts.success += 1,
            Outcome::Failure => counts.failure += 1,
            Outcome::Unknown => {}
        }
        sum += u128::from(s.response_time_ms);
        response_times.push(s.response_time_ms);
    }

    calc::compute(counts, response_times, sum, window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Collector;

    fn ten_samples() -> Vec<Sample> {
        [100, 120, 130, 140, 150, 160, 170, 180, 190, 500]
            .into_iter()
            .enumerate()
            .map(|(i, ms)| Sample::success(ms, 1_000 + (i as i64) * 100))
            .collect()
    }

    #[test]
    fn empty_list_is_all_zero() {
        assert_eq!(assemble(&[]), MetricsSnapshot::default());
        assert_eq!(window_of(&[]), RunWindow::default());
    }

    #[test]
    fn ten_sample_scenario() {
        let s = assemble(&ten_samples());
        assert_eq!(s.total_requests, 10);
        assert_eq!(s.p90, 190);
        assert_eq!(s.p99, 500);
        assert_eq!(s.average_response_time_ms, 184.0);
        assert_eq!(s.success_rate_percent, 100.0);
        // 1000 .. (1900 + 500)
        assert!((s.throughput_per_second - 10.0 / 1.4).abs() < 1e-9);
    }

    #[test]
    fn percentiles_use_every_sample_not_only_successes() {
        let samples = vec![
            Sample::success(50, 0),
            Sample::success(60, 0),
            Sample::failure(70, 0),
            Sample::failure(9999, 0),
            Sample::success(80, 0),
        ];
        let s = assemble(&samples);
        assert_eq!(s.success_rate_percent, 60.0);
        assert_eq!(s.max_response_time_ms, 9999);
        assert_eq!(s.p95, 9999);
        assert_eq!(s.failure_count, 2);
    }

    #[test]
    fn unknown_outcomes_count_only_toward_total() {
        let samples = vec![
            Sample::new(10, Outcome::Unknown, 0),
            Sample::success(20, 0),
        ];
        let s = assemble(&samples);
        assert_eq!(s.total_requests, 2);
        assert_eq!(s.success_count, 1);
        assert_eq!(s.failure_count, 0);
        assert_eq!(s.success_rate_percent, 50.0);
    }

    #[test]
    fn input_is_left_untouched() {
        let samples = vec![Sample::success(30, 2), Sample::success(10, 1)];
        let before = samples.clone();
        let _ = assemble(&samples);
        assert_eq!(samples, before);
    }

    #[test]
    fn live_and_batch_paths_agree() {
        let samples = vec![
            Sample::success(120, 10_000),
            Sample::failure(35, 10_050),
            Sample::success(800, 10_100),
            Sample::success(120, 10_400),
            Sample::failure(5, 11_900),
            Sample::success(64, 12_000),
        ];
        let window = window_of(&samples);

        let collector = Collector::with_start(window.start_ms);
        for s in &samples {
            collector.record(s);
        }
        collector.mark_ended_at(window.end_ms);

        assert_eq!(collector.snapshot(), assemble(&samples));
        assert_eq!(collector.window(), window);
    }
}
