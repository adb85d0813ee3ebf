use crate::snapshot::MetricsSnapshot;

/// Request counters feeding a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    pub errors: u64,
}

impl Counts {
    /// `success / total * 100`, `0` for an empty run.
    ///
    /// The denominator is never smaller than `success`, so any success yields
    /// a positive rate.
    #[must_use]
    pub fn success_rate_percent(&self) -> f64 {
        let total = self.total.max(self.success);
        if total == 0 {
            return 0.0;
        }
        (self.success as f64 / total as f64) * 100.0
    }
}

/// Wall-clock interval a run occupied, epoch milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl RunWindow {
    #[must_use]
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms() as f64 / 1000.0
    }
}

/// Requests per second over `window`.
///
/// A zero (or inverted) window reports `total` itself: a single, effectively
/// instantaneous batch still yields a meaningful number.
#[inline]
#[must_use]
pub fn throughput(total: u64, window: RunWindow) -> f64 {
    let secs = window.duration_secs();
    if secs <= 0.0 {
        return total as f64;
    }
    total as f64 / secs
}

/// Ceiling-rank index of percentile `p` (integer percent) in a sorted slice of length `n`.
///
/// `ceil(p / 100 * n) - 1`, clamped to `[0, n - 1]`. Integer arithmetic keeps
/// boundary counts exact (e.g. `n = 10, p = 90` is index 8).
#[must_use]
pub fn percentile_index(p: u32, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let p = u128::from(p.min(100));
    let rank = (p * n as u128).div_ceil(100);
    let idx = usize::try_from(rank).unwrap_or(usize::MAX).saturating_sub(1);
    idx.min(n - 1)
}

/// Percentile `p` of an ascending slice; `0` when empty.
#[must_use]
pub fn percentile(sorted: &[u64], p: u32) -> u64 {
    sorted
        .get(percentile_index(p, sorted.len()))
        .copied()
        .unwrap_or(0)
}

/// Builds a snapshot from counters and raw response times.
///
/// `response_times` need not be sorted; `sum` must equal their total.
pub(crate) fn compute(
    counts: Counts,
    mut response_times: Vec<u64>,
    sum: u128,
    window: RunWindow,
) -> MetricsSnapshot {
    response_times.sort_unstable();

    let n = response_times.len();
    let average_response_time_ms = if n == 0 {
        0.0
    } else {
        sum as f64 / n as f64
    };

    MetricsSnapshot {
        total_requests: counts.total,
        success_count: counts.success,
        failure_count: counts.failure,
        error_count: counts.errors,
        average_response_time_ms,
        min_response_time_ms: response_times.first().copied().unwrap_or(0),
        max_response_time_ms: response_times.last().copied().unwrap_or(0),
        p90: percentile(&response_times, 90),
        p95: percentile(&response_times, 95),
        p99: percentile(&response_times, 99),
        throughput_per_second: throughput(counts.total, window),
        success_rate_percent: counts.success_rate_percent(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_success(n: u64) -> Counts {
        Counts {
            total: n,
            success: n,
            ..Counts::default()
        }
    }

    #[test]
    fn percentile_index_uses_ceiling_rank() {
        assert_eq!(percentile_index(90, 10), 8);
        assert_eq!(percentile_index(99, 10), 9);
        assert_eq!(percentile_index(95, 20), 18);
        assert_eq!(percentile_index(50, 1), 0);
        assert_eq!(percentile_index(0, 5), 0);
        assert_eq!(percentile_index(100, 5), 4);
        assert_eq!(percentile_index(250, 5), 4);
        assert_eq!(percentile_index(90, 0), 0);
    }

    #[test]
    fn ten_sample_scenario() {
        let times = vec![100, 120, 130, 140, 150, 160, 170, 180, 190, 500];
        let sum = times.iter().map(|&v| u128::from(v)).sum();
        let s = compute(all_success(10), times, sum, RunWindow::new(0, 2_000));

        assert_eq!(s.p90, 190);
        assert_eq!(s.p95, 500);
        assert_eq!(s.p99, 500);
        assert_eq!(s.average_response_time_ms, 184.0);
        assert_eq!(s.success_rate_percent, 100.0);
        assert_eq!(s.min_response_time_ms, 100);
        assert_eq!(s.max_response_time_ms, 500);
        assert_eq!(s.throughput_per_second, 5.0);
    }

    #[test]
    fn unsorted_input_with_failures() {
        let times = vec![50, 60, 70, 9999, 80];
        let sum = times.iter().map(|&v| u128::from(v)).sum();
        let counts = Counts {
            total: 5,
            success: 3,
            failure: 2,
            errors: 0,
        };
        let s = compute(counts, times, sum, RunWindow::default());

        assert_eq!(s.success_rate_percent, 60.0);
        assert_eq!(s.max_response_time_ms, 9999);
        assert_eq!(s.p90, 9999);
        assert_eq!(s.min_response_time_ms, 50);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let s = compute(Counts::default(), Vec::new(), 0, RunWindow::default());
        assert_eq!(s, MetricsSnapshot::default());
        assert_eq!(s.success_rate_percent, 0.0);
    }

    #[test]
    fn single_sample_sets_every_percentile() {
        let s = compute(all_success(1), vec![42], 42, RunWindow::new(5, 5));
        assert_eq!((s.p90, s.p95, s.p99), (42, 42, 42));
        assert_eq!(s.throughput_per_second, 1.0);
    }

    #[test]
    fn all_failures_report_zero_rate() {
        let counts = Counts {
            total: 3,
            failure: 3,
            ..Counts::default()
        };
        let s = compute(counts, vec![1, 2, 3], 6, RunWindow::default());
        assert_eq!(s.success_rate_percent, 0.0);
        assert!(!s.success_rate_percent.is_nan());
    }

    #[test]
    fn success_rate_is_positive_whenever_a_success_exists() {
        let counts = Counts {
            total: 0,
            success: 1,
            ..Counts::default()
        };
        assert_eq!(counts.success_rate_percent(), 100.0);

        let counts = Counts {
            total: 1_000_000,
            success: 1,
            ..Counts::default()
        };
        assert!(counts.success_rate_percent() > 0.0);
    }

    #[test]
    fn throughput_handles_degenerate_windows() {
        assert_eq!(throughput(7, RunWindow::new(10, 10)), 7.0);
        assert_eq!(throughput(7, RunWindow::new(10, 5)), 7.0);
        assert_eq!(throughput(0, RunWindow::default()), 0.0);
        assert!((throughput(3, RunWindow::new(0, 1_500)) - 2.0).abs() < 1e-9);
    }
}
