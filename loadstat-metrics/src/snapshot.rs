/// Point-in-time aggregate over a set of samples.
///
/// A pure value: recomputed from the underlying samples on every query and
/// replaced, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub error_count: u64,
    pub average_response_time_ms: f64,
    pub min_response_time_ms: u64,
    pub max_response_time_ms: u64,
    pub p90: u64,
    pub p95: u64,
    pub p99: u64,
    pub throughput_per_second: f64,
    /// 0..=100
    pub success_rate_percent: f64,
}

impl MetricsSnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_requests == 0
    }
}
