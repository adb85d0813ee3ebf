use std::fmt;

use loadstat_metrics::MetricsSnapshot;

use crate::{Error, Result};

/// Raw, unvalidated pass/fail limits. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdsConfig {
    pub min_success_rate_percent: Option<f64>,
    pub max_average_response_time_ms: Option<f64>,
    /// Percentile limits may be fractional; a percentile is a whole number of
    /// milliseconds, so `250.5` behaves like `250`.
    pub max_p90_ms: Option<f64>,
    pub max_p95_ms: Option<f64>,
    pub max_p99_ms: Option<f64>,
    pub min_throughput_per_second: Option<f64>,
    pub max_error_count: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ThresholdMetric {
    SuccessRatePercent,
    AverageResponseTimeMs,
    P90Ms,
    P95Ms,
    P99Ms,
    ThroughputPerSecond,
    ErrorCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdOp {
    Lte,
    Gte,
}

impl ThresholdOp {
    fn passes(self, observed: f64, limit: f64) -> bool {
        match self {
            Self::Lte => observed <= limit,
            Self::Gte => observed >= limit,
        }
    }
}

impl fmt::Display for ThresholdOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lte => "<=",
            Self::Gte => ">=",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdViolation {
    pub metric: ThresholdMetric,
    pub op: ThresholdOp,
    pub limit: f64,
    pub observed: f64,
}

impl fmt::Display for ThresholdViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} (observed {})",
            self.metric, self.op, self.limit, self.observed
        )
    }
}

/// Validated pass/fail limits for a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Thresholds {
    checks: Vec<(ThresholdMetric, ThresholdOp, f64)>,
}

impl Thresholds {
    pub fn new(cfg: ThresholdsConfig) -> Result<Self> {
        let mut checks = Vec::new();

        if let Some(v) = cfg.min_success_rate_percent {
            if !(0.0..=100.0).contains(&v) {
                return Err(invalid(
                    ThresholdMetric::SuccessRatePercent,
                    format!("must be within 0..=100, got {v}"),
                ));
            }
            checks.push((ThresholdMetric::SuccessRatePercent, ThresholdOp::Gte, v));
        }
        for (metric, v) in [
            (
                ThresholdMetric::AverageResponseTimeMs,
                cfg.max_average_response_time_ms,
            ),
            (ThresholdMetric::P90Ms, cfg.max_p90_ms),
            (ThresholdMetric::P95Ms, cfg.max_p95_ms),
            (ThresholdMetric::P99Ms, cfg.max_p99_ms),
        ] {
            if let Some(v) = v {
                checks.push((metric, ThresholdOp::Lte, non_negative(metric, v)?));
            }
        }
        if let Some(v) = cfg.max_error_count {
            checks.push((ThresholdMetric::ErrorCount, ThresholdOp::Lte, v as f64));
        }
        if let Some(v) = cfg.min_throughput_per_second {
            checks.push((
                ThresholdMetric::ThroughputPerSecond,
                ThresholdOp::Gte,
                non_negative(ThresholdMetric::ThroughputPerSecond, v)?,
            ));
        }

        Ok(Self { checks })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    #[must_use]
    pub fn evaluate(&self, s: &MetricsSnapshot) -> Vec<ThresholdViolation> {
        self.checks
            .iter()
            .filter_map(|&(metric, op, limit)| {
                let observed = observed_value(s, metric);
                (!op.passes(observed, limit)).then_some(ThresholdViolation {
                    metric,
                    op,
                    limit,
                    observed,
                })
            })
            .collect()
    }
}

fn observed_value(s: &MetricsSnapshot, metric: ThresholdMetric) -> f64 {
    match metric {
        ThresholdMetric::SuccessRatePercent => s.success_rate_percent,
        ThresholdMetric::AverageResponseTimeMs => s.average_response_time_ms,
        ThresholdMetric::P90Ms => s.p90 as f64,
        ThresholdMetric::P95Ms => s.p95 as f64,
        ThresholdMetric::P99Ms => s.p99 as f64,
        ThresholdMetric::ThroughputPerSecond => s.throughput_per_second,
        ThresholdMetric::ErrorCount => s.error_count as f64,
    }
}

fn non_negative(metric: ThresholdMetric, v: f64) -> Result<f64> {
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(invalid(
            metric,
            format!("must be a finite non-negative number, got {v}"),
        ))
    }
}

fn invalid(metric: ThresholdMetric, reason: String) -> Error {
    Error::InvalidThreshold {
        metric: metric.to_string(),
        reason,
    }
}
