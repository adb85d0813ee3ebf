mod error;
mod progress;
mod replay;
mod report;
mod thresholds;

pub mod result_log;

pub use error::{Error, Result};
pub use progress::{ProgressFn, ProgressTicker, ProgressUpdate};
pub use replay::{ALL_SCENARIO, ReplayOptions, ReplayStats, replay};
pub use report::{LabelReport, Report};
pub use result_log::{LogRecord, ResultLog, ResultLogWriter, parse_log};
pub use thresholds::{
    ThresholdMetric, ThresholdOp, ThresholdViolation, Thresholds, ThresholdsConfig,
};

pub use loadstat_metrics::{
    Collector, CollectorRegistry, MetricsSnapshot, Outcome, RunWindow, Sample,
};
