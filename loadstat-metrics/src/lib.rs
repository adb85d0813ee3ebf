pub mod assembler;
pub mod calc;
pub mod collector;
pub mod registry;
pub mod sample;
pub mod snapshot;

pub use assembler::{assemble, assemble_within, window_of};
pub use calc::{Counts, RunWindow, percentile, percentile_index, throughput};
pub use collector::Collector;
pub use registry::CollectorRegistry;
pub use sample::{Outcome, Sample};
pub use snapshot::MetricsSnapshot;
