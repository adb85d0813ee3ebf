use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use loadstat_metrics::{Collector, CollectorRegistry, RunWindow, Sample, window_of};

use crate::result_log::LogRecord;
use crate::{Error, Result};

/// Scenario name used when records are not split by label.
pub const ALL_SCENARIO: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOptions {
    pub workers: usize,
    /// One collector per record label instead of a single [`ALL_SCENARIO`] collector.
    pub by_label: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism().map_or(4, |n| n.get()),
            by_label: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayStats {
    pub records: usize,
    pub workers: usize,
    pub scenarios: usize,
    pub window: RunWindow,
    pub elapsed: Duration,
}

fn scenario_of(rec: &LogRecord, by_label: bool) -> &str {
    if by_label {
        rec.label_or_default()
    } else {
        ALL_SCENARIO
    }
}

/// Feeds historical records through live collectors from `options.workers`
/// threads, the way an execution engine reports completed requests.
///
/// Each collector's run window is the records' window, so the resulting
/// snapshots match the batch [`Report`](crate::Report) over the same records.
/// Collectors already present in `registry` under the same name are reused.
pub fn replay(
    records: &[LogRecord],
    options: ReplayOptions,
    registry: &CollectorRegistry,
) -> Result<ReplayStats> {
    if options.workers == 0 {
        return Err(Error::InvalidWorkers);
    }

    let samples: Vec<Sample> = records.iter().map(|r| r.sample).collect();
    let window = window_of(&samples);
    let start_collector = || Collector::with_start(window.start_ms);

    let scenarios: BTreeSet<&str> = records
        .iter()
        .map(|r| scenario_of(r, options.by_label))
        .collect();
    for name in &scenarios {
        registry.collector_with(name, start_collector);
    }

    let workers = options.workers.min(records.len().max(1));
    tracing::info!(
        records = records.len(),
        workers,
        scenarios = scenarios.len(),
        "replaying result log"
    );

    let started = Instant::now();
    let cursor = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let cursor = &cursor;
                scope.spawn(move || {
                    let mut local: HashMap<&str, Arc<Collector>> = HashMap::new();
                    loop {
                        let i = cursor.fetch_add(1, Ordering::Relaxed);
                        let Some(rec) = records.get(i) else {
                            break;
                        };
                        let name = scenario_of(rec, options.by_label);
                        local
                            .entry(name)
                            .or_insert_with(|| registry.collector_with(name, start_collector))
                            .record(&rec.sample);
                    }
                })
            })
            .collect();

        // Join every worker before reporting, so no panicked thread is left unjoined.
        let joined: Vec<_> = handles.into_iter().map(|h| h.join()).collect();
        if joined.iter().any(std::result::Result::is_err) {
            return Err(Error::WorkerPanicked);
        }
        Ok(())
    })?;

    for name in &scenarios {
        if let Some(c) = registry.get(name) {
            c.mark_ended_at(window.end_ms);
        }
    }

    let stats = ReplayStats {
        records: records.len(),
        workers,
        scenarios: scenarios.len(),
        window,
        elapsed: started.elapsed(),
    };
    tracing::info!(elapsed = ?stats.elapsed, "replay finished");
    Ok(stats)
}
