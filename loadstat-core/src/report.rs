use std::collections::BTreeMap;
use std::path::Path;

use loadstat_metrics::{MetricsSnapshot, RunWindow, Sample, assemble_within, window_of};

use crate::Result;
use crate::result_log::{LogRecord, ResultLog};

#[derive(Debug, Clone, PartialEq)]
pub struct LabelReport {
    pub label: String,
    pub snapshot: MetricsSnapshot,
}

/// Statistics re-derived from a completed run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    pub window: RunWindow,
    pub overall: MetricsSnapshot,
    /// Sorted by label. Every label shares the overall run window.
    pub by_label: Vec<LabelReport>,
    pub skipped_rows: usize,
}

impl Report {
    pub fn from_records(records: &[LogRecord]) -> Self {
        let samples: Vec<Sample> = records.iter().map(|r| r.sample).collect();
        let window = window_of(&samples);

        let mut grouped: BTreeMap<&str, Vec<Sample>> = BTreeMap::new();
        for rec in records {
            grouped
                .entry(rec.label_or_default())
                .or_default()
                .push(rec.sample);
        }

        let by_label = grouped
            .into_iter()
            .map(|(label, samples)| LabelReport {
                label: label.to_string(),
                snapshot: assemble_within(&samples, window),
            })
            .collect();

        Self {
            window,
            overall: assemble_within(&samples, window),
            by_label,
            skipped_rows: 0,
        }
    }

    pub fn from_log(log: &ResultLog) -> Self {
        Self {
            skipped_rows: log.skipped_rows,
            ..Self::from_records(&log.records)
        }
    }

    /// Reads the log at `path` and assembles its report.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_log(&ResultLog::read(path)?))
    }

    #[must_use]
    pub fn label(&self, label: &str) -> Option<&MetricsSnapshot> {
        self.by_label
            .iter()
            .find(|l| l.label == label)
            .map(|l| &l.snapshot)
    }
}
