use std::sync::Arc;

use ahash::RandomState;
use dashmap::DashMap;

use crate::collector::Collector;
use crate::snapshot::MetricsSnapshot;

/// Owns one [`Collector`] per scenario name.
///
/// Collectors are never shared between scenarios; a scenario's collector is
/// dropped with [`CollectorRegistry::remove`] once its execution finishes.
#[derive(Debug, Default)]
pub struct CollectorRegistry {
    collectors: DashMap<Arc<str>, Arc<Collector>, RandomState>,
}

impl CollectorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector for `scenario`, created (starting now) on first use.
    pub fn collector(&self, scenario: &str) -> Arc<Collector> {
        self.collector_with(scenario, Collector::new)
    }

    /// Collector for `scenario`, created with `init` on first use.
    pub fn collector_with(
        &self,
        scenario: &str,
        init: impl FnOnce() -> Collector,
    ) -> Arc<Collector> {
        if let Some(c) = self.collectors.get(scenario) {
            return c.value().clone();
        }

        self.collectors
            .entry(Arc::from(scenario))
            .or_insert_with(|| Arc::new(init()))
            .value()
            .clone()
    }

    pub fn get(&self, scenario: &str) -> Option<Arc<Collector>> {
        self.collectors.get(scenario).map(|c| c.value().clone())
    }

    pub fn remove(&self, scenario: &str) -> Option<Arc<Collector>> {
        self.collectors.remove(scenario).map(|(_, c)| c)
    }

    pub fn mark_all_ended(&self) {
        for entry in self.collectors.iter() {
            entry.value().mark_ended();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// Scenario names, sorted.
    #[must_use]
    pub fn scenarios(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .collectors
            .iter()
            .map(|e| e.key().to_string())
            .collect();
        out.sort();
        out
    }

    /// Current snapshot of every scenario, sorted by name.
    #[must_use]
    pub fn snapshots(&self) -> Vec<(String, MetricsSnapshot)> {
        // Clone the handles first so no map shard stays locked while computing.
        let collectors: Vec<(Arc<str>, Arc<Collector>)> = self
            .collectors
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();

        let mut out: Vec<(String, MetricsSnapshot)> = collectors
            .into_iter()
            .map(|(name, c)| (name.to_string(), c.snapshot()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Sample;

    #[test]
    fn each_scenario_gets_its_own_collector() {
        let reg = CollectorRegistry::new();
        let a = reg.collector("checkout");
        let a_again = reg.collector("checkout");
        let b = reg.collector("browse");

        assert!(Arc::ptr_eq(&a, &a_again));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(reg.scenarios(), vec!["browse".to_string(), "checkout".to_string()]);

        a.record(&Sample::success(10, 0));
        let snaps = reg.snapshots();
        assert_eq!(snaps[0].1.total_requests, 0);
        assert_eq!(snaps[1].1.total_requests, 1);
    }

    #[test]
    fn collector_with_only_runs_init_once() {
        let reg = CollectorRegistry::new();
        let first = reg.collector_with("s", || Collector::with_start(42));
        let second = reg.collector_with("s", || Collector::with_start(7));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.started_at_ms(), 42);
    }

    #[test]
    fn remove_discards_and_mark_all_ended_closes() {
        let reg = CollectorRegistry::new();
        let a = reg.collector("a");
        let _ = reg.collector("b");
        reg.mark_all_ended();
        assert!(a.is_ended());

        assert!(reg.remove("a").is_some());
        assert!(reg.get("a").is_none());
        assert_eq!(reg.len(), 1);
        assert!(!reg.is_empty());
    }
}
