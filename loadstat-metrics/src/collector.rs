use std::time::{Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::calc::{self, Counts, RunWindow};
use crate::sample::{Outcome, Sample};
use crate::snapshot::MetricsSnapshot;

#[derive(Debug, Default)]
struct CollectorState {
    counts: Counts,
    response_time_sum: u128,
    response_times: Vec<u64>,
    ended_at_ms: Option<i64>,
}

impl CollectorState {
    fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.counts.success = self.counts.success.saturating_add(1),
            Outcome::Failure => self.counts.failure = self.counts.failure.saturating_add(1),
            Outcome::Unknown => {}
        }

        // An outcome reported without a prior `record_request_started` still
        // counts as an attempted request.
        let decided = self.counts.success.saturating_add(self.counts.failure);
        if decided > self.counts.total {
            self.counts.total = decided;
        }
    }

    fn push_response_time(&mut self, ms: u64) {
        self.response_time_sum += u128::from(ms);
        self.response_times.push(ms);
    }
}

/// Live, concurrently written accumulator for one scenario run.
///
/// Every producer call is a single critical section over one lock, and
/// [`Collector::snapshot`] copies the state in one critical section, so a
/// reader never observes a torn or partially applied update.
///
/// [`Collector::record`] applies a whole request at once. The separate
/// `record_request_started` / `record_outcome` / `record_response_time` calls
/// are each atomic but not atomic together: a snapshot taken between them may
/// count an outcome whose response time has not arrived yet. Counters and
/// response times are eventually consistent on that path.
#[derive(Debug)]
pub struct Collector {
    started_at_ms: i64,
    anchor: Instant,
    state: Mutex<CollectorState>,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    /// Starts a collector whose run window opens now.
    #[must_use]
    pub fn new() -> Self {
        Self::with_start(epoch_millis_now())
    }

    /// Starts a collector whose run window opens at `started_at_ms` (epoch millis).
    #[must_use]
    pub fn with_start(started_at_ms: i64) -> Self {
        Self {
            started_at_ms,
            anchor: Instant::now(),
            state: Mutex::new(CollectorState::default()),
        }
    }

    pub fn record_request_started(&self) {
        let mut st = self.state.lock();
        st.counts.total = st.counts.total.saturating_add(1);
    }

    pub fn record_outcome(&self, success: bool) {
        self.state.lock().apply_outcome(Outcome::from_flag(success));
    }

    /// Counts a request that failed before any response was received.
    pub fn record_error(&self) {
        let mut st = self.state.lock();
        st.counts.errors = st.counts.errors.saturating_add(1);
    }

    /// Negative values are dropped.
    pub fn record_response_time(&self, ms: i64) {
        let Ok(ms) = u64::try_from(ms) else {
            tracing::trace!(ms, "dropping negative response time");
            return;
        };
        self.state.lock().push_response_time(ms);
    }

    /// Records a complete request (attempt, outcome and response time) in one step.
    pub fn record(&self, sample: &Sample) {
        let mut st = self.state.lock();
        st.counts.total = st.counts.total.saturating_add(1);
        st.apply_outcome(sample.outcome);
        st.push_response_time(sample.response_time_ms);
    }

    /// Closes the run window now. Only the first call has an effect.
    pub fn mark_ended(&self) {
        let now = self.now_ms();
        self.mark_ended_at(now);
    }

    /// Closes the run window at `ended_at_ms`, never before the start.
    /// Only the first call has an effect.
    pub fn mark_ended_at(&self, ended_at_ms: i64) {
        let mut st = self.state.lock();
        if st.ended_at_ms.is_none() {
            st.ended_at_ms = Some(ended_at_ms.max(self.started_at_ms));
        }
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.state.lock().ended_at_ms.is_some()
    }

    #[must_use]
    pub fn started_at_ms(&self) -> i64 {
        self.started_at_ms
    }

    /// Run window so far: creation until the end mark, or until now while running.
    #[must_use]
    pub fn window(&self) -> RunWindow {
        let ended = self.state.lock().ended_at_ms;
        self.window_with(ended)
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let (counts, response_times, sum, ended) = {
            let st = self.state.lock();
            (
                st.counts,
                st.response_times.clone(),
                st.response_time_sum,
                st.ended_at_ms,
            )
        };

        calc::compute(counts, response_times, sum, self.window_with(ended))
    }

    #[must_use]
    pub fn percentile(&self, p: u32) -> u64 {
        let mut times = self.state.lock().response_times.clone();
        times.sort_unstable();
        calc::percentile(&times, p)
    }

    #[must_use]
    pub fn throughput(&self) -> f64 {
        let (total, ended) = {
            let st = self.state.lock();
            (st.counts.total, st.ended_at_ms)
        };
        calc::throughput(total, self.window_with(ended))
    }

    fn window_with(&self, ended_at_ms: Option<i64>) -> RunWindow {
        let end = ended_at_ms.unwrap_or_else(|| self.now_ms());
        RunWindow::new(self.started_at_ms, end)
    }

    // Monotonic: derived from the creation anchor, not from the system clock.
    fn now_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.anchor.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.started_at_ms.saturating_add(elapsed)
    }
}

pub(crate) fn epoch_millis_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_millis()).ok())
        .unwrap_or(0)
}
