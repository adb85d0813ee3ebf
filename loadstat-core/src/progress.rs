use std::sync::Arc;
use std::time::{Duration, Instant};

use loadstat_metrics::{CollectorRegistry, MetricsSnapshot};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Monotonic tick counter (1-based) for progress emissions.
    pub tick: u64,
    pub elapsed: Duration,
    pub scenario: String,
    pub snapshot: MetricsSnapshot,
    /// Set on the update emitted when the ticker stops.
    pub is_final: bool,
}

pub type ProgressFn = Arc<dyn Fn(ProgressUpdate) + Send + Sync + 'static>;

/// Periodically snapshots every collector of a registry while a run is live.
#[derive(Debug)]
pub struct ProgressTicker {
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<u64>,
}

impl ProgressTicker {
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        registry: Arc<CollectorRegistry>,
        interval: Duration,
        on_progress: ProgressFn,
    ) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let interval = interval.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut tick: u64 = 0;
            loop {
                let is_final = tokio::select! {
                    _ = ticker.tick() => false,
                    _ = &mut stop_rx => true,
                };

                tick = tick.saturating_add(1);
                let elapsed = started.elapsed();
                for (scenario, snapshot) in registry.snapshots() {
                    tracing::debug!(
                        tick,
                        scenario = %scenario,
                        requests = snapshot.total_requests,
                        success_rate = snapshot.success_rate_percent,
                        "progress"
                    );
                    (on_progress)(ProgressUpdate {
                        tick,
                        elapsed,
                        scenario,
                        snapshot,
                        is_final,
                    });
                }

                if is_final {
                    return tick;
                }
            }
        });

        Self {
            stop: Some(stop_tx),
            handle,
        }
    }

    /// Emits one final update per scenario and waits for the task to finish.
    /// Returns the number of ticks emitted.
    pub async fn stop(mut self) -> u64 {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        match (&mut self.handle).await {
            Ok(ticks) => ticks,
            Err(err) => {
                tracing::warn!(%err, "progress task failed");
                0
            }
        }
    }
}
