//! Real-time update polling hook.
//!
//! Ticks on a fixed interval and logs; it does not reload anything yet.

use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::util::task::spawn_logged;

/// Running poller; stops when dropped
pub struct RealTimeUpdates {
    period: Duration,
    ticks: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl RealTimeUpdates {
    /// Start polling every `interval_minutes` (at least one minute)
    pub fn start(interval_minutes: u64) -> Self {
        let period = Duration::from_secs(interval_minutes.max(1) * 60);
        let ticks = Arc::new(AtomicU64::new(0));

        let task = spawn_logged("real-time updates", poll(period, ticks.clone()));

        tracing::info!(interval_secs = period.as_secs(), "Real-time updates enabled");
        Self {
            period,
            ticks,
            task,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks so far
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

async fn poll(period: Duration, ticks: Arc<AtomicU64>) -> Result<(), Infallible> {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        ticks.fetch_add(1, Ordering::Relaxed);
        tracing::info!("Checking for updates...");
    }
}

impl Drop for RealTimeUpdates {
    fn drop(&mut self) {
        self.task.abort();
    }
}
