// services/queue-dash/src/poller.rs
//
// Background refresh of the queue store on a fixed interval

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::store::QueueStore;

/// Running poll loop. Dropping it stops polling and cancels the fetch in
/// flight, if any.
pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    /// Fetches once right away, then every `interval`. `None` disables the
    /// timer so only the initial fetch and manual refreshes happen.
    pub fn start(store: Arc<QueueStore>, interval: Option<Duration>) -> Self {
        let handle = tokio::spawn(async move {
            store.refresh().await;

            let Some(period) = interval else {
                info!("Queue polling disabled");
                return;
            };
            info!("Polling queue every {:?}", period);

            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("Poll tick");
                // No retry or backoff: a failed poll waits for the next tick.
                store.refresh().await;
            }
        });

        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
