//! # Progress indicator for slow collaborator work.
//!
//! A periodic-tick side task paired with a completion token:
//!
//! ```text
//! Progress::start(label, tick) ──► spawn { loop select { tick → log, done → exit } }
//!        ...slow work...
//! progress.finish().await ──► done.cancel() ──► join → number of ticks
//! ```
//!
//! Purely decorative; dropping a [`Progress`] without `finish` also stops it.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::info;

/// Running progress indicator.
pub struct Progress {
    done: DropGuard,
    handle: JoinHandle<u64>,
}

impl Progress {
    /// Starts ticking every `tick`; the first tick fires after one period.
    pub fn start(label: &'static str, order_id: String, tick: Duration) -> Self {
        let token = CancellationToken::new();
        let done = token.clone();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + tick, tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks = 0u64;
            loop {
                tokio::select! {
                    _ = done.cancelled() => break,
                    _ = interval.tick() => {
                        ticks += 1;
                        info!(target: "pickpoint::progress", task = label, order = %order_id, ticks, "working");
                    }
                }
            }
            ticks
        });
        Self {
            done: token.drop_guard(),
            handle,
        }
    }

    /// Stops the indicator and returns how many ticks it emitted.
    pub async fn finish(self) -> u64 {
        drop(self.done);
        self.handle.await.unwrap_or(0)
    }
}
