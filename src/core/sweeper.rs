//! # Periodic liveness sweeper.
//!
//! [`Sweeper`] is the host-owned scheduler for
//! [`Dispatcher::remove_unused_handlers`]. It is never started implicitly: either
//! the host spawns one, or it asks the dispatcher to own one
//! ([`Dispatcher::attach_sweeper`] / a non-zero `sweep_interval` in the builder),
//! in which case `clear()` stops it.
//!
//! ## Architecture
//! ```text
//! tokio task
//!   loop {
//!     select! {
//!       cancel.cancelled()  → exit
//!       interval.tick()     → Weak<Dispatcher>::upgrade()
//!                               ├─ Some → remove_unused_handlers()
//!                               └─ None → exit (dispatcher dropped)
//!     }
//!   }
//! ```
//!
//! ## Rules
//! - Holds only a `Weak` to the dispatcher; it never keeps it alive.
//! - Must be spawned from within a tokio runtime.
//! - Dropping the handle cancels the task.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::dispatcher::Dispatcher;

/// Handle to a running sweeper task.
#[derive(Debug)]
pub struct Sweeper {
    cancel: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Spawns a task that sweeps `dispatcher` every `interval`.
    ///
    /// ### Notes
    /// - The first sweep happens one full `interval` after spawning.
    /// - The minimum interval is 1ms (clamped).
    /// - Panics if called outside a tokio runtime, like `tokio::spawn`.
    pub fn spawn(dispatcher: &Arc<Dispatcher>, interval: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        let target: Weak<Dispatcher> = Arc::downgrade(dispatcher);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        debug!(interval = ?interval, "starting liveness sweeper");
        let join = tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(dispatcher) = target.upgrade() else { break };
                        dispatcher.remove_unused_handlers();
                    }
                }
            }
            debug!("liveness sweeper stopped");
        });

        Self {
            cancel,
            join: Some(join),
        }
    }

    /// Requests the sweeper to stop. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Returns true once the sweeper task has exited.
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stops the sweeper and waits for its task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::{Lifeline, ListenFlags};

    async fn eventually(mut cond: impl FnMut() -> bool) -> bool {
        for _ in 0..200 {
            if cond() {
                return true;
            }
            time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_sweeps_on_interval() {
        let d = Arc::new(Dispatcher::default());
        let owner = Arc::new(Lifeline::new());
        d.listen(&owner, |_: &u8| {}, ListenFlags::NONE).unwrap();
        drop(owner);

        let sweeper = Sweeper::spawn(&d, Duration::from_millis(10));
        assert_eq!(d.subscriber_count::<u8>(), 1);

        assert!(eventually(|| d.subscriber_count::<u8>() == 0).await);
        sweeper.shutdown().await;
    }

    #[tokio::test]
    async fn test_stop_ends_task() {
        let d = Arc::new(Dispatcher::default());
        let sweeper = Sweeper::spawn(&d, Duration::from_secs(60));
        assert!(!sweeper.is_finished());

        sweeper.stop();
        sweeper.stop();
        time::timeout(Duration::from_secs(1), sweeper.shutdown())
            .await
            .expect("sweeper should stop");
    }

    #[tokio::test]
    async fn test_exits_when_dispatcher_dropped() {
        let d = Arc::new(Dispatcher::default());
        let sweeper = Sweeper::spawn(&d, Duration::from_millis(5));
        drop(d);

        assert!(eventually(|| sweeper.is_finished()).await);
    }
}
