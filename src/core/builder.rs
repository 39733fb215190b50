use std::sync::Arc;

use tracing::warn;

use super::{config::Config, dispatcher::Dispatcher};
use crate::policies::PanicPolicy;

/// Builder for constructing a shared [`Dispatcher`] with optional features.
pub struct DispatcherBuilder {
    cfg: Config,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    /// Overrides the panic policy.
    pub fn with_panic_policy(mut self, policy: PanicPolicy) -> Self {
        self.cfg.panic_policy = policy;
        self
    }

    /// Sets the period of the dispatcher-owned liveness sweeper (`0s` = none).
    pub fn with_sweep_interval(mut self, interval: std::time::Duration) -> Self {
        self.cfg.sweep_interval = interval;
        self
    }

    /// Builds and returns the dispatcher.
    ///
    /// When a sweep period is configured the sweeper is attached here, which
    /// requires a tokio runtime; outside of one, the dispatcher is returned without
    /// a sweeper and a warning is logged.
    pub fn build(self) -> Arc<Dispatcher> {
        let period = self.cfg.sweep_period();
        let dispatcher = Arc::new(Dispatcher::new(self.cfg));

        if let Some(period) = period {
            if tokio::runtime::Handle::try_current().is_ok() {
                dispatcher.attach_sweeper(period);
            } else {
                warn!(
                    interval = ?period,
                    "no tokio runtime; sweeper not attached, call remove_unused_handlers manually"
                );
            }
        }
        dispatcher
    }
}
