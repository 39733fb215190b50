//! # Dispatcher configuration.
//!
//! Provides [`Config`], the centralized settings for a [`Dispatcher`](crate::Dispatcher).
//!
//! Config is used in two ways:
//! 1. **Direct construction**: `Dispatcher::new(config)`
//! 2. **Builder**: `Dispatcher::builder(config).build()` which also attaches a
//!    periodic sweeper when `sweep_interval > 0`
//!
//! ## Sentinel values
//! - `sweep_interval = 0s` → no sweeper attached by the builder
//! - `slot_capacity = 0` → entries start with an empty (unallocated) slot list

use std::time::Duration;

use crate::policies::PanicPolicy;

/// Global configuration for a dispatcher.
///
/// ## Field semantics
/// - `panic_policy`: what a panicking handler does to the rest of a `raise`
/// - `sweep_interval`: period of the builder-attached liveness sweeper (`0s` = none)
/// - `slot_capacity`: slots pre-reserved for each newly created event entry
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Handling of handler panics during dispatch.
    pub panic_policy: PanicPolicy,

    /// How often the builder-attached sweeper calls `remove_unused_handlers`.
    ///
    /// - `Duration::ZERO` = no sweeper; the host drives sweeps itself
    /// - `> 0` = a tokio task sweeps at this period until `clear()` or drop
    pub sweep_interval: Duration,

    /// Initial slot capacity of each event entry.
    pub slot_capacity: usize,
}

impl Config {
    /// Returns the sweep period as an `Option`.
    ///
    /// - `None` → host-driven sweeps only
    /// - `Some(d)` → periodic sweeper
    #[inline]
    pub fn sweep_period(&self) -> Option<Duration> {
        if self.sweep_interval == Duration::ZERO {
            None
        } else {
            Some(self.sweep_interval)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `panic_policy = PanicPolicy::Isolate`
    /// - `sweep_interval = 0s` (host-driven)
    /// - `slot_capacity = 4`
    fn default() -> Self {
        Self {
            panic_policy: PanicPolicy::default(),
            sweep_interval: Duration::ZERO,
            slot_capacity: 4,
        }
    }
}
