//! Dispatch policies.
//!
//! This module groups the knobs that control **what happens when a handler
//! misbehaves** during a `raise`.
//!
//! ## Contents
//! - [`PanicPolicy`] isolate (catch, log, continue) or propagate a handler panic
//!
//! ## Quick wiring
//! ```text
//! DispatcherConfig { panic_policy: PanicPolicy, .. }
//!      └─► core::entry::EventEntry::dispatch uses:
//!           - policy.isolates() to decide between catch_unwind and a plain call
//! ```
//!
//! ## Defaults
//! - `PanicPolicy::Isolate`.

mod panic;

pub use panic::PanicPolicy;

pub(crate) use panic::panic_message;
