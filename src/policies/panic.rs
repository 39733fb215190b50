//! # Panic policies for handler invocation.
//!
//! [`PanicPolicy`] decides what happens to the rest of a `raise` pass when one
//! handler panics.
//!
//! - [`PanicPolicy::Isolate`] the panic is caught, logged, and the remaining handlers still run (default).
//! - [`PanicPolicy::Propagate`] the panic unwinds out of `raise`; later handlers in that pass are not invoked.
//!
//! In both cases the entry's reentrancy bookkeeping (invocation depth, deferred
//! cleanup) is restored before control leaves `raise`.
//!
//! ## Choosing the right policy
//! ```text
//! PanicPolicy::Isolate    → one faulty listener cannot starve its neighbours
//! PanicPolicy::Propagate  → tests / debug builds that want a loud failure
//! ```
//!
//! **Warning**: `Isolate` relies on `AssertUnwindSafe`; a handler that panics while
//! holding a lock on shared state can leave that state inconsistent.

use std::any::Any;

/// Policy controlling how a panicking handler affects the current dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PanicPolicy {
    /// Catch the panic, log it, count the handler as invoked, keep dispatching.
    #[default]
    Isolate,
    /// Let the panic unwind out of `raise`.
    Propagate,
}

impl PanicPolicy {
    /// Returns true if panics are caught inside the dispatch loop.
    #[inline]
    pub fn isolates(&self) -> bool {
        matches!(self, PanicPolicy::Isolate)
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_isolates() {
        assert_eq!(PanicPolicy::default(), PanicPolicy::Isolate);
        assert!(PanicPolicy::Isolate.isolates());
        assert!(!PanicPolicy::Propagate.isolates());
    }

    #[test]
    fn test_panic_message_variants() {
        let s: Box<dyn Any + Send> = Box::new("static boom");
        assert_eq!(panic_message(s.as_ref()), "static boom");

        let owned: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(owned.as_ref()), "owned boom");

        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
