//! # Owners and the liveness capability.
//!
//! Owner-scoped subscriptions remember *who* registered them through an [`Owner`]
//! handle. The dispatcher never keeps an owner alive: the handle is a `Weak`
//! reference, used only to ask the host whether the owner is still valid and to
//! match owners on `unlisten`.
//!
//! ## Liveness resolution
//! ```text
//! owner allocation dropped                  → dead
//! EXTERNALLY_MANAGED && !owner.is_alive()   → dead
//! ONLY_IF_ACTIVE && !owner.is_active()      → inactive (skipped, stays subscribed)
//! otherwise                                 → active
//! ```
//!
//! Hosts that already have a lifecycle system implement [`Liveness`] on their own
//! types. Hosts that don't can embed a [`Lifeline`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::subscribers::ListenFlags;

/// Host-supplied liveness capability.
///
/// Both methods are called outside of any dispatcher lock, so implementations may
/// take their own locks. They should not block.
pub trait Liveness: Send + Sync + 'static {
    /// Whether the owner still denotes a valid entity.
    ///
    /// Only consulted for subscriptions flagged
    /// [`EXTERNALLY_MANAGED`](ListenFlags::EXTERNALLY_MANAGED).
    fn is_alive(&self) -> bool {
        true
    }

    /// Whether the owner is currently eligible to receive events.
    ///
    /// Only consulted for subscriptions flagged
    /// [`ONLY_IF_ACTIVE`](ListenFlags::ONLY_IF_ACTIVE).
    fn is_active(&self) -> bool {
        true
    }
}

/// Result of resolving an owner for one dispatch step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OwnerState {
    Active,
    Inactive,
    Dead,
}

/// Non-owning handle to a subscription owner.
///
/// Build it from an `Arc` or a `Weak` to anything implementing [`Liveness`]:
/// ```rust
/// use std::sync::Arc;
/// use eventvisor::{Lifeline, Owner};
///
/// let life = Arc::new(Lifeline::new());
/// let owner = Owner::from(&life);
/// assert!(owner.is_attached());
///
/// drop(life);
/// assert!(!owner.is_attached());
/// ```
#[derive(Clone)]
pub struct Owner {
    inner: Weak<dyn Liveness>,
}

impl Owner {
    /// Creates a handle to `owner` without extending its lifetime.
    pub fn new<O: Liveness>(owner: &Arc<O>) -> Self {
        let weak: Weak<O> = Arc::downgrade(owner);
        Self { inner: weak }
    }

    /// Returns true while the owner allocation still exists.
    pub fn is_attached(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Pointer identity of the owner, stable for the owner's lifetime.
    pub(crate) fn key(&self) -> *const () {
        self.inner.as_ptr() as *const ()
    }

    pub(crate) fn same_as(&self, other: &Owner) -> bool {
        self.key() == other.key()
    }

    /// Resolves the owner's state for the given subscription flags.
    pub(crate) fn resolve(&self, flags: ListenFlags) -> OwnerState {
        let Some(owner) = self.inner.upgrade() else {
            return OwnerState::Dead;
        };
        if flags.contains(ListenFlags::EXTERNALLY_MANAGED) && !owner.is_alive() {
            return OwnerState::Dead;
        }
        if flags.contains(ListenFlags::ONLY_IF_ACTIVE) && !owner.is_active() {
            return OwnerState::Inactive;
        }
        OwnerState::Active
    }
}

impl<O: Liveness> From<&Arc<O>> for Owner {
    fn from(owner: &Arc<O>) -> Self {
        Owner::new(owner)
    }
}

impl<O: Liveness> From<Weak<O>> for Owner {
    fn from(owner: Weak<O>) -> Self {
        Self { inner: owner }
    }
}

impl<O: Liveness> From<&Weak<O>> for Owner {
    fn from(owner: &Weak<O>) -> Self {
        Self {
            inner: owner.clone(),
        }
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owner")
            .field("key", &self.key())
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Explicit alive/active flags for hosts without their own lifecycle system.
///
/// Starts alive and active. `kill` is permanent; `set_active` toggles.
#[derive(Debug)]
pub struct Lifeline {
    alive: AtomicBool,
    active: AtomicBool,
}

impl Lifeline {
    /// Creates an alive, active lifeline.
    pub fn new() -> Self {
        Self {
            alive: AtomicBool::new(true),
            active: AtomicBool::new(true),
        }
    }

    /// Marks the owner as destroyed.
    pub fn kill(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// Suspends or resumes event delivery for `ONLY_IF_ACTIVE` subscriptions.
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }
}

impl Default for Lifeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness for Lifeline {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    fn is_active(&self) -> bool {
        self.is_alive() && self.active.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    impl Liveness for Plain {}

    #[test]
    fn test_dropped_owner_is_dead() {
        let owner = Arc::new(Plain);
        let handle = Owner::from(&owner);
        assert_eq!(handle.resolve(ListenFlags::NONE), OwnerState::Active);

        drop(owner);
        assert_eq!(handle.resolve(ListenFlags::NONE), OwnerState::Dead);
    }

    #[test]
    fn test_is_alive_only_consulted_when_externally_managed() {
        let life = Arc::new(Lifeline::new());
        let handle = Owner::from(&life);
        life.kill();

        assert_eq!(handle.resolve(ListenFlags::NONE), OwnerState::Active);
        assert_eq!(
            handle.resolve(ListenFlags::EXTERNALLY_MANAGED),
            OwnerState::Dead
        );
    }

    #[test]
    fn test_inactive_only_with_only_if_active() {
        let life = Arc::new(Lifeline::new());
        let handle = Owner::from(&life);
        life.set_active(false);

        assert_eq!(handle.resolve(ListenFlags::NONE), OwnerState::Active);
        assert_eq!(
            handle.resolve(ListenFlags::ONLY_IF_ACTIVE),
            OwnerState::Inactive
        );

        life.set_active(true);
        assert_eq!(
            handle.resolve(ListenFlags::ONLY_IF_ACTIVE),
            OwnerState::Active
        );
    }

    #[test]
    fn test_identity_survives_clone_and_weak_conversion() {
        let life = Arc::new(Lifeline::new());
        let a = Owner::from(&life);
        let b = Owner::from(Arc::downgrade(&life));
        let other = Owner::from(&Arc::new(Lifeline::new()));

        assert!(a.same_as(&b));
        assert!(a.same_as(&a.clone()));
        assert!(!a.same_as(&other));
    }

    #[test]
    fn test_dangling_weak_is_not_attached() {
        let owner = Owner::from(Weak::<Plain>::new());
        assert!(!owner.is_attached());
        assert_eq!(owner.resolve(ListenFlags::NONE), OwnerState::Dead);
    }
}
