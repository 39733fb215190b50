//! # Dispatcher: typed subscribe/raise API over the type-erased registry.
//!
//! The [`Dispatcher`] is the value the host owns and passes around. It wraps the
//! [`Registry`] with statically typed entry points: every `listen::<M>` call site
//! builds a wrapper closure that downcasts the erased message back to `M`, so the
//! storage layer never needs to know payload shapes.
//!
//! ## Architecture
//! ```text
//! listen::<M>(owner, f, flags) ──┐
//! listen_manual::<M>(f) ─────────┼─► Registry.get_or_create(TypeId::of::<M>())
//!                                │         └─► EventEntry.push(Slot)
//!                                │
//! raise::<M>(&msg) ──────────────┼─► Registry.get(TypeId::of::<M>())
//!                                │         └─► EventEntry.dispatch(&msg)
//!                                │                  ├─ dead owner      → retire
//!                                │                  ├─ inactive owner  → skip
//!                                │                  ├─ added this pass → skip once
//!                                │                  └─ otherwise       → handler(&msg)
//!                                │
//! unlisten / unlisten_all ───────┼─► EventEntry.remove_owner()
//! remove_unused_handlers() ──────┴─► EventEntry.sweep_dead()   (every entry)
//! ```
//!
//! ## Reentrancy
//! Handlers run on the publisher's stack and may call any method of the same
//! dispatcher, including `raise` for the type being dispatched. Removals made
//! while a dispatch of that type is in flight are deferred until it unwinds.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use eventvisor::{Dispatcher, DispatcherConfig, Lifeline, ListenFlags};
//!
//! struct Ping(u32);
//!
//! let dispatcher = Dispatcher::new(DispatcherConfig::default());
//! let owner = Arc::new(Lifeline::new());
//! let total = Arc::new(AtomicU32::new(0));
//!
//! let sink = Arc::clone(&total);
//! dispatcher
//!     .listen(&owner, move |p: &Ping| { sink.fetch_add(p.0, Ordering::SeqCst); }, ListenFlags::NONE)
//!     .unwrap();
//!
//! assert!(dispatcher.raise(&Ping(5)));
//! assert!(dispatcher.unlisten::<Ping>(&owner));
//! assert!(!dispatcher.raise(&Ping(5)));
//! assert_eq!(total.load(Ordering::SeqCst), 5);
//! ```

use std::any::{type_name, Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::builder::DispatcherBuilder;
use super::config::Config;
use super::entry::{ErasedHandler, EventEntry, Slot};
use super::registry::Registry;
use super::sweeper::Sweeper;
use crate::error::DispatchError;
use crate::subscribers::{ListenFlags, Owner, SubscriptionToken};

/// In-process publish/subscribe dispatcher.
pub struct Dispatcher {
    cfg: Config,
    registry: Registry,
    next_id: AtomicU64,
    sweeper: Mutex<Option<Sweeper>>,
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    pub fn new(cfg: Config) -> Self {
        let registry = Registry::new(cfg.slot_capacity);
        Self {
            cfg,
            registry,
            next_id: AtomicU64::new(1),
            sweeper: Mutex::new(None),
        }
    }

    /// Returns a builder that can also attach a periodic sweeper.
    pub fn builder(cfg: Config) -> DispatcherBuilder {
        DispatcherBuilder::new(cfg)
    }

    /// The configuration this dispatcher was created with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Subscribes `handler` to messages of type `M` on behalf of `owner`.
    ///
    /// The dispatcher holds the owner weakly: once the owner is dead (dropped, or
    /// reported dead by [`Liveness::is_alive`](crate::Liveness::is_alive) for
    /// `EXTERNALLY_MANAGED` subscriptions) the subscription is reclaimed by the
    /// next `raise` or sweep.
    ///
    /// ### Errors
    /// [`DispatchError::InvalidArgument`] if the owner handle is already dangling.
    pub fn listen<M, F>(
        &self,
        owner: impl Into<Owner>,
        handler: F,
        flags: ListenFlags,
    ) -> Result<(), DispatchError>
    where
        M: Any,
        F: Fn(&M) + Send + Sync + 'static,
    {
        let owner = owner.into();
        if !owner.is_attached() {
            return Err(DispatchError::InvalidArgument {
                reason: "owner handle is dangling",
            });
        }

        let entry = self.entry_for::<M>();
        let id = self.push(&entry, Some(owner), erase(handler), flags);
        debug!(message_type = entry.type_name(), id, ?flags, "listener added");
        Ok(())
    }

    /// Subscribes an owner-less `handler` to messages of type `M`.
    ///
    /// The returned token removes exactly this handler when disposed or dropped.
    pub fn listen_manual<M, F>(&self, handler: F) -> SubscriptionToken
    where
        M: Any,
        F: Fn(&M) + Send + Sync + 'static,
    {
        self.listen_manual_with(handler, ListenFlags::NONE)
    }

    /// Like [`listen_manual`](Self::listen_manual), with explicit flags.
    ///
    /// Owner-related flags (`ONLY_IF_ACTIVE`, `EXTERNALLY_MANAGED`) have no effect
    /// without an owner.
    pub fn listen_manual_with<M, F>(&self, handler: F, flags: ListenFlags) -> SubscriptionToken
    where
        M: Any,
        F: Fn(&M) + Send + Sync + 'static,
    {
        let entry = self.entry_for::<M>();
        let id = self.push(&entry, None, erase(handler), flags);
        debug!(message_type = entry.type_name(), id, ?flags, "manual listener added");
        SubscriptionToken::new(Arc::downgrade(&entry), id)
    }

    /// Removes every subscription of `owner` for message type `M`.
    ///
    /// Returns true if at least one was found.
    pub fn unlisten<M: Any>(&self, owner: impl Into<Owner>) -> bool {
        let owner = owner.into();
        let Some(entry) = self.registry.get(TypeId::of::<M>()) else {
            return false;
        };
        let removed = entry.remove_owner(&owner);
        if removed > 0 {
            debug!(message_type = entry.type_name(), removed, "listeners removed");
        }
        removed > 0
    }

    /// Removes every subscription of `owner`, across all message types.
    ///
    /// Returns true if at least one was found.
    pub fn unlisten_all(&self, owner: impl Into<Owner>) -> bool {
        let owner = owner.into();
        let removed: usize = self
            .registry
            .entries()
            .iter()
            .map(|entry| entry.remove_owner(&owner))
            .sum();
        if removed > 0 {
            debug!(removed, "listeners removed for owner");
        }
        removed > 0
    }

    /// Delivers `message` to every live, eligible subscriber of `M`, in
    /// registration order, on the calling thread.
    ///
    /// Returns true iff at least one handler was invoked.
    pub fn raise<M: Any>(&self, message: &M) -> bool {
        let Some(entry) = self.registry.get(TypeId::of::<M>()) else {
            trace!(message_type = type_name::<M>(), "raise without entry");
            return false;
        };
        let fired = entry.dispatch(message, self.cfg.panic_policy);
        trace!(message_type = entry.type_name(), fired, "raise complete");
        fired
    }

    /// Reclaims subscriptions whose owner is dead, across all message types.
    ///
    /// Meant to be called once per host tick (or by a [`Sweeper`]). Entries that are
    /// being dispatched defer the physical removal until the dispatch unwinds.
    pub fn remove_unused_handlers(&self) {
        let removed: usize = self
            .registry
            .entries()
            .iter()
            .map(|entry| entry.sweep_dead())
            .sum();
        if removed > 0 {
            debug!(removed, "swept listeners with dead owners");
        }
    }

    /// Discards every event entry and stops the attached sweeper, if any.
    ///
    /// Subsequent raises report no handlers until new subscriptions are made;
    /// outstanding tokens become no-ops.
    pub fn clear(&self) {
        let sweeper = self.sweeper.lock().take();
        if let Some(sweeper) = sweeper {
            sweeper.stop();
        }
        let dropped = self.registry.clear();
        debug!(entries = dropped, "dispatcher cleared");
    }

    /// Spawns a [`Sweeper`] owned by this dispatcher, replacing any previous one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn attach_sweeper(self: &Arc<Self>, interval: Duration) {
        let sweeper = Sweeper::spawn(self, interval);
        let previous = self.sweeper.lock().replace(sweeper);
        if let Some(previous) = previous {
            previous.stop();
        }
    }

    /// Returns true while a dispatcher-owned sweeper is attached.
    pub fn has_sweeper(&self) -> bool {
        self.sweeper.lock().is_some()
    }

    /// Number of subscriptions for `M` that have not been removed.
    pub fn subscriber_count<M: Any>(&self) -> usize {
        self.registry
            .get(TypeId::of::<M>())
            .map_or(0, |entry| entry.live_count())
    }

    /// Number of message types that have an event entry.
    pub fn entry_count(&self) -> usize {
        self.registry.len()
    }

    fn entry_for<M: Any>(&self) -> Arc<EventEntry> {
        self.registry
            .get_or_create(TypeId::of::<M>(), type_name::<M>())
    }

    fn push(
        &self,
        entry: &EventEntry,
        owner: Option<Owner>,
        handler: ErasedHandler,
        flags: ListenFlags,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        entry.push(Slot {
            id,
            owner,
            handler,
            flags,
        });
        id
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Wraps a typed handler into the erased form stored by entries.
fn erase<M, F>(handler: F) -> ErasedHandler
where
    M: Any,
    F: Fn(&M) + Send + Sync + 'static,
{
    Arc::new(move |message: &dyn Any| {
        if let Some(message) = message.downcast_ref::<M>() {
            handler(message);
        }
    })
}
