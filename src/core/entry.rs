//! # Per-message-type subscription list with reentrancy bookkeeping.
//!
//! An [`EventEntry`] holds every subscription for one message type, in
//! registration order, together with the invocation depth of in-flight
//! dispatches and a deferred-cleanup flag.
//!
//! ## Architecture
//! ```text
//! EventEntry
//!   └── Mutex<EntryState>
//!         ├── slots: Vec<Option<Slot>>   (None = removed while dispatching)
//!         ├── depth: usize               (nested dispatch count)
//!         └── needs_cleanup: bool        (some slot was nulled)
//! ```
//!
//! ## Rules
//! - The lock is **never** held while host code runs (handlers, liveness queries);
//!   every dispatch step copies what it needs out of the slot, releases the lock,
//!   then calls out.
//! - Removal at `depth == 0` compacts immediately.
//! - Removal at `depth > 0` nulls the slot in place; only the outermost dispatch
//!   (`depth == 1`) compacts its own removals eagerly, since no other frame is
//!   iterating the list.
//! - When the outermost dispatch unwinds, nulled slots are swept.
//! - Removed slots are dropped only after the lock is released, since dropping a
//!   handler may dispose tokens on this same entry.
//!
//! Owner, handler and flags live in one [`Slot`] record, so there is no way for
//! their storage to disagree in length.

use std::any::Any;
use std::mem;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, trace};

use crate::policies::{panic_message, PanicPolicy};
use crate::subscribers::{ListenFlags, Owner, OwnerState};

/// Type-erased handler; the typed wrapper downcasts back to the message type.
pub(crate) type ErasedHandler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// One registered subscription.
pub(crate) struct Slot {
    pub(crate) id: u64,
    pub(crate) owner: Option<Owner>,
    pub(crate) handler: ErasedHandler,
    pub(crate) flags: ListenFlags,
}

/// What one dispatch step needs from a slot, copied out under the lock.
struct Step {
    id: u64,
    owner: Option<Owner>,
    handler: ErasedHandler,
    flags: ListenFlags,
}

struct EntryState {
    slots: Vec<Option<Slot>>,
    depth: usize,
    needs_cleanup: bool,
}

impl EntryState {
    /// Finds the slot with `id`, looking at `hint` first.
    fn position_of(&self, hint: usize, id: u64) -> Option<usize> {
        match self.slots.get(hint) {
            Some(Some(slot)) if slot.id == id => Some(hint),
            _ => self
                .slots
                .iter()
                .position(|s| s.as_ref().is_some_and(|s| s.id == id)),
        }
    }

    /// Takes every slot matching `pred` out of the list, respecting the current depth.
    ///
    /// The removed slots are returned so the caller can drop them once the lock
    /// is released; dropping a handler may run host code.
    fn remove_matching(&mut self, mut pred: impl FnMut(&Slot) -> bool) -> Vec<Slot> {
        let mut removed = Vec::new();
        if self.depth == 0 {
            let slots = mem::take(&mut self.slots);
            for slot in slots.into_iter().flatten() {
                if pred(&slot) {
                    removed.push(slot);
                } else {
                    self.slots.push(Some(slot));
                }
            }
        } else {
            for s in self.slots.iter_mut() {
                if s.as_ref().is_some_and(&mut pred) {
                    removed.extend(s.take());
                }
            }
            if !removed.is_empty() {
                self.needs_cleanup = true;
            }
        }
        removed
    }

    fn compact(&mut self) {
        self.slots.retain(Option::is_some);
        self.needs_cleanup = false;
    }
}

/// Subscriptions for a single message type.
pub(crate) struct EventEntry {
    type_name: &'static str,
    state: Mutex<EntryState>,
}

impl EventEntry {
    pub(crate) fn new(type_name: &'static str, capacity: usize) -> Self {
        Self {
            type_name,
            state: Mutex::new(EntryState {
                slots: Vec::with_capacity(capacity),
                depth: 0,
                needs_cleanup: false,
            }),
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Appends a subscription.
    ///
    /// `SUPPRESS_IF_ADDED_DURING_DISPATCH` only concerns the dispatch in flight at
    /// registration time, so it is dropped when nothing is dispatching.
    pub(crate) fn push(&self, mut slot: Slot) {
        let mut st = self.state.lock();
        if st.depth == 0 {
            slot.flags.remove(ListenFlags::SUPPRESS_IF_ADDED_DURING_DISPATCH);
        }
        st.slots.push(Some(slot));
    }

    /// Removes the subscription with `id`. Returns false if it was already gone.
    pub(crate) fn remove_id(&self, id: u64) -> bool {
        let removed = self.state.lock().remove_matching(|s| s.id == id);
        !removed.is_empty()
    }

    /// Removes every subscription owned by `owner`.
    pub(crate) fn remove_owner(&self, owner: &Owner) -> usize {
        let removed = self
            .state
            .lock()
            .remove_matching(|s| s.owner.as_ref().is_some_and(|o| o.same_as(owner)));
        removed.len()
    }

    /// Removes subscriptions whose owner is dead. Returns how many were removed.
    pub(crate) fn sweep_dead(&self) -> usize {
        let owned: Vec<(u64, Owner, ListenFlags)> = {
            let st = self.state.lock();
            st.slots
                .iter()
                .flatten()
                .filter_map(|s| s.owner.clone().map(|o| (s.id, o, s.flags)))
                .collect()
        };

        let dead: Vec<u64> = owned
            .into_iter()
            .filter(|(_, owner, flags)| owner.resolve(*flags) == OwnerState::Dead)
            .map(|(id, _, _)| id)
            .collect();

        if dead.is_empty() {
            return 0;
        }
        let removed = self.state.lock().remove_matching(|s| dead.contains(&s.id));
        removed.len()
    }

    /// Number of subscriptions that have not been removed.
    pub(crate) fn live_count(&self) -> usize {
        self.state.lock().slots.iter().flatten().count()
    }

    /// Fans `message` out to every eligible subscription.
    ///
    /// Returns true if at least one handler was invoked.
    pub(crate) fn dispatch(&self, message: &dyn Any, policy: PanicPolicy) -> bool {
        let mut initial_count = {
            let mut st = self.state.lock();
            st.depth += 1;
            st.slots.len()
        };
        let _depth = DepthGuard { entry: self };

        let mut fired = false;
        let mut index = 0;
        loop {
            let step = {
                let st = self.state.lock();
                match st.slots.get(index) {
                    None => break,
                    Some(None) => {
                        index += 1;
                        continue;
                    }
                    Some(Some(slot)) => Step {
                        id: slot.id,
                        owner: slot.owner.clone(),
                        handler: Arc::clone(&slot.handler),
                        flags: slot.flags,
                    },
                }
            };

            let owner_state = step
                .owner
                .as_ref()
                .map_or(OwnerState::Active, |o| o.resolve(step.flags));

            match owner_state {
                OwnerState::Dead => {
                    trace!(message_type = self.type_name, id = step.id, "dropping dead listener");
                    if self.retire(index, step.id, &mut initial_count) {
                        continue;
                    }
                }
                OwnerState::Inactive => {}
                OwnerState::Active
                    if index >= initial_count
                        && step
                            .flags
                            .contains(ListenFlags::SUPPRESS_IF_ADDED_DURING_DISPATCH) =>
                {
                    self.clear_suppress(index, step.id);
                }
                OwnerState::Active => {
                    // Retired before the call so a reentrant dispatch cannot fire it again.
                    let shifted = step.flags.contains(ListenFlags::ONCE)
                        && self.retire(index, step.id, &mut initial_count);

                    self.invoke(&step.handler, message, policy);
                    fired = true;

                    if shifted {
                        continue;
                    }
                }
            }
            index += 1;
        }
        fired
    }

    /// Removes the slot at `index` (identified by `id`).
    ///
    /// Returns true if the list was compacted at or before `index`, meaning the
    /// next candidate now lives at `index`.
    fn retire(&self, index: usize, id: u64, initial_count: &mut usize) -> bool {
        let (shifted, retired) = {
            let mut st = self.state.lock();
            let Some(pos) = st.position_of(index, id) else {
                return false;
            };
            if st.depth == 1 {
                let retired = st.slots.remove(pos);
                if pos < *initial_count {
                    *initial_count -= 1;
                }
                (pos <= index, retired)
            } else {
                st.needs_cleanup = true;
                (false, st.slots[pos].take())
            }
        };
        drop(retired);
        shifted
    }

    fn clear_suppress(&self, index: usize, id: u64) {
        let mut st = self.state.lock();
        if let Some(pos) = st.position_of(index, id) {
            if let Some(slot) = st.slots[pos].as_mut() {
                slot.flags.remove(ListenFlags::SUPPRESS_IF_ADDED_DURING_DISPATCH);
            }
        }
    }

    fn invoke(&self, handler: &ErasedHandler, message: &dyn Any, policy: PanicPolicy) {
        if !policy.isolates() {
            handler(message);
            return;
        }
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| handler(message))) {
            error!(
                message_type = self.type_name,
                panic = %panic_message(payload.as_ref()),
                "handler panicked during raise; continuing with remaining handlers"
            );
        }
    }

    #[cfg(test)]
    fn debug_state(&self) -> (usize, usize, bool) {
        let st = self.state.lock();
        (st.slots.len(), st.depth, st.needs_cleanup)
    }
}

/// Decrements the depth when a dispatch ends, including by unwinding,
/// and sweeps nulled slots once the outermost dispatch is gone.
struct DepthGuard<'a> {
    entry: &'a EventEntry,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        let mut st = self.entry.state.lock();
        st.depth -= 1;
        if st.depth == 0 && st.needs_cleanup {
            st.compact();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn slot(id: u64, flags: ListenFlags, hits: &Arc<AtomicUsize>) -> Slot {
        let hits = Arc::clone(hits);
        Slot {
            id,
            owner: None,
            handler: Arc::new(move |_msg: &dyn Any| {
                hits.fetch_add(1, Ordering::SeqCst);
            }),
            flags,
        }
    }

    #[test]
    fn test_remove_at_depth_zero_compacts() {
        let entry = EventEntry::new("u32", 4);
        let hits = Arc::new(AtomicUsize::new(0));
        entry.push(slot(1, ListenFlags::NONE, &hits));
        entry.push(slot(2, ListenFlags::NONE, &hits));

        assert!(entry.remove_id(1));
        assert!(!entry.remove_id(1));
        assert_eq!(entry.debug_state(), (1, 0, false));
    }

    #[test]
    fn test_suppress_flag_dropped_when_idle() {
        let entry = EventEntry::new("u32", 4);
        let hits = Arc::new(AtomicUsize::new(0));
        entry.push(slot(1, ListenFlags::SUPPRESS_IF_ADDED_DURING_DISPATCH, &hits));

        assert!(entry.dispatch(&7_u32, PanicPolicy::Isolate));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_once_removed_after_first_dispatch() {
        let entry = EventEntry::new("u32", 4);
        let hits = Arc::new(AtomicUsize::new(0));
        entry.push(slot(1, ListenFlags::ONCE, &hits));
        entry.push(slot(2, ListenFlags::NONE, &hits));

        assert!(entry.dispatch(&1_u32, PanicPolicy::Isolate));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(entry.live_count(), 1);

        assert!(entry.dispatch(&2_u32, PanicPolicy::Isolate));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(entry.debug_state(), (1, 0, false));
    }

    #[test]
    fn test_removal_during_dispatch_is_deferred() {
        let entry = Arc::new(EventEntry::new("u32", 4));
        let hits = Arc::new(AtomicUsize::new(0));
        let seen_len = Arc::new(AtomicUsize::new(0));

        let inner = Arc::clone(&entry);
        let len_probe = Arc::clone(&seen_len);
        entry.push(Slot {
            id: 1,
            owner: None,
            handler: Arc::new(move |_msg: &dyn Any| {
                inner.remove_id(2);
                len_probe.store(inner.debug_state().0, Ordering::SeqCst);
            }),
            flags: ListenFlags::NONE,
        });
        entry.push(slot(2, ListenFlags::NONE, &hits));
        entry.push(slot(3, ListenFlags::NONE, &hits));

        assert!(entry.dispatch(&0_u32, PanicPolicy::Isolate));
        // Nulled in place while dispatching, compacted afterwards.
        assert_eq!(seen_len.load(Ordering::SeqCst), 3);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(entry.debug_state(), (2, 0, false));
    }

    #[test]
    fn test_nested_dispatch_nulls_once_slot_until_outer_unwinds() {
        let entry = Arc::new(EventEntry::new("u32", 4));
        let hits = Arc::new(AtomicUsize::new(0));
        let inside = Arc::new(Mutex::new(None));

        let inner = Arc::clone(&entry);
        let seen = Arc::clone(&inside);
        entry.push(Slot {
            id: 1,
            owner: None,
            handler: Arc::new(move |msg: &dyn Any| {
                if msg.downcast_ref::<u32>() == Some(&0) {
                    inner.dispatch(&1_u32, PanicPolicy::Isolate);
                    *seen.lock() = Some(inner.debug_state());
                }
            }),
            flags: ListenFlags::NONE,
        });
        entry.push(slot(2, ListenFlags::ONCE, &hits));
        entry.push(slot(3, ListenFlags::NONE, &hits));

        assert!(entry.dispatch(&0_u32, PanicPolicy::Isolate));
        // The nested pass nulled the ONCE slot; the outer pass still sees three slots.
        assert_eq!(*inside.lock(), Some((3, 1, true)));
        // ONCE and slot 3 in the nested pass, slot 3 again in the outer one.
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(entry.debug_state(), (2, 0, false));
    }

    #[test]
    fn test_depth_restored_after_propagated_panic() {
        let entry = EventEntry::new("u32", 4);
        entry.push(Slot {
            id: 1,
            owner: None,
            handler: Arc::new(|_msg: &dyn Any| panic!("boom")),
            flags: ListenFlags::NONE,
        });

        let result = catch_unwind(AssertUnwindSafe(|| {
            entry.dispatch(&0_u32, PanicPolicy::Propagate)
        }));
        assert!(result.is_err());
        assert_eq!(entry.debug_state(), (1, 0, false));
    }
}
