//! # Registry - message type to event entry map.
//!
//! The registry owns entry creation: the first subscription to a message type
//! creates its [`EventEntry`], which then lives until [`Registry::clear`].
//!
//! ## Architecture
//! ```text
//! Registry
//!   └── RwLock<HashMap<TypeId, Arc<EventEntry>>>
//!         ├─► get()            read lock, clone Arc, release
//!         ├─► get_or_create()  read lock fast path, write lock on first use
//!         └─► clear()          write lock, drop every entry
//! ```
//!
//! ## Rules
//! - The map lock only guards lookup/creation; it is released before any entry is
//!   touched, so dispatches of different types never contend on it for long.
//! - Callers work on cloned `Arc<EventEntry>`s, so `clear()` during a dispatch
//!   cannot free an entry that is still being iterated.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::entry::EventEntry;

/// Map of message types to their subscription lists.
pub(crate) struct Registry {
    entries: RwLock<HashMap<TypeId, Arc<EventEntry>>>,
    slot_capacity: usize,
}

impl Registry {
    /// Creates an empty registry; new entries pre-reserve `slot_capacity` slots.
    pub(crate) fn new(slot_capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            slot_capacity,
        }
    }

    /// Returns the entry for `ty`, if anyone ever subscribed to it.
    pub(crate) fn get(&self, ty: TypeId) -> Option<Arc<EventEntry>> {
        self.entries.read().get(&ty).cloned()
    }

    /// Returns the entry for `ty`, creating it on first use.
    pub(crate) fn get_or_create(&self, ty: TypeId, type_name: &'static str) -> Arc<EventEntry> {
        if let Some(entry) = self.get(ty) {
            return entry;
        }

        let mut entries = self.entries.write();
        Arc::clone(entries.entry(ty).or_insert_with(|| {
            debug!(message_type = type_name, "creating event entry");
            Arc::new(EventEntry::new(type_name, self.slot_capacity))
        }))
    }

    /// Snapshot of all entries.
    pub(crate) fn entries(&self) -> Vec<Arc<EventEntry>> {
        self.entries.read().values().cloned().collect()
    }

    /// Number of message types with an entry.
    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Drops every entry. Returns how many were discarded.
    pub(crate) fn clear(&self) -> usize {
        let drained: Vec<Arc<EventEntry>> = {
            let mut entries = self.entries.write();
            entries.drain().map(|(_, e)| e).collect()
        };
        drained.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_is_stable() {
        let registry = Registry::new(2);
        assert!(registry.get(TypeId::of::<u8>()).is_none());

        let a = registry.get_or_create(TypeId::of::<u8>(), "u8");
        let b = registry.get_or_create(TypeId::of::<u8>(), "u8");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);

        registry.get_or_create(TypeId::of::<u16>(), "u16");
        assert_eq!(registry.entries().len(), 2);
    }

    #[test]
    fn test_clear_drops_entries() {
        let registry = Registry::new(2);
        let entry = registry.get_or_create(TypeId::of::<u8>(), "u8");
        let weak = Arc::downgrade(&entry);
        drop(entry);

        assert_eq!(registry.clear(), 1);
        assert_eq!(registry.len(), 0);
        assert!(weak.upgrade().is_none());
    }
}
