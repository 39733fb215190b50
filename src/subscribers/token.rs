//! # Disposal tokens for anonymous subscriptions.
//!
//! [`Dispatcher::listen_manual`](crate::Dispatcher::listen_manual) has no owner to
//! scope the subscription, so it hands back a [`SubscriptionToken`] instead.
//!
//! ## Rules
//! - `dispose()` removes exactly the one handler it was issued for.
//! - `dispose()` is idempotent and may be called from any thread; the second and
//!   later calls are silent no-ops.
//! - Dropping the token disposes it. Use [`SubscriptionToken::detach`] to keep the
//!   subscription for the lifetime of the dispatcher instead.
//! - A token outliving its dispatcher (or a `clear()`) disposes nothing.

use std::fmt;
use std::sync::Weak;

use parking_lot::Mutex;
use tracing::debug;

use crate::core::EventEntry;

struct Target {
    entry: Weak<EventEntry>,
    id: u64,
}

/// Handle that removes an anonymous subscription when disposed or dropped.
#[must_use = "dropping the token immediately removes the subscription"]
pub struct SubscriptionToken {
    target: Mutex<Option<Target>>,
}

impl SubscriptionToken {
    pub(crate) fn new(entry: Weak<EventEntry>, id: u64) -> Self {
        Self {
            target: Mutex::new(Some(Target { entry, id })),
        }
    }

    /// Removes the subscription.
    ///
    /// Returns true only for the call that actually removed a live handler.
    pub fn dispose(&self) -> bool {
        let Some(target) = self.target.lock().take() else {
            return false;
        };
        let Some(entry) = target.entry.upgrade() else {
            return false;
        };
        let removed = entry.remove_id(target.id);
        if removed {
            debug!(
                message_type = entry.type_name(),
                id = target.id,
                "disposed manual subscription"
            );
        }
        removed
    }

    /// Returns true once `dispose` has been called (or the token was detached).
    pub fn is_disposed(&self) -> bool {
        self.target.lock().is_none()
    }

    /// Consumes the token without removing the subscription.
    pub fn detach(self) {
        self.target.lock().take();
    }
}

impl Drop for SubscriptionToken {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self.target.lock();
        f.debug_struct("SubscriptionToken")
            .field("id", &target.as_ref().map(|t| t.id))
            .field("disposed", &target.is_none())
            .finish()
    }
}
