//! # Subscription-side types.
//!
//! Everything a listener needs to describe *how* it subscribes, independent of the
//! dispatch core.
//!
//! ## Contents
//! - [`ListenFlags`] per-subscription behaviour bitset
//! - [`Liveness`], [`Owner`], [`Lifeline`] owner handles and the host liveness capability
//! - [`SubscriptionToken`] disposal handle for anonymous subscriptions
//! - [`MessageWait`] one-shot future over the next message of a type
//!
//! ## Subscription kinds
//! ```text
//! owner-scoped:  listen(owner, f, flags)   → removed by unlisten / owner death / ONCE
//! anonymous:     listen_manual(f)          → removed by token dispose / drop / ONCE
//! ```

mod flags;
mod owner;
mod token;
mod wait;

pub use flags::ListenFlags;
pub use owner::{Lifeline, Liveness, Owner};
pub use token::SubscriptionToken;
pub use wait::MessageWait;

pub(crate) use owner::OwnerState;
