//! # eventvisor
//!
//! **Eventvisor** is an in-process publish/subscribe dispatcher for Rust.
//!
//! Components register interest in a message *type*, publishers fan a message out
//! to every live subscriber of that type, and subscriptions may be added or
//! removed at any time, including from inside a handler that is running as part
//! of an ongoing dispatch.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   listen / listen_manual        raise(&msg)          unlisten / sweep / clear
//!            │                        │                          │
//!            ▼                        ▼                          ▼
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  Dispatcher (owned by the host, no global state)                      │
//! │  - Registry: TypeId → Arc<EventEntry>                                 │
//! │  - Config (panic policy, sweep interval)                              │
//! │  - optional Sweeper (tokio task, cancelled by clear())                │
//! └──────┬──────────────────────────┬──────────────────────────┬──────────┘
//!        ▼                          ▼                          ▼
//!   ┌──────────────┐         ┌──────────────┐          ┌──────────────┐
//!   │ EventEntry   │         │ EventEntry   │          │ EventEntry   │
//!   │ (type Ping)  │         │ (type Pong)  │          │ (type ...)   │
//!   │ slots, depth │         │ slots, depth │          │ slots, depth │
//!   └──────┬───────┘         └──────────────┘          └──────────────┘
//!          ▼
//!   slot 0 ──► owner liveness? ──► flags? ──► handler(&Ping)
//!   slot 1 ──► ...                               │
//!   slot N ──► ...                               └─► may listen / unlisten /
//!                                                    raise again (reentrant)
//! ```
//!
//! ### Dispatch
//! ```text
//! raise(&m)
//!   depth += 1, initial = len
//!   for i in 0..len (len re-read every step) {
//!     ├─► owner dead?                     → retire slot, skip
//!     ├─► ONLY_IF_ACTIVE && inactive?     → skip (stays subscribed)
//!     ├─► i >= initial && SUPPRESS flag?  → clear flag, skip this pass
//!     └─► invoke (ONCE → retire first)
//!   }
//!   retire: depth == 1 → compact now; depth > 1 → null in place, cleanup later
//!   depth -= 1; depth == 0 && needs_cleanup → compact
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                       |
//! |-------------------|-----------------------------------------------------------------|------------------------------------------|
//! | **Dispatch**      | Typed subscribe/raise over a type-erased, reentrancy-safe core. | [`Dispatcher`]                           |
//! | **Ownership**     | Weak owner handles and a pluggable liveness capability.        | [`Owner`], [`Liveness`], [`Lifeline`]    |
//! | **Flags**         | Once, only-if-active, suppress-on-add, externally managed.      | [`ListenFlags`]                          |
//! | **Anonymous**     | Owner-less subscriptions scoped to a disposal token.            | [`SubscriptionToken`]                    |
//! | **Waiting**       | One-shot future over the next message of a type.                | [`MessageWait`]                          |
//! | **Sweeping**      | Host-driven or periodic reclamation of dead listeners.          | [`Sweeper`]                              |
//! | **Policies**      | Isolate or propagate handler panics.                            | [`PanicPolicy`]                          |
//! | **Configuration** | Centralize dispatcher settings.                                 | [`DispatcherConfig`]                     |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventvisor::{Dispatcher, DispatcherConfig, Lifeline, ListenFlags};
//!
//! #[derive(Debug)]
//! struct PlayerJoined { id: u32 }
//!
//! let dispatcher = Dispatcher::new(DispatcherConfig::default());
//!
//! // The owner decides how long the subscription lives.
//! let lobby = Arc::new(Lifeline::new());
//! dispatcher
//!     .listen(
//!         &lobby,
//!         |ev: &PlayerJoined| println!("joined: {}", ev.id),
//!         ListenFlags::EXTERNALLY_MANAGED,
//!     )
//!     .unwrap();
//!
//! // Anonymous subscription, removed when the token is disposed or dropped.
//! let token = dispatcher.listen_manual(|ev: &PlayerJoined| assert!(ev.id > 0));
//!
//! assert!(dispatcher.raise(&PlayerJoined { id: 1 }));
//!
//! token.dispose();
//! lobby.kill();
//! dispatcher.remove_unused_handlers(); // normally once per host tick
//! assert!(!dispatcher.raise(&PlayerJoined { id: 2 }));
//! ```

mod core;
mod error;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Config as DispatcherConfig, Dispatcher, DispatcherBuilder, Sweeper};
pub use error::DispatchError;
pub use policies::PanicPolicy;
pub use subscribers::{Lifeline, ListenFlags, Liveness, MessageWait, Owner, SubscriptionToken};
