//! Dispatcher core: registry, event entries and the dispatch algorithm.
//!
//! The public API from this module is [`Dispatcher`] (with its [`Config`] and
//! [`DispatcherBuilder`]) and the optional periodic [`Sweeper`].
//!
//! Internal modules:
//! - [`entry`]: per-type subscription list, reentrancy bookkeeping, dispatch loop;
//! - [`registry`]: message type → entry map, owns entry creation;
//! - [`dispatcher`]: typed subscribe/raise/sweep/clear API;
//! - [`sweeper`]: tokio task driving `remove_unused_handlers` on a period;
//! - [`builder`]: assembles a shared dispatcher and its sweeper.

mod builder;
mod config;
mod dispatcher;
mod entry;
mod registry;
mod sweeper;

pub use builder::DispatcherBuilder;
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use sweeper::Sweeper;

pub(crate) use entry::EventEntry;
