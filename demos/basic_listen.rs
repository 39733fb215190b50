//! # Example: basic_listen
//!
//! Owner-scoped and anonymous subscriptions on a single dispatcher.
//!
//! Demonstrates how to:
//! - Subscribe with an [`Owner`] backed by a [`Lifeline`].
//! - Subscribe anonymously and dispose through a [`SubscriptionToken`].
//! - Use `ONCE` and `ONLY_IF_ACTIVE`.
//! - Reclaim dead owners with `remove_unused_handlers()`.
//!
//! ## Flow
//! ```text
//! listen(&hud, on_score, ONLY_IF_ACTIVE)
//! listen(&hud, on_first_score, ONCE)
//! listen_manual(audit) ──► token
//!     ├─► raise(Score 10)  → hud (x2) + audit
//!     ├─► hud.set_active(false)
//!     ├─► raise(Score 20)  → audit only
//!     ├─► token.dispose(), hud.kill()
//!     └─► remove_unused_handlers() → no subscribers left
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=eventvisor=debug cargo run --example basic_listen
//! ```

use std::sync::Arc;

use eventvisor::{Dispatcher, DispatcherConfig, Lifeline, ListenFlags};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Score {
    points: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 1. Dispatcher owned by the host
    let dispatcher = Dispatcher::new(DispatcherConfig::default());

    // 2. An owner whose liveness the host controls
    let hud = Arc::new(Lifeline::new());

    dispatcher.listen(
        &hud,
        |s: &Score| println!("[hud] score is now {}", s.points),
        ListenFlags::ONLY_IF_ACTIVE | ListenFlags::EXTERNALLY_MANAGED,
    )?;
    dispatcher.listen(
        &hud,
        |s: &Score| println!("[hud] first score ever: {}", s.points),
        ListenFlags::ONCE,
    )?;

    // 3. Anonymous subscription
    let audit = dispatcher.listen_manual(|s: &Score| println!("[audit] {} points", s.points));

    println!("raise 10 -> delivered: {}", dispatcher.raise(&Score { points: 10 }));

    // 4. Inactive owners keep their subscription but are skipped
    hud.set_active(false);
    println!("raise 20 -> delivered: {}", dispatcher.raise(&Score { points: 20 }));

    // 5. Tear down
    audit.dispose();
    hud.kill();
    dispatcher.remove_unused_handlers();

    println!(
        "raise 30 -> delivered: {} (subscribers left: {})",
        dispatcher.raise(&Score { points: 30 }),
        dispatcher.subscriber_count::<Score>()
    );
    Ok(())
}
