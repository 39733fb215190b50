//! # Example: periodic_sweep
//!
//! A dispatcher that reclaims dead owners on its own.
//!
//! Demonstrates how to:
//! - Build a shared dispatcher with a sweep interval via [`DispatcherBuilder`].
//! - Let owners die by dropping their last `Arc`.
//! - Stop the sweeper with `clear()`.
//!
//! ## Flow
//! ```text
//! DispatcherBuilder::new(cfg).with_sweep_interval(100ms).build()
//!     ├─► Sweeper task: every 100ms → remove_unused_handlers()
//!     ├─► 3 owners subscribe to Tick
//!     ├─► drop 2 owners
//!     ├─► sleep 250ms → sweeper removed 2 dead slots
//!     └─► clear() → sweeper stopped, registry empty
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=eventvisor=debug cargo run --example periodic_sweep
//! ```

use std::sync::Arc;
use std::time::Duration;

use eventvisor::{DispatcherBuilder, DispatcherConfig, Lifeline, ListenFlags, PanicPolicy};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Tick(u64);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 1. Dispatcher with its own sweeper
    let dispatcher = DispatcherBuilder::new(DispatcherConfig::default())
        .with_panic_policy(PanicPolicy::Isolate)
        .with_sweep_interval(Duration::from_millis(100))
        .build();
    println!("[main] sweeper attached: {}", dispatcher.has_sweeper());

    // 2. A few owners
    let owners: Vec<Arc<Lifeline>> = (0..3).map(|_| Arc::new(Lifeline::new())).collect();
    for (i, owner) in owners.iter().enumerate() {
        dispatcher.listen(
            owner,
            move |t: &Tick| println!("[owner-{i}] tick {}", t.0),
            ListenFlags::NONE,
        )?;
    }
    dispatcher.raise(&Tick(1));

    // 3. Two owners go away; nobody calls remove_unused_handlers by hand
    let survivor = owners.into_iter().next();
    println!(
        "[main] before sweep: {} subscribers",
        dispatcher.subscriber_count::<Tick>()
    );
    tokio::time::sleep(Duration::from_millis(250)).await;
    println!(
        "[main] after sweep: {} subscribers",
        dispatcher.subscriber_count::<Tick>()
    );
    dispatcher.raise(&Tick(2));

    // 4. Tear everything down
    dispatcher.clear();
    println!(
        "[main] cleared: sweeper={} entries={}",
        dispatcher.has_sweeper(),
        dispatcher.entry_count()
    );
    drop(survivor);
    Ok(())
}
