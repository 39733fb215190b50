//! # Example: wait_for_message
//!
//! Awaiting the next message of a type with [`MessageWait`].
//!
//! Demonstrates how to:
//! - Create a one-shot wait before the message is raised.
//! - Raise from another tokio task.
//! - Bound the wait with `tokio::time::timeout`.
//!
//! ## Flow
//! ```text
//! MessageWait::<Loaded>::new(&dispatcher)
//!     ├─► spawn(loader) ── sleep ──► raise(Loaded)
//!     └─► timeout(wait).await → Loaded
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=eventvisor=debug cargo run --example wait_for_message
//! ```

use std::sync::Arc;
use std::time::Duration;

use eventvisor::{Dispatcher, MessageWait};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct Loaded {
    level: &'static str,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dispatcher = Arc::new(Dispatcher::default());

    // 1. Start waiting before anything is raised
    let wait = MessageWait::<Loaded>::new(&dispatcher);

    // 2. Some other part of the program finishes loading later
    let loader = Arc::clone(&dispatcher);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        loader.raise(&Loaded { level: "harbor" });
    });

    // 3. Await with an upper bound
    let loaded = tokio::time::timeout(Duration::from_secs(2), wait).await?;
    println!("[main] level loaded: {}", loaded.level);

    // 4. The wait disposed its own subscription
    println!(
        "[main] Loaded subscribers left: {}",
        dispatcher.subscriber_count::<Loaded>()
    );
    Ok(())
}
