//! # One-shot wait for a message type.
//!
//! [`MessageWait`] answers "let me know when at least one `M` has been raised". It
//! subscribes through an anonymous token with
//! [`SUPPRESS_IF_ADDED_DURING_DISPATCH`](crate::ListenFlags::SUPPRESS_IF_ADDED_DURING_DISPATCH)
//! (so a wait created from inside a handler does not see the message being
//! dispatched right now), buffers what it receives, and disposes its own
//! subscription on the first receipt.
//!
//! ## Flow
//! ```text
//! MessageWait::new(&dispatcher)
//!     └─► listen_manual_with::<M>(SUPPRESS_IF_ADDED_DURING_DISPATCH)
//!
//! raise(&m) ──► handler
//!                 ├─ buffer.push(m.clone())
//!                 ├─ token.dispose()        (one-shot)
//!                 └─ waker.wake()           (resolves `.await`)
//! ```
//!
//! ## Rules
//! - Not restartable: create a fresh wait for every logical wait.
//! - Awaiting resolves with the first message; `messages()` returns everything
//!   buffered in arrival order.
//! - `cancel()` (or dropping the wait) disposes the subscription. A cancelled wait
//!   that received nothing never resolves; pair it with a timeout if needed.
//!
//! ## Example
//! ```rust
//! use eventvisor::{Dispatcher, MessageWait};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Connected(u16);
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let dispatcher = Dispatcher::default();
//! let wait = MessageWait::<Connected>::new(&dispatcher);
//!
//! dispatcher.raise(&Connected(7));
//! assert!(wait.has_received());
//! assert_eq!(wait.await, Connected(7));
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use parking_lot::Mutex;

use crate::core::Dispatcher;
use crate::subscribers::{ListenFlags, SubscriptionToken};

struct WaitState<M> {
    buffer: Vec<M>,
    token: Option<SubscriptionToken>,
    waker: Option<Waker>,
}

/// Future resolving with the first `M` raised after its creation.
pub struct MessageWait<M> {
    shared: Arc<Mutex<WaitState<M>>>,
}

impl<M> MessageWait<M>
where
    M: Clone + Send + 'static,
{
    /// Starts waiting for the next `M` raised on `dispatcher`.
    pub fn new(dispatcher: &Dispatcher) -> Self {
        let shared = Arc::new(Mutex::new(WaitState {
            buffer: Vec::new(),
            token: None,
            waker: None,
        }));

        let sink = Arc::clone(&shared);
        let token = dispatcher.listen_manual_with(
            move |message: &M| {
                let (token, waker) = {
                    let mut st = sink.lock();
                    st.buffer.push(message.clone());
                    (st.token.take(), st.waker.take())
                };
                if let Some(token) = token {
                    token.dispose();
                }
                if let Some(waker) = waker {
                    waker.wake();
                }
            },
            ListenFlags::SUPPRESS_IF_ADDED_DURING_DISPATCH,
        );

        // Delivered from another thread before the token was stored.
        let early = {
            let mut st = shared.lock();
            if st.buffer.is_empty() {
                st.token = Some(token);
                None
            } else {
                Some(token)
            }
        };
        if let Some(token) = early {
            token.dispose();
        }

        Self { shared }
    }

    /// Returns true once at least one message has arrived.
    pub fn has_received(&self) -> bool {
        !self.shared.lock().buffer.is_empty()
    }

    /// The first message received, if any.
    pub fn first(&self) -> Option<M> {
        self.shared.lock().buffer.first().cloned()
    }

    /// Every message received, in arrival order.
    pub fn messages(&self) -> Vec<M> {
        self.shared.lock().buffer.clone()
    }

    /// Stops waiting and disposes the subscription. Idempotent.
    pub fn cancel(&self) {
        let token = self.shared.lock().token.take();
        if let Some(token) = token {
            token.dispose();
        }
    }

    /// Returns true while the underlying subscription is still registered.
    pub fn is_pending(&self) -> bool {
        self.shared.lock().token.is_some()
    }
}

impl<M> Future for MessageWait<M>
where
    M: Clone + Send + 'static,
{
    type Output = M;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<M> {
        let mut st = self.shared.lock();
        if let Some(first) = st.buffer.first() {
            return Poll::Ready(first.clone());
        }
        st.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}

impl<M> Drop for MessageWait<M> {
    fn drop(&mut self) {
        let token = self.shared.lock().token.take();
        drop(token);
    }
}

impl<M> fmt::Debug for MessageWait<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.shared.lock();
        f.debug_struct("MessageWait")
            .field("received", &st.buffer.len())
            .field("pending", &st.token.is_some())
            .finish()
    }
}
