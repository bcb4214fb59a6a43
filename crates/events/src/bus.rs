//! Publish/subscribe abstraction for collection change notifications.
//!
//! The bus is the push half of the data provider contract:
//!
//! - **Broadcast**: every subscriber sees every published message.
//! - **No persistence**: a subscriber only sees messages published after it
//!   subscribed. The external service stays the source of truth; a view that
//!   hears about a change re-fetches.
//! - **Best-effort**: dead subscribers are dropped silently while publishing.
//!
//! Two subscription styles are offered. A [`Subscription`] is a channel the
//! consumer drains at its own pace; a callback registered with
//! [`ChangeBus::subscribe_fn`] runs synchronously inside `publish` and is
//! removed when its [`SubscriptionHandle`] is dropped or unsubscribed.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A channel subscription to a change stream.
///
/// ```ignore
/// let subscription = bus.subscribe();
/// while let Ok(change) = subscription.recv_timeout(Duration::from_millis(250)) {
///     view.refresh_for(&change);
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything currently queued.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Callback invoked for each published message.
pub type Callback<M> = Arc<dyn Fn(&M) + Send + Sync + 'static>;

/// Handle returned by [`ChangeBus::subscribe_fn`].
///
/// Dropping the handle unsubscribes the callback. Call [`detach`] to keep
/// the callback registered for the lifetime of the bus.
///
/// [`detach`]: SubscriptionHandle::detach
#[must_use = "dropping the handle unsubscribes the callback immediately"]
pub struct SubscriptionHandle {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl SubscriptionHandle {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle that owns nothing (used when registration failed).
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Remove the callback now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the callback registered without holding the handle.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl core::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Transport-agnostic change bus.
///
/// The trait requires `Send + Sync`: providers publish from whichever task
/// completed a mutation.
pub trait ChangeBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;

    fn subscribe_fn(&self, callback: Callback<M>) -> SubscriptionHandle;
}

impl<M, B> ChangeBus<M> for Arc<B>
where
    B: ChangeBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }

    fn subscribe_fn(&self, callback: Callback<M>) -> SubscriptionHandle {
        (**self).subscribe_fn(callback)
    }
}
