//! In-process change bus.

use std::sync::{Arc, Mutex, mpsc};

use crate::bus::{Callback, ChangeBus, Subscription, SubscriptionHandle};

#[derive(Debug)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    Poisoned,
}

struct Registry<M> {
    next_id: u64,
    channels: Vec<mpsc::Sender<M>>,
    callbacks: Vec<(u64, Callback<M>)>,
}

/// In-memory pub/sub bus.
///
/// - No IO / no async
/// - Best-effort fan-out
/// - Callbacks run on the publishing thread, outside the registry lock, so
///   a callback may itself subscribe or unsubscribe
pub struct InMemoryChangeBus<M> {
    registry: Arc<Mutex<Registry<M>>>,
}

impl<M> InMemoryChangeBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live callback subscriptions.
    pub fn callback_count(&self) -> usize {
        self.registry.lock().map(|r| r.callbacks.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryChangeBus<M> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                channels: Vec::new(),
                callbacks: Vec::new(),
            })),
        }
    }
}

impl<M> core::fmt::Debug for InMemoryChangeBus<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryChangeBus").finish_non_exhaustive()
    }
}

impl<M> ChangeBus<M> for InMemoryChangeBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let callbacks: Vec<Callback<M>> = {
            let mut registry = self.registry.lock().map_err(|_| InMemoryBusError::Poisoned)?;

            // Drop any dead channel subscribers while publishing.
            registry.channels.retain(|tx| tx.send(message.clone()).is_ok());

            registry.callbacks.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };

        for callback in callbacks {
            callback(&message);
        }

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned we still return a subscription;
        // it just never receives anything.
        if let Ok(mut registry) = self.registry.lock() {
            registry.channels.push(tx);
        }

        Subscription::new(rx)
    }

    fn subscribe_fn(&self, callback: Callback<M>) -> SubscriptionHandle {
        let id = match self.registry.lock() {
            Ok(mut registry) => {
                let id = registry.next_id;
                registry.next_id += 1;
                registry.callbacks.push((id, callback));
                id
            }
            Err(_) => {
                tracing::warn!("change bus registry poisoned; callback not registered");
                return SubscriptionHandle::noop();
            }
        };

        let registry = Arc::downgrade(&self.registry);
        SubscriptionHandle::new(move || {
            if let Some(registry) = registry.upgrade() {
                if let Ok(mut registry) = registry.lock() {
                    registry.callbacks.retain(|(cb_id, _)| *cb_id != id);
                }
            }
        })
    }
}
