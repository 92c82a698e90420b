//! In-process world view
//!
//! A `WorldView` that lives in the same process as its subscribers. Feeds
//! (mock, replay) publish into it; listeners subscribe to it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use contracts::{ContractError, SensorMessage, SensorMessageCallback, SubscriptionId, WorldView};
use tracing::{debug, trace, warn};

#[derive(Default)]
struct Subscribers {
    callbacks: Vec<(SubscriptionId, SensorMessageCallback)>,
    closed: bool,
}

/// Local world view
///
/// Delivery is serialized: concurrent `publish` calls from several feeds are
/// applied one at a time, and every subscriber sees messages in the order
/// they were published. Callbacks run on the publishing thread.
pub struct LocalWorldView {
    subscribers: Mutex<Subscribers>,
    delivery: Mutex<()>,
    /// Thread currently running callbacks
    delivering: Mutex<Option<ThreadId>>,
    next_id: AtomicU64,
    published: AtomicU64,
}

impl Default for LocalWorldView {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Subscribers::default()),
            delivery: Mutex::new(()),
            delivering: Mutex::new(None),
            next_id: AtomicU64::new(1),
            published: AtomicU64::new(0),
        }
    }
}

impl LocalWorldView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `message` to every current subscriber.
    ///
    /// Returns the number of callbacks invoked; 0 once closed.
    ///
    /// Callbacks must not publish into the same view: delivery is not
    /// reentrant. Such a nested call is dropped with a warning and returns 0
    /// instead of deadlocking.
    pub fn publish(&self, message: &SensorMessage) -> usize {
        let current = thread::current().id();
        if *self.delivering() == Some(current) {
            warn!(
                sensor_type = %message.sensor_type,
                name = %message.name,
                "publish from inside a subscriber callback dropped"
            );
            return 0;
        }

        let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        *self.delivering() = Some(current);
        let _delivering = DeliveringGuard(&self.delivering);

        // Snapshot so callbacks may (un)subscribe without deadlocking
        let callbacks: Vec<SensorMessageCallback> = {
            let subscribers = self.subscribers();
            if subscribers.closed {
                return 0;
            }
            subscribers
                .callbacks
                .iter()
                .map(|(_, callback)| callback.clone())
                .collect()
        };

        for callback in &callbacks {
            callback(message);
        }

        self.published.fetch_add(1, Ordering::Relaxed);
        trace!(
            sensor_type = %message.sensor_type,
            name = %message.name,
            subscribers = callbacks.len(),
            "message published"
        );
        callbacks.len()
    }

    /// Release every subscriber and refuse further (un)subscriptions.
    pub fn close(&self) {
        let mut subscribers = self.subscribers();
        if subscribers.closed {
            return;
        }
        subscribers.closed = true;
        let released = subscribers.callbacks.len();
        subscribers.callbacks.clear();
        debug!(released, "world view closed");
    }

    pub fn is_closed(&self) -> bool {
        self.subscribers().closed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers().callbacks.len()
    }

    /// Messages published while open
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    fn delivering(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.delivering.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribers(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// Clears the delivering thread on every exit from `publish`, panics included
struct DeliveringGuard<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for DeliveringGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl WorldView for LocalWorldView {
    fn subscribe(&self, callback: SensorMessageCallback) -> Result<SubscriptionId, ContractError> {
        let mut subscribers = self.subscribers();
        if subscribers.closed {
            return Err(ContractError::WorldViewClosed);
        }
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        subscribers.callbacks.push((id, callback));
        debug!(subscription = %id, "subscriber added");
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, ContractError> {
        let mut subscribers = self.subscribers();
        if subscribers.closed {
            return Err(ContractError::WorldViewClosed);
        }
        let before = subscribers.callbacks.len();
        subscribers.callbacks.retain(|(sub, _)| *sub != id);
        Ok(subscribers.callbacks.len() != before)
    }
}

impl std::fmt::Debug for LocalWorldView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subscribers = self.subscribers();
        f.debug_struct("LocalWorldView")
            .field("subscribers", &subscribers.callbacks.len())
            .field("closed", &subscribers.closed)
            .field("published", &self.published())
            .finish()
    }
}
