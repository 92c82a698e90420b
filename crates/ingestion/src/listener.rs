//! Sensor message listener
//!
//! Bridges a world view's sensor stream to a `SensorMessageSink`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use contracts::{
    ContractError, SensorMessage, SensorMessageCallback, SensorMessageSink, SubscriptionId,
    WorldView,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::config::IngestionMetrics;
use crate::error::{IngestionError, Result};

/// Sensor message listener
///
/// Owns one subscription. Every delivered message is forwarded to the sink
/// on the delivering thread. After [`unsubscribe`](Self::unsubscribe) the
/// callback may still be invoked by a delivery already in flight; such
/// messages are counted as ignored and never reach the sink.
///
/// Dropping the listener unsubscribes.
pub struct SensorMessageListener {
    world_view: Arc<dyn WorldView>,
    subscription: SubscriptionId,
    active: Arc<AtomicBool>,
}

impl SensorMessageListener {
    #[instrument(name = "listener_subscribe", skip_all)]
    pub fn subscribe(
        world_view: Arc<dyn WorldView>,
        sink: Arc<dyn SensorMessageSink>,
        metrics: Arc<IngestionMetrics>,
    ) -> Result<Self> {
        let active = Arc::new(AtomicBool::new(true));
        let flag = active.clone();

        let callback: SensorMessageCallback = Arc::new(move |message: &SensorMessage| {
            if !flag.load(Ordering::Acquire) {
                metrics.record_ignored();
                trace!(name = %message.name, "message after unsubscribe ignored");
                return;
            }

            metrics.record_received();
            let outcome = sink.file_message(message);
            trace!(name = %message.name, outcome = outcome.as_str(), "message forwarded");
        });

        let subscription = world_view
            .subscribe(callback)
            .map_err(IngestionError::Subscribe)?;

        observability::record_subscription_change(1.0);
        info!(subscription = %subscription, "listening to sensor messages");

        Ok(Self {
            world_view,
            subscription,
            active,
        })
    }

    /// Stop forwarding messages.
    ///
    /// Returns `true` on the call that actually unsubscribed, `false` on
    /// every later call. Safe from any thread.
    #[instrument(name = "listener_unsubscribe", skip(self), fields(subscription = %self.subscription))]
    pub fn unsubscribe(&self) -> bool {
        if !self.active.swap(false, Ordering::AcqRel) {
            return false;
        }

        match self.world_view.unsubscribe(self.subscription) {
            Ok(true) => debug!("subscription removed"),
            Ok(false) => debug!("subscription was already gone"),
            Err(ContractError::WorldViewClosed) => {
                debug!("world view already closed, nothing to remove")
            }
            Err(e) => warn!(error = %e, "unsubscribe failed, messages will be ignored"),
        }

        observability::record_subscription_change(-1.0);
        true
    }

    pub fn is_subscribed(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }
}

impl Drop for SensorMessageListener {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for SensorMessageListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorMessageListener")
            .field("subscription", &self.subscription)
            .field("active", &self.is_subscribed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world_view::LocalWorldView;
    use contracts::FileOutcome;
    use rand::Rng;
    use std::sync::Mutex;
    use std::thread;

    #[derive(Default)]
    struct RecordingSink {
        values: Mutex<Vec<f64>>,
    }

    impl SensorMessageSink for RecordingSink {
        fn file_message(&self, message: &SensorMessage) -> FileOutcome {
            let value = message.fields.get("value").and_then(|v| v.as_f64());
            match value {
                Some(value) => {
                    self.values.lock().unwrap().push(value);
                    FileOutcome::Updated
                }
                None => FileOutcome::Malformed,
            }
        }
    }

    fn setup() -> (
        Arc<LocalWorldView>,
        Arc<RecordingSink>,
        Arc<IngestionMetrics>,
        SensorMessageListener,
    ) {
        let view = Arc::new(LocalWorldView::new());
        let sink = Arc::new(RecordingSink::default());
        let metrics = Arc::new(IngestionMetrics::new());
        let listener =
            SensorMessageListener::subscribe(view.clone(), sink.clone(), metrics.clone()).unwrap();
        (view, sink, metrics, listener)
    }

    #[test]
    fn test_forwards_in_order() {
        let (view, sink, metrics, listener) = setup();
        let mut rng = rand::rng();
        let values: Vec<f64> = (0..50).map(|_| rng.random_range(0.0..100.0)).collect();

        for value in &values {
            view.publish(&SensorMessage::new("range", "r1").with_field("value", *value));
        }
        view.publish(&SensorMessage::new("range", "r1"));

        assert!(listener.is_subscribed());
        assert_eq!(*sink.values.lock().unwrap(), values);
        let snap = metrics.snapshot();
        assert_eq!(snap.messages_received, 51);
        assert_eq!(snap.messages_ignored, 0);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let (view, sink, _metrics, listener) = setup();

        assert!(listener.unsubscribe());
        assert!(!listener.unsubscribe());
        assert!(!listener.is_subscribed());
        assert_eq!(view.subscriber_count(), 0);

        view.publish(&SensorMessage::new("range", "r1").with_field("value", 1.0));
        assert!(sink.values.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsubscribe_after_world_view_closed() {
        let (view, _sink, _metrics, listener) = setup();
        view.close();

        assert!(listener.unsubscribe());
        assert!(!listener.unsubscribe());
    }

    #[test]
    fn test_subscribe_to_closed_world_view_fails() {
        let view = Arc::new(LocalWorldView::new());
        view.close();

        let result = SensorMessageListener::subscribe(
            view,
            Arc::new(RecordingSink::default()),
            Arc::new(IngestionMetrics::new()),
        );
        assert!(matches!(
            result,
            Err(IngestionError::Subscribe(ContractError::WorldViewClosed))
        ));
    }

    #[test]
    fn test_concurrent_unsubscribe_only_one_wins() {
        let (_view, _sink, _metrics, listener) = setup();
        let listener = Arc::new(listener);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let listener = listener.clone();
                thread::spawn(move || listener.unsubscribe())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let (view, _sink, _metrics, listener) = setup();
        assert_eq!(view.subscriber_count(), 1);
        drop(listener);
        assert_eq!(view.subscriber_count(), 0);
    }
}
