//! In-memory metrics recorder for tests
//!
//! ```ignore
//! let recorder = CapturingRecorder::default();
//! metrics::with_local_recorder(&recorder, || registry.file_message(&message));
//! assert_eq!(recorder.last_gauge("sensor_master_registry_types"), Some(1.0));
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use ::metrics::{
    Counter, CounterFn, Gauge, GaugeFn, Histogram, Key, KeyName, Metadata, Recorder,
    SharedString, Unit,
};

/// One recorded metric update
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEvent {
    pub name: String,
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

impl MetricEvent {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

type Events = Arc<Mutex<Vec<MetricEvent>>>;

/// Records counter increments and gauge sets in order.
///
/// Gauge increments and decrements are stored as signed deltas.
#[derive(Debug, Default, Clone)]
pub struct CapturingRecorder {
    events: Events,
}

impl CapturingRecorder {
    pub fn events(&self) -> Vec<MetricEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every update of metric `name`
    pub fn events_named(&self, name: &str) -> Vec<MetricEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.name == name)
            .collect()
    }

    /// Most recent value written to metric `name`
    pub fn last_gauge(&self, name: &str) -> Option<f64> {
        self.events_named(name).last().map(|event| event.value)
    }

    fn handle(&self, key: &Key) -> Arc<Handle> {
        Arc::new(Handle {
            name: key.name().to_string(),
            labels: key
                .labels()
                .map(|label| (label.key().to_string(), label.value().to_string()))
                .collect(),
            events: self.events.clone(),
        })
    }
}

struct Handle {
    name: String,
    labels: Vec<(String, String)>,
    events: Events,
}

impl Handle {
    fn push(&self, value: f64) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MetricEvent {
                name: self.name.clone(),
                labels: self.labels.clone(),
                value,
            });
    }
}

impl CounterFn for Handle {
    fn increment(&self, value: u64) {
        self.push(value as f64);
    }

    fn absolute(&self, value: u64) {
        self.push(value as f64);
    }
}

impl GaugeFn for Handle {
    fn increment(&self, value: f64) {
        self.push(value);
    }

    fn decrement(&self, value: f64) {
        self.push(-value);
    }

    fn set(&self, value: f64) {
        self.push(value);
    }
}

impl Recorder for CapturingRecorder {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
        Counter::from_arc(self.handle(key))
    }

    fn register_gauge(&self, key: &Key, _: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(self.handle(key))
    }

    fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}
