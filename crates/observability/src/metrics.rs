//! Registry metrics
//!
//! Thin wrappers over the `metrics` facade so every crate records the same
//! metric names and labels.

use contracts::{FileOutcome, SensorType};
use metrics::{counter, gauge};

/// Label value for a message's category.
///
/// Raw transport tags never become label values, so the label set stays
/// bounded by the category table. Tags without a category, including empty
/// ones, share the `"unsupported"` value.
pub fn category_label(sensor_type: Option<SensorType>) -> &'static str {
    sensor_type.map_or("unsupported", SensorType::tag)
}

/// Record the outcome of filing one message.
///
/// # Example
///
/// ```ignore
/// let outcome = registry.file_message(&message);
/// observability::record_message_filed(SensorType::from_tag(&message.sensor_type), outcome);
/// ```
pub fn record_message_filed(sensor_type: Option<SensorType>, outcome: FileOutcome) {
    counter!(
        "sensor_master_messages_total",
        "sensor_type" => category_label(sensor_type),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Record a message dropped because its type tag is unsupported.
pub fn record_unsupported_sensor() {
    counter!("sensor_master_unsupported_messages_total").increment(1);
}

/// Record current registry size.
pub fn record_registry_size(type_count: usize, sensor_count: usize) {
    gauge!("sensor_master_registry_types").set(type_count as f64);
    gauge!("sensor_master_registry_sensors").set(sensor_count as f64);
}

/// Record a world view subscription change (`delta` = +1 / -1).
pub fn record_subscription_change(delta: f64) {
    gauge!("sensor_master_active_subscriptions").increment(delta);
}
