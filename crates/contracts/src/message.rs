//! SensorMessage - inbound event from the world view

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{MessageDescriptor, SensorKey};

/// One sensor reading as delivered by the transport.
///
/// Wire shape (JSON):
///
/// ```json
/// {"type": "range", "name": "r1", "time": 12.5, "value": 3.2}
/// ```
///
/// Everything besides `type`, `name` and `time` is kept as raw fields and
/// decoded by the sensor representation that the message is filed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorMessage {
    /// Sensor type tag, as sent (not normalized)
    #[serde(rename = "type")]
    pub sensor_type: String,

    /// Sensor instance name, as sent (not normalized)
    pub name: String,

    /// Simulation time of the reading (seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,

    /// Type-specific payload fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SensorMessage {
    /// Create a message without payload fields.
    pub fn new(sensor_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            sensor_type: sensor_type.into(),
            name: name.into(),
            time: None,
            fields: Map::new(),
        }
    }

    /// Builder-style time setter.
    pub fn at(mut self, time: f64) -> Self {
        self.time = Some(time);
        self
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Replace all payload fields with the fields of a serializable value.
    ///
    /// Non-object values are ignored.
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        if let Ok(Value::Object(fields)) = serde_json::to_value(payload) {
            self.fields = fields;
        }
        self
    }

    /// Normalized type tag.
    pub fn type_key(&self) -> SensorKey {
        SensorKey::normalize(&self.sensor_type)
    }

    /// Normalized instance name.
    pub fn name_key(&self) -> SensorKey {
        SensorKey::normalize(&self.name)
    }

    /// Normalized `(type, name)` pair.
    pub fn descriptor(&self) -> MessageDescriptor {
        MessageDescriptor {
            sensor_type: self.type_key(),
            name: self.name_key(),
        }
    }
}
