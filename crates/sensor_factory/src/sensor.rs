//! Sensor representation
//!
//! Latest decoded state of one `(type, name)` pair.

use contracts::{
    MessageDescriptor, SensorCapability, SensorKey, SensorMessage, SensorReading, SensorType,
};
use serde::Serialize;

use crate::decode::decode_reading;
use crate::error::{FactoryError, Result};

/// In-memory state of one filed sensor.
///
/// Type tag, name and category are fixed at construction; only the reading
/// (and its time) change, and only through [`Sensor::update_from_message`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sensor {
    type_tag: SensorKey,
    name: SensorKey,
    sensor_type: SensorType,
    reading: SensorReading,
    time: Option<f64>,
    updated: bool,
}

impl Sensor {
    pub(crate) fn new(type_tag: SensorKey, name: SensorKey, sensor_type: SensorType) -> Self {
        Self {
            type_tag,
            name,
            sensor_type,
            reading: SensorReading::empty(sensor_type),
            time: None,
            updated: false,
        }
    }

    /// Replace the current reading with the one carried by `message`.
    ///
    /// The previous payload is discarded entirely, so applying the same
    /// message twice leaves the same state. If the fields do not decode, the
    /// sensor keeps its previous state.
    pub fn update_from_message(&mut self, message: &SensorMessage) -> Result<()> {
        if message.type_key() != self.type_tag || message.name_key() != self.name {
            return Err(FactoryError::KeyMismatch {
                sensor: self.descriptor().to_string(),
                message: message.descriptor().to_string(),
            });
        }

        let reading = decode_reading(self.sensor_type, &message.fields).map_err(|source| {
            FactoryError::Decode {
                type_tag: self.type_tag.to_string(),
                name: self.name.to_string(),
                source,
            }
        })?;

        self.reading = reading;
        self.time = message.time;
        self.updated = true;
        Ok(())
    }

    /// Normalized type tag this sensor is filed under
    pub fn type_tag(&self) -> &SensorKey {
        &self.type_tag
    }

    /// Normalized instance name
    pub fn name(&self) -> &SensorKey {
        &self.name
    }

    /// Runtime category
    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn capabilities(&self) -> &'static [SensorCapability] {
        self.sensor_type.capabilities()
    }

    /// Latest reading
    pub fn reading(&self) -> &SensorReading {
        &self.reading
    }

    /// Simulation time of the latest reading, if the message carried one
    pub fn time(&self) -> Option<f64> {
        self.time
    }

    /// Whether at least one update has been applied
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    pub fn descriptor(&self) -> MessageDescriptor {
        MessageDescriptor {
            sensor_type: self.type_tag.clone(),
            name: self.name.clone(),
        }
    }
}
