//! SensorFactory implementation
//!
//! Maps a type tag to a fresh sensor representation.

use contracts::{RegistryConfig, SensorKey, SensorType, UnknownSensorPolicy};
use tracing::trace;

use crate::error::{FactoryError, Result};
use crate::sensor::Sensor;

/// Sensor Factory
///
/// Pure mapping from type tag to sensor constructor; keeps no state between
/// calls besides its policy for unknown tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorFactory {
    unknown_policy: UnknownSensorPolicy,
}

impl SensorFactory {
    /// Create a factory that rejects unknown tags
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory with an explicit unknown-tag policy
    pub fn with_policy(unknown_policy: UnknownSensorPolicy) -> Self {
        Self { unknown_policy }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::with_policy(config.unknown_sensors)
    }

    pub fn unknown_policy(&self) -> UnknownSensorPolicy {
        self.unknown_policy
    }

    /// Category a tag would be filed as, `None` if the tag is rejected.
    pub fn resolve(&self, type_tag: &str) -> Option<SensorType> {
        match SensorType::from_tag(type_tag) {
            Some(sensor_type) => Some(sensor_type),
            None => match self.unknown_policy {
                UnknownSensorPolicy::Drop => None,
                UnknownSensorPolicy::Retain => Some(SensorType::Unknown),
            },
        }
    }

    /// Construct an empty sensor for `(type_tag, name)`.
    ///
    /// # Errors
    /// [`FactoryError::Unsupported`] when the tag is outside the known table
    /// and the policy is `Drop`.
    pub fn create_sensor(&self, type_tag: &SensorKey, name: &SensorKey) -> Result<Sensor> {
        let sensor_type = self
            .resolve(type_tag)
            .ok_or_else(|| FactoryError::unsupported(type_tag.as_str()))?;

        trace!(type_tag = %type_tag, name = %name, ?sensor_type, "sensor constructed");
        Ok(Sensor::new(type_tag.clone(), name.clone(), sensor_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SensorMessage;

    #[test]
    fn test_known_tags() {
        let factory = SensorFactory::new();

        let sonar = factory
            .create_sensor(&"sonar".into(), &"front".into())
            .unwrap();
        assert_eq!(sonar.sensor_type(), SensorType::Range);
        assert_eq!(sonar.type_tag(), "sonar");
        assert!(!sonar.is_updated());

        let laser = factory
            .create_sensor(&"Laser".into(), &"Scanner1".into())
            .unwrap();
        assert_eq!(laser.sensor_type(), SensorType::RangeScanner);
        assert_eq!(laser.name(), "scanner1");
    }

    #[test]
    fn test_unknown_tag_dropped_by_default() {
        let factory = SensorFactory::new();
        let err = factory
            .create_sensor(&"victim".into(), &"v1".into())
            .unwrap_err();

        assert!(err.is_unsupported());
        assert!(err.to_string().contains("victim"));
        assert_eq!(factory.resolve("victim"), None);
    }

    #[test]
    fn test_unknown_tag_retained() {
        let factory = SensorFactory::with_policy(UnknownSensorPolicy::Retain);
        let mut sensor = factory
            .create_sensor(&"victim".into(), &"v1".into())
            .unwrap();
        assert_eq!(sensor.sensor_type(), SensorType::Unknown);

        let msg = SensorMessage::new("victim", "v1").with_field("status", "found");
        sensor.update_from_message(&msg).unwrap();
        match sensor.reading() {
            contracts::SensorReading::Unknown(fields) => {
                assert_eq!(fields.get("status").and_then(|v| v.as_str()), Some("found"));
            }
            other => panic!("unexpected reading: {other:?}"),
        }
    }

    #[test]
    fn test_factory_is_stateless() {
        let factory = SensorFactory::new();
        let a = factory.create_sensor(&"gps".into(), &"g".into()).unwrap();
        let b = factory.create_sensor(&"gps".into(), &"g".into()).unwrap();
        assert_eq!(a, b);
    }
}
