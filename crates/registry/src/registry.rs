//! SensorRegistry core implementation
//!
//! Two-level keyed store: normalized type tag -> normalized name -> sensor.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use contracts::{
    FileOutcome, MessageDescriptor, RegistryConfig, SensorClass, SensorKey, SensorMessage,
    SensorMessageSink, SensorType,
};
use sensor_factory::{Sensor, SensorFactory};
use tracing::{debug, info, instrument, trace, warn};

use crate::stats::{FilingStats, FilingStatsSnapshot};

type Bucket = HashMap<SensorKey, Sensor>;
type Buckets = HashMap<SensorKey, Bucket>;

/// Sensor Registry
///
/// Holds the latest state of every `(type, name)` pair seen on the sensor
/// stream. A message for a known pair overwrites that sensor in place; there
/// is no history.
///
/// # Concurrency
///
/// One writer ([`file_message`](Self::file_message)) and any number of
/// readers. Each filing runs inside a single write-lock scope, so readers
/// never see a half-built bucket or a partially decoded reading. Query
/// results are copies.
///
/// # Bucket permanence
///
/// A type bucket, once created, is never removed. It is created before the
/// factory is consulted, so an unsupported tag leaves an empty bucket
/// behind: `sensors_by_type` then answers `Some(vec![])` ("known, empty")
/// rather than `None` ("never seen").
#[derive(Debug, Default)]
pub struct SensorRegistry {
    factory: SensorFactory,
    buckets: RwLock<Buckets>,
    stats: FilingStats,
}

impl SensorRegistry {
    /// Create an empty registry with the default factory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry using `factory` for new sensors
    pub fn with_factory(factory: SensorFactory) -> Self {
        Self {
            factory,
            buckets: RwLock::new(HashMap::new()),
            stats: FilingStats::new(),
        }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::with_factory(SensorFactory::from_config(config))
    }

    /// File one message: update the existing sensor or create a new one.
    ///
    /// Never fails; dropped messages are reported through logs, metrics and
    /// [`stats`](Self::stats).
    #[instrument(
        name = "registry_file_message",
        level = "trace",
        skip(self, message),
        fields(sensor_type = %message.sensor_type, name = %message.name)
    )]
    pub fn file_message(&self, message: &SensorMessage) -> FileOutcome {
        let type_key = message.type_key();
        let name_key = message.name_key();

        let (outcome, category) = if type_key.is_empty() || name_key.is_empty() {
            warn!(
                sensor_type = %message.sensor_type,
                name = %message.name,
                "dropping sensor message with empty type or name"
            );
            (FileOutcome::Malformed, None)
        } else {
            let category = self.factory.resolve(&type_key);
            (self.upsert(type_key, name_key, message), category)
        };

        self.stats.record(outcome);
        observability::record_message_filed(category, outcome);
        outcome
    }

    fn upsert(&self, type_key: SensorKey, name_key: SensorKey, message: &SensorMessage) -> FileOutcome {
        let mut buckets = self.write();

        // Hot path: known sensor, overwrite in place
        if let Some(sensor) = buckets
            .get_mut(type_key.as_str())
            .and_then(|bucket| bucket.get_mut(name_key.as_str()))
        {
            return match sensor.update_from_message(message) {
                Ok(()) => {
                    trace!(type_tag = %type_key, name = %name_key, "sensor updated");
                    FileOutcome::Updated
                }
                Err(e) => {
                    warn!(error = %e, "keeping previous reading, update did not decode");
                    FileOutcome::Malformed
                }
            };
        }

        let first_of_type = !buckets.contains_key(type_key.as_str());
        let bucket = buckets.entry(type_key.clone()).or_default();

        let mut sensor = match self.factory.create_sensor(&type_key, &name_key) {
            Ok(sensor) => sensor,
            Err(e) => {
                if first_of_type {
                    warn!(error = %e, name = %name_key, "sensor is not supported, dropping its messages");
                } else {
                    debug!(type_tag = %type_key, name = %name_key, "unsupported sensor message dropped");
                }
                observability::record_unsupported_sensor();
                if first_of_type {
                    record_size(&buckets);
                }
                return FileOutcome::Unsupported;
            }
        };

        if let Err(e) = sensor.update_from_message(message) {
            warn!(error = %e, "first message of sensor did not decode, not filing it");
            if first_of_type {
                record_size(&buckets);
            }
            return FileOutcome::Malformed;
        }

        info!(
            type_tag = %type_key,
            name = %name_key,
            sensor_type = %sensor.sensor_type(),
            "new sensor filed"
        );
        bucket.insert(name_key, sensor);
        record_size(&buckets);

        FileOutcome::Created
    }

    /// At least one sensor has been filed.
    pub fn is_ready(&self) -> bool {
        self.read().values().any(|bucket| !bucket.is_empty())
    }

    /// At least one sensor of category `sensor_type` has been filed.
    pub fn is_sensor_ready(&self, sensor_type: SensorType) -> bool {
        self.read()
            .values()
            .flat_map(HashMap::values)
            .any(|sensor| sensor.sensor_type() == sensor_type)
    }

    /// All sensors filed under `type_tag` (case-insensitive).
    ///
    /// `None` if the tag was never seen (or is empty), `Some` with a possibly
    /// empty list otherwise.
    pub fn sensors_by_type(&self, type_tag: &str) -> Option<Vec<Sensor>> {
        if type_tag.is_empty() {
            return None;
        }
        let key = SensorKey::normalize(type_tag);
        let buckets = self.read();
        let bucket = buckets.get(key.as_str())?;

        let mut sensors: Vec<Sensor> = bucket.values().cloned().collect();
        sort_sensors(&mut sensors);
        Some(sensors)
    }

    /// All sensors whose runtime category is `sensor_type`.
    ///
    /// `SensorType::Unknown` selects the sensors kept through the retain
    /// policy for unknown tags.
    pub fn sensors_by_sensor_type(&self, sensor_type: SensorType) -> Vec<Sensor> {
        self.collect(|sensor| sensor.sensor_type() == sensor_type)
    }

    /// All sensors belonging to `class`; `SensorClass::Any` returns everything.
    pub fn sensors_by_class(&self, class: impl Into<SensorClass>) -> Vec<Sensor> {
        let class = class.into();
        self.collect(|sensor| class.matches(sensor.sensor_type()))
    }

    /// Exact lookup (case-insensitive). Empty keys never match.
    pub fn sensor_by_type_name(&self, type_tag: &str, name: &str) -> Option<Sensor> {
        if type_tag.is_empty() || name.is_empty() {
            return None;
        }
        let type_key = SensorKey::normalize(type_tag);
        let name_key = SensorKey::normalize(name);

        self.read()
            .get(type_key.as_str())?
            .get(name_key.as_str())
            .cloned()
    }

    /// `(type, name)` of every filed sensor, sorted.
    pub fn non_empty_descriptions(&self) -> Vec<MessageDescriptor> {
        let mut descriptors: Vec<MessageDescriptor> = self
            .read()
            .values()
            .flat_map(HashMap::values)
            .map(Sensor::descriptor)
            .collect();
        descriptors.sort();
        descriptors
    }

    /// Every type tag that has a bucket, including empty ones, sorted.
    pub fn known_types(&self) -> Vec<SensorKey> {
        let mut types: Vec<SensorKey> = self.read().keys().cloned().collect();
        types.sort();
        types
    }

    /// Number of filed sensors
    pub fn len(&self) -> usize {
        self.read().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        !self.is_ready()
    }

    /// Number of type buckets, including empty ones
    pub fn type_count(&self) -> usize {
        self.read().len()
    }

    pub fn stats(&self) -> FilingStatsSnapshot {
        self.stats.snapshot()
    }

    fn collect(&self, mut predicate: impl FnMut(&Sensor) -> bool) -> Vec<Sensor> {
        let mut sensors: Vec<Sensor> = self
            .read()
            .values()
            .flat_map(HashMap::values)
            .filter(|sensor| predicate(sensor))
            .cloned()
            .collect();
        sort_sensors(&mut sensors);
        sensors
    }

    // A panicking reader cannot leave the map half-written, so a poisoned
    // lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Buckets> {
        self.buckets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Buckets> {
        self.buckets.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SensorMessageSink for SensorRegistry {
    fn file_message(&self, message: &SensorMessage) -> FileOutcome {
        SensorRegistry::file_message(self, message)
    }
}

fn record_size(buckets: &Buckets) {
    let sensor_count = buckets.values().map(HashMap::len).sum();
    observability::record_registry_size(buckets.len(), sensor_count);
}

fn sort_sensors(sensors: &mut [Sensor]) {
    sensors.sort_by(|a, b| (a.type_tag(), a.name()).cmp(&(b.type_tag(), b.name())));
}
