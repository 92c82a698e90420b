//! # Registry
//!
//! Live sensor registry: the latest state of every sensor seen on the
//! stream, keyed by normalized `(type, name)`.
//!
//! ## Example
//!
//! ```ignore
//! use registry::SensorRegistry;
//!
//! let registry = SensorRegistry::new();
//! registry.file_message(&message);
//!
//! if let Some(sonars) = registry.sensors_by_type("sonar") {
//!     for sensor in sonars {
//!         println!("{} -> {:?}", sensor.name(), sensor.reading());
//!     }
//! }
//! ```

pub mod registry;
pub mod stats;

pub use registry::SensorRegistry;
pub use sensor_factory::{Sensor, SensorFactory};
pub use stats::{FilingStats, FilingStatsSnapshot};
