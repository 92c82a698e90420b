//! # Sensor Factory
//!
//! Sensor representation and factory module.
//!
//! Responsibilities:
//! - Map transport type tags to sensor categories
//! - Construct empty sensor representations
//! - Decode message fields into typed readings (`update_from_message`)
//!
//! ## Unknown tags
//!
//! By default a tag outside the known table is reported as
//! [`FactoryError::Unsupported`]. With `UnknownSensorPolicy::Retain` the
//! factory instead builds an `Unknown` sensor that keeps the raw fields.

pub mod decode;
pub mod error;
pub mod factory;
pub mod sensor;

pub use contracts::{SensorReading, SensorType, UnknownSensorPolicy};
pub use error::{FactoryError, Result};
pub use factory::SensorFactory;
pub use sensor::Sensor;
