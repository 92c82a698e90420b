//! # Sensor Module
//!
//! Lifecycle wrapper owning the sensor registry and the listener that feeds
//! it. The owning control loop polls [`SensorMasterModule::is_ready`] before
//! running sensor-dependent behavior.
//!
//! ```ignore
//! let module = SensorMasterModule::start_new(world_view, &config.registry)?;
//! while !module.is_ready() {
//!     std::thread::sleep(Duration::from_millis(10));
//! }
//! let sonars = module.sensors_by_type("sonar").unwrap_or_default();
//! module.shutdown();
//! ```

mod error;
mod module;

pub use error::{ModuleError, Result};
pub use module::{ModuleState, ModuleStatus, SensorMasterModule};
