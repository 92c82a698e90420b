//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Key Model
//! - A sensor is identified by its `(type tag, instance name)` pair
//! - Both keys are lower-cased on entry (`SensorKey`)
//! - Time is the simulator's clock (seconds, f64), carried per message when sent

mod config;
mod error;
mod message;
mod reading;
mod sensor_key;
mod sensor_type;
mod world_view;

pub use config::*;
pub use error::*;
pub use message::SensorMessage;
pub use reading::*;
pub use sensor_key::{MessageDescriptor, SensorKey};
pub use sensor_type::{SensorCapability, SensorClass, SensorType};
pub use world_view::{
    FileOutcome, SensorMessageCallback, SensorMessageSink, SubscriptionId, WorldView,
};
