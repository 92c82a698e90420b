//! SensorMasterConfig - Config Loader output
//!
//! Describes the registry policy and the feeds publishing into the local
//! world view.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete module configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SensorMasterConfig {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Registry behaviour
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Synthetic sensor feeds
    #[serde(default)]
    #[validate(nested)]
    pub feeds: Vec<FeedConfig>,

    /// Recorded message replay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub replay: Option<ReplayConfig>,
}

/// Registry configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// What to do with type tags outside the known table
    #[serde(default)]
    pub unknown_sensors: UnknownSensorPolicy,
}

/// Handling of messages whose type tag the factory does not know
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownSensorPolicy {
    /// Report and drop the message
    #[default]
    Drop,
    /// File it as an `Unknown` sensor carrying the raw fields
    Retain,
}

/// One synthetic sensor publishing at a fixed rate
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedConfig {
    /// Sensor instance name
    #[validate(length(min = 1, message = "feed name cannot be empty"))]
    pub name: String,

    /// Transport type tag (e.g. "sonar", "RangeScanner")
    #[validate(length(min = 1, message = "feed sensor_type cannot be empty"))]
    pub sensor_type: String,

    /// Publish rate (Hz), must be in (0, 1000]
    #[serde(default = "default_frequency_hz")]
    #[validate(range(
        exclusive_min = 0.0,
        max = 1000.0,
        message = "frequency_hz must be in (0, 1000]"
    ))]
    pub frequency_hz: f64,
}

fn default_frequency_hz() -> f64 {
    10.0
}

/// Replay of a recorded JSON-lines message file
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReplayConfig {
    /// JSON-lines file, one `SensorMessage` per line
    pub path: PathBuf,

    /// Playback speed multiplier (1.0 = recorded speed)
    #[serde(default = "default_speed_multiplier")]
    #[validate(range(exclusive_min = 0.0, message = "speed_multiplier must be > 0"))]
    pub speed_multiplier: f64,

    /// Restart from the first message when the file ends
    #[serde(default)]
    pub loop_playback: bool,
}

fn default_speed_multiplier() -> f64 {
    1.0
}

impl ReplayConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            speed_multiplier: default_speed_multiplier(),
            loop_playback: false,
        }
    }
}
