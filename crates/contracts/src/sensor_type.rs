//! Sensor categories, capabilities and class filters

use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime category of a filed sensor.
///
/// Several transport tags can map onto one category (a sonar and an IR
/// range finder both report a single distance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Range,
    RangeScanner,
    Gps,
    Ins,
    GroundTruth,
    Odometry,
    Encoder,
    Touch,
    Imu,
    Camera,
    /// Tag outside the known table, retained with its raw fields
    Unknown,
}

impl SensorType {
    /// All known categories, `Unknown` excluded.
    pub const KNOWN: [SensorType; 10] = [
        SensorType::Range,
        SensorType::RangeScanner,
        SensorType::Gps,
        SensorType::Ins,
        SensorType::GroundTruth,
        SensorType::Odometry,
        SensorType::Encoder,
        SensorType::Touch,
        SensorType::Imu,
        SensorType::Camera,
    ];

    /// Resolve a transport type tag (case-insensitive).
    ///
    /// Returns `None` for tags outside the known table; whether such tags
    /// are dropped or kept as `Unknown` is the factory's decision.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "range" | "sonar" | "ir" => Some(Self::Range),
            "rangescanner" | "laser" | "irscanner" | "lidar" => Some(Self::RangeScanner),
            "gps" => Some(Self::Gps),
            "ins" => Some(Self::Ins),
            "groundtruth" => Some(Self::GroundTruth),
            "odometry" => Some(Self::Odometry),
            "encoder" => Some(Self::Encoder),
            "touch" => Some(Self::Touch),
            "imu" | "acceleration" => Some(Self::Imu),
            "camera" => Some(Self::Camera),
            _ => None,
        }
    }

    /// Canonical tag used when synthesizing messages for this category.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Range => "range",
            Self::RangeScanner => "rangescanner",
            Self::Gps => "gps",
            Self::Ins => "ins",
            Self::GroundTruth => "groundtruth",
            Self::Odometry => "odometry",
            Self::Encoder => "encoder",
            Self::Touch => "touch",
            Self::Imu => "imu",
            Self::Camera => "camera",
            Self::Unknown => "unknown",
        }
    }

    /// Capabilities declared by this category.
    pub fn capabilities(self) -> &'static [SensorCapability] {
        use SensorCapability::*;
        match self {
            Self::Range | Self::RangeScanner => &[Ranging],
            Self::Gps => &[Positioning],
            Self::Ins | Self::GroundTruth => &[Positioning, Orientation],
            Self::Odometry => &[Positioning, Motion],
            Self::Encoder => &[Motion],
            Self::Touch => &[Contact],
            Self::Imu => &[Motion, Orientation],
            Self::Camera => &[Imaging],
            Self::Unknown => &[],
        }
    }

    /// Whether this category declares `capability`.
    pub fn has_capability(self, capability: SensorCapability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// What kind of information a sensor contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorCapability {
    /// Distance to obstacles
    Ranging,
    /// Absolute or dead-reckoned position
    Positioning,
    /// Heading / attitude
    Orientation,
    /// Velocity, acceleration or wheel motion
    Motion,
    /// Bumper / touch contact
    Contact,
    /// Image frames
    Imaging,
}

/// Class filter for `sensors_by_class` style queries.
///
/// `Any` is the supertype of every sensor, `Capability` selects every
/// category that declares the capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorClass {
    Any,
    Type(SensorType),
    Capability(SensorCapability),
}

impl SensorClass {
    pub fn matches(self, sensor_type: SensorType) -> bool {
        match self {
            Self::Any => true,
            Self::Type(t) => t == sensor_type,
            Self::Capability(c) => sensor_type.has_capability(c),
        }
    }
}

impl From<SensorType> for SensorClass {
    fn from(sensor_type: SensorType) -> Self {
        Self::Type(sensor_type)
    }
}

impl From<SensorCapability> for SensorClass {
    fn from(capability: SensorCapability) -> Self {
        Self::Capability(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_case_insensitive() {
        assert_eq!(SensorType::from_tag("Sonar"), Some(SensorType::Range));
        assert_eq!(SensorType::from_tag("RANGESCANNER"), Some(SensorType::RangeScanner));
        assert_eq!(SensorType::from_tag("GroundTruth"), Some(SensorType::GroundTruth));
        assert_eq!(SensorType::from_tag("victim"), None);
        assert_eq!(SensorType::from_tag(""), None);
    }

    #[test]
    fn test_canonical_tag_round_trips() {
        for ty in SensorType::KNOWN {
            assert_eq!(SensorType::from_tag(ty.tag()), Some(ty));
        }
    }

    #[test]
    fn test_class_matching() {
        assert!(SensorClass::Any.matches(SensorType::Unknown));
        assert!(SensorClass::Type(SensorType::Gps).matches(SensorType::Gps));
        assert!(!SensorClass::Type(SensorType::Gps).matches(SensorType::Ins));

        let ranging = SensorClass::from(SensorCapability::Ranging);
        assert!(ranging.matches(SensorType::Range));
        assert!(ranging.matches(SensorType::RangeScanner));
        assert!(!ranging.matches(SensorType::Camera));
        assert!(!ranging.matches(SensorType::Unknown));
    }
}
