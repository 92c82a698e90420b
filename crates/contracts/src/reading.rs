//! Decoded sensor readings
//!
//! One payload struct per sensor category. Field names follow the
//! transport's message fields.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::SensorType;

/// Latest decoded reading of one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SensorReading {
    /// Sonar / IR single distance
    Range(RangeReading),

    /// Laser or IR scanner sweep
    RangeScan(RangeScanReading),

    /// GPS fix
    Gps(GpsReading),

    /// Inertial navigation estimate
    Ins(PoseReading),

    /// Simulator ground truth pose
    GroundTruth(PoseReading),

    /// Wheel odometry
    Odometry(OdometryReading),

    /// Joint / wheel encoder
    Encoder(EncoderReading),

    /// Bumper contact
    Touch(TouchReading),

    /// IMU sample
    Imu(ImuData),

    /// Camera frame
    Camera(CameraReading),

    /// Raw fields of a sensor outside the known table
    Unknown(Map<String, Value>),
}

impl SensorReading {
    /// Empty reading for a freshly constructed sensor of `sensor_type`.
    pub fn empty(sensor_type: SensorType) -> Self {
        match sensor_type {
            SensorType::Range => Self::Range(RangeReading::default()),
            SensorType::RangeScanner => Self::RangeScan(RangeScanReading::default()),
            SensorType::Gps => Self::Gps(GpsReading::default()),
            SensorType::Ins => Self::Ins(PoseReading::default()),
            SensorType::GroundTruth => Self::GroundTruth(PoseReading::default()),
            SensorType::Odometry => Self::Odometry(OdometryReading::default()),
            SensorType::Encoder => Self::Encoder(EncoderReading::default()),
            SensorType::Touch => Self::Touch(TouchReading::default()),
            SensorType::Imu => Self::Imu(ImuData::default()),
            SensorType::Camera => Self::Camera(CameraReading::default()),
            SensorType::Unknown => Self::Unknown(Map::new()),
        }
    }

    /// Category this reading belongs to.
    pub fn sensor_type(&self) -> SensorType {
        match self {
            Self::Range(_) => SensorType::Range,
            Self::RangeScan(_) => SensorType::RangeScanner,
            Self::Gps(_) => SensorType::Gps,
            Self::Ins(_) => SensorType::Ins,
            Self::GroundTruth(_) => SensorType::GroundTruth,
            Self::Odometry(_) => SensorType::Odometry,
            Self::Encoder(_) => SensorType::Encoder,
            Self::Touch(_) => SensorType::Touch,
            Self::Imu(_) => SensorType::Imu,
            Self::Camera(_) => SensorType::Camera,
            Self::Unknown(_) => SensorType::Unknown,
        }
    }

    /// Distance of a range reading, if this is one.
    pub fn as_range(&self) -> Option<f64> {
        match self {
            Self::Range(r) => Some(r.range),
            _ => None,
        }
    }
}

/// Single distance measurement (meters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeReading {
    #[serde(alias = "value")]
    pub range: f64,
}

/// Distance sweep of a scanning sensor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeScanReading {
    /// Distances in sweep order (meters)
    pub ranges: Vec<f64>,

    /// Angular step between samples (rad)
    #[serde(default)]
    pub resolution: f64,

    /// Field of view (rad)
    #[serde(default)]
    pub fov: f64,
}

/// GPS fix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsReading {
    /// Latitude (degrees)
    pub latitude: f64,

    /// Longitude (degrees)
    pub longitude: f64,

    /// Altitude (meters)
    #[serde(default)]
    pub altitude: f64,

    #[serde(default)]
    pub fix: bool,

    #[serde(default)]
    pub satellites: u32,
}

/// Position plus orientation (roll, pitch, yaw in x, y, z).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseReading {
    pub location: Vector3,
    pub orientation: Vector3,
}

/// Odometry pose: x, y and heading stored as x, y, z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OdometryReading {
    pub pose: Vector3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EncoderReading {
    pub tick: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TouchReading {
    pub touch: bool,
}

/// IMU sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuData {
    /// Accelerometer (m/s²)
    pub accelerometer: Vector3,

    /// Gyroscope (rad/s)
    pub gyroscope: Vector3,

    /// Compass (rad)
    #[serde(default)]
    pub compass: f64,
}

/// Camera frame header plus optional raw pixels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraReading {
    pub width: u32,
    pub height: u32,

    /// Horizontal field of view (rad)
    #[serde(default)]
    pub fov: f64,

    /// Raw pixel data, empty when the transport only sends the header
    #[serde(default, skip_serializing_if = "Bytes::is_empty")]
    pub data: Bytes,
}

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}
