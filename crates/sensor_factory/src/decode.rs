//! Message field decoding
//!
//! Turns the raw fields of a `SensorMessage` into the typed reading of a
//! sensor category.

use contracts::{
    CameraReading, EncoderReading, GpsReading, ImuData, OdometryReading, PoseReading,
    RangeReading, RangeScanReading, SensorReading, SensorType, TouchReading,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[inline]
fn from_fields<T: DeserializeOwned>(fields: &Map<String, Value>) -> serde_json::Result<T> {
    serde_json::from_value(Value::Object(fields.clone()))
}

/// Decode `fields` as a reading of `sensor_type`.
///
/// Fails when a required field is missing or has the wrong shape; unknown
/// extra fields are ignored. `Unknown` sensors keep the raw fields as-is.
pub fn decode_reading(
    sensor_type: SensorType,
    fields: &Map<String, Value>,
) -> serde_json::Result<SensorReading> {
    let reading = match sensor_type {
        SensorType::Range => SensorReading::Range(from_fields::<RangeReading>(fields)?),
        SensorType::RangeScanner => {
            SensorReading::RangeScan(from_fields::<RangeScanReading>(fields)?)
        }
        SensorType::Gps => SensorReading::Gps(from_fields::<GpsReading>(fields)?),
        SensorType::Ins => SensorReading::Ins(from_fields::<PoseReading>(fields)?),
        SensorType::GroundTruth => SensorReading::GroundTruth(from_fields::<PoseReading>(fields)?),
        SensorType::Odometry => SensorReading::Odometry(from_fields::<OdometryReading>(fields)?),
        SensorType::Encoder => SensorReading::Encoder(from_fields::<EncoderReading>(fields)?),
        SensorType::Touch => SensorReading::Touch(from_fields::<TouchReading>(fields)?),
        SensorType::Imu => SensorReading::Imu(from_fields::<ImuData>(fields)?),
        SensorType::Camera => SensorReading::Camera(from_fields::<CameraReading>(fields)?),
        SensorType::Unknown => SensorReading::Unknown(fields.clone()),
    };

    Ok(reading)
}
