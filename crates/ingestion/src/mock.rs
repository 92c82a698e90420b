//! Mock sensor feed
//!
//! Publishes synthesized sensor messages into a `LocalWorldView` for
//! development and tests without a simulator.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use contracts::{
    CameraReading, EncoderReading, GpsReading, ImuData, OdometryReading, PoseReading,
    RangeReading, RangeScanReading, SensorMessage, SensorType, TouchReading, Vector3,
};
use tracing::{debug, trace, warn};

use crate::config::MockFeedConfig;
use crate::error::{IngestionError, Result};
use crate::pacing::{sleep_while_running, RunningGuard};
use crate::world_view::LocalWorldView;

/// Upper publish rate, matching the `feeds` config rule
const MAX_FREQUENCY_HZ: f64 = 1000.0;

/// Mock sensor feed
///
/// One background thread per feed, sending one message for the configured
/// `(type, name)` every `1 / frequency_hz` seconds. The payload shape is
/// derived from the tag's category; tags outside the known table get a
/// single `value` field.
pub struct MockSensorFeed {
    config: MockFeedConfig,
    interval: Duration,
    running: Arc<AtomicBool>,
    frames_sent: Arc<AtomicU64>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl MockSensorFeed {
    /// Create a feed; `frequency_hz` must be in `(0, 1000]` with a
    /// representable period.
    pub fn new(config: MockFeedConfig) -> Result<Self> {
        let frequency_hz = config.frequency_hz;
        let interval = if frequency_hz > 0.0 && frequency_hz <= MAX_FREQUENCY_HZ {
            Duration::try_from_secs_f64(1.0 / frequency_hz).ok()
        } else {
            None
        };
        let Some(interval) = interval else {
            return Err(IngestionError::invalid_feed(
                &config.name,
                format!("frequency_hz must be in (0, {MAX_FREQUENCY_HZ}], got {frequency_hz}"),
            ));
        };

        Ok(Self {
            config,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            frames_sent: Arc::new(AtomicU64::new(0)),
            handle: Mutex::new(None),
        })
    }

    /// Range finder feed
    pub fn range(name: &str, frequency_hz: f64) -> Result<Self> {
        Self::new(MockFeedConfig::new("range", name, frequency_hz))
    }

    pub fn gps(name: &str, frequency_hz: f64) -> Result<Self> {
        Self::new(MockFeedConfig::new("gps", name, frequency_hz))
    }

    pub fn camera(name: &str, frequency_hz: f64, width: u32, height: u32) -> Result<Self> {
        Self::new(MockFeedConfig {
            image_width: width,
            image_height: height,
            ..MockFeedConfig::new("camera", name, frequency_hz)
        })
    }

    pub fn config(&self) -> &MockFeedConfig {
        &self.config
    }

    /// Start publishing into `world_view`. Calling it again while running is a no-op.
    pub fn start(&self, world_view: Arc<LocalWorldView>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let config = self.config.clone();
        let running = self.running.clone();
        let frames_sent = self.frames_sent.clone();
        let interval = self.interval;

        let handle = thread::spawn(move || {
            let _running = RunningGuard(&running);
            let start_time = Instant::now();
            let mut frame: u64 = 0;

            debug!(
                sensor_type = %config.sensor_type,
                name = %config.name,
                frequency_hz = config.frequency_hz,
                "mock feed started"
            );

            while running.load(Ordering::Relaxed) {
                frame += 1;
                let time = start_time.elapsed().as_secs_f64();
                let message = synthesize(&config, frame).at(time);

                world_view.publish(&message);
                frames_sent.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("sensor_master_feed_messages_total", "feed" => "mock")
                    .increment(1);
                trace!(name = %config.name, frame, time, "mock message sent");

                if !sleep_while_running(interval, &running) {
                    break;
                }
            }

            debug!(name = %config.name, frames = frame, "mock feed stopped");
        });

        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Stop the feed and wait for its thread.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        let handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!(name = %self.config.name, "mock feed thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Messages published so far
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }
}

impl Drop for MockSensorFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Build the message for `frame` of a feed.
pub fn synthesize(config: &MockFeedConfig, frame: u64) -> SensorMessage {
    let message = SensorMessage::new(config.sensor_type.clone(), config.name.clone());
    let step = frame as f64;

    let Some(sensor_type) = SensorType::from_tag(&config.sensor_type) else {
        return message.with_field("value", step);
    };

    match sensor_type {
        SensorType::Range => message.with_payload(&RangeReading {
            range: 2.0 + (frame % 50) as f64 * 0.1,
        }),
        SensorType::RangeScanner => {
            let beams = config.scan_beams.max(1);
            message.with_payload(&RangeScanReading {
                ranges: (0..beams)
                    .map(|i| 5.0 + ((i as u64 + frame) % 20) as f64 * 0.25)
                    .collect(),
                resolution: 180.0 / beams as f64,
                fov: 180.0,
            })
        }
        SensorType::Gps => message.with_payload(&GpsReading {
            latitude: 50.08 + step * 0.0001,
            longitude: 14.42 + step * 0.0001,
            altitude: 200.0,
            fix: true,
            satellites: 8,
        }),
        SensorType::Ins | SensorType::GroundTruth => message.with_payload(&PoseReading {
            location: Vector3::new(step * 0.1, 0.0, 0.0),
            orientation: Vector3::new(0.0, 0.0, (step * 0.01) % std::f64::consts::TAU),
        }),
        SensorType::Odometry => message.with_payload(&OdometryReading {
            pose: Vector3::new(step * 0.1, 0.0, 0.0),
        }),
        SensorType::Encoder => message.with_payload(&EncoderReading { tick: frame as i64 }),
        SensorType::Touch => message.with_payload(&TouchReading {
            touch: frame % 20 == 0,
        }),
        SensorType::Imu => message.with_payload(&ImuData {
            accelerometer: Vector3::new(0.0, 0.0, 9.81),
            gyroscope: Vector3::default(),
            compass: 0.0,
        }),
        SensorType::Camera => message.with_payload(&CameraReading {
            width: config.image_width,
            height: config.image_height,
            fov: 90.0,
            ..Default::default()
        }),
        SensorType::Unknown => message.with_field("value", step),
    }
}
