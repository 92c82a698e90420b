//! Session report.

use std::time::Duration;

use contracts::{SensorReading, SensorType};
use registry::Sensor;
use sensor_module::ModuleStatus;
use serde::Serialize;

/// Latest state of one sensor at the end of a session
#[derive(Debug, Clone, Serialize)]
pub struct SensorSummary {
    pub type_tag: String,
    pub name: String,
    pub category: SensorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    pub reading: SensorReading,
}

impl From<&Sensor> for SensorSummary {
    fn from(sensor: &Sensor) -> Self {
        Self {
            type_tag: sensor.type_tag().to_string(),
            name: sensor.name().to_string(),
            category: sensor.sensor_type(),
            time: sensor.time(),
            reading: sensor.reading().clone(),
        }
    }
}

/// Statistics from a session run
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Wall-clock duration of the session
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,

    /// Messages published into the world view
    pub published: u64,

    /// Module status right before shutdown
    pub status: ModuleStatus,

    /// Every filed sensor, sorted by type then name
    pub sensors: Vec<SensorSummary>,
}

fn serialize_secs<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl SessionReport {
    /// Messages per second published into the world view
    pub fn rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.published as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let filing = &self.status.filing;
        let ingestion = &self.status.ingestion;

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Sensor Master Summary                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Messages published: {} ({:.1}/s)", self.published, self.rate());
        println!("   ├─ Ready: {}", self.status.ready);
        println!("   ├─ Type tags seen: {}", self.status.type_count);
        println!("   └─ Sensors filed: {}", self.status.sensor_count);

        println!("\n📈 Filing");
        println!("   ├─ Created: {}", filing.created);
        println!("   ├─ Updated: {}", filing.updated);
        println!("   ├─ Unsupported: {}", filing.unsupported);
        println!("   ├─ Malformed: {}", filing.malformed);
        println!("   └─ Ignored after unsubscribe: {}", ingestion.messages_ignored);

        if !self.sensors.is_empty() {
            println!("\n📡 Sensors ({})", self.sensors.len());
            for (i, sensor) in self.sensors.iter().enumerate() {
                let prefix = if i == self.sensors.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}/{} [{}] {}",
                    prefix,
                    sensor.type_tag,
                    sensor.name,
                    sensor.category,
                    describe(&sensor.reading)
                );
            }
        }

        println!();
    }
}

/// One-line rendering of a reading
fn describe(reading: &SensorReading) -> String {
    match reading {
        SensorReading::Range(r) => format!("range={:.2}m", r.range),
        SensorReading::RangeScan(s) => {
            let min = s.ranges.iter().copied().fold(f64::INFINITY, f64::min);
            format!("{} beams, min={:.2}m", s.ranges.len(), min)
        }
        SensorReading::Gps(g) => format!("lat={:.5} lon={:.5} fix={}", g.latitude, g.longitude, g.fix),
        SensorReading::Ins(p) | SensorReading::GroundTruth(p) => format!(
            "at ({:.2}, {:.2}, {:.2}) yaw={:.2}",
            p.location.x, p.location.y, p.location.z, p.orientation.z
        ),
        SensorReading::Odometry(o) => format!("pose=({:.2}, {:.2}, {:.2})", o.pose.x, o.pose.y, o.pose.z),
        SensorReading::Encoder(e) => format!("tick={}", e.tick),
        SensorReading::Touch(t) => format!("touch={}", t.touch),
        SensorReading::Imu(i) => format!(
            "accel=({:.2}, {:.2}, {:.2})",
            i.accelerometer.x, i.accelerometer.y, i.accelerometer.z
        ),
        SensorReading::Camera(c) => format!("{}x{} fov={}", c.width, c.height, c.fov),
        SensorReading::Unknown(fields) => format!("{} raw fields", fields.len()),
    }
}
