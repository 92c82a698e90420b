//! Feed configuration and ingestion metrics

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::FeedConfig;
use serde::Serialize;

/// Mock feed configuration
#[derive(Debug, Clone)]
pub struct MockFeedConfig {
    /// Transport type tag put on every message
    pub sensor_type: String,

    /// Instance name put on every message
    pub name: String,

    /// Send frequency (Hz)
    pub frequency_hz: f64,

    /// Image width (camera tags only)
    pub image_width: u32,

    /// Image height (camera tags only)
    pub image_height: u32,

    /// Beam count (range scanner tags only)
    pub scan_beams: usize,
}

impl Default for MockFeedConfig {
    fn default() -> Self {
        Self {
            sensor_type: "range".to_string(),
            name: "mock_sensor".to_string(),
            frequency_hz: 10.0,
            image_width: 320,
            image_height: 240,
            scan_beams: 180,
        }
    }
}

impl MockFeedConfig {
    pub fn new(sensor_type: impl Into<String>, name: impl Into<String>, frequency_hz: f64) -> Self {
        Self {
            sensor_type: sensor_type.into(),
            name: name.into(),
            frequency_hz,
            ..Default::default()
        }
    }
}

impl From<&FeedConfig> for MockFeedConfig {
    fn from(feed: &FeedConfig) -> Self {
        Self::new(feed.sensor_type.clone(), feed.name.clone(), feed.frequency_hz)
    }
}

/// Ingestion metrics
///
/// Counts what reached the listener. Per-outcome filing counts belong to
/// the sink (see the registry's filing stats).
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Messages forwarded to the sink
    pub messages_received: AtomicU64,

    /// Messages delivered after unsubscribe and not forwarded
    pub messages_ignored: AtomicU64,
}

impl IngestionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record message received
    pub fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.messages_ignored.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_ignored: self.messages_ignored.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub messages_received: u64,
    pub messages_ignored: u64,
}

impl MetricsSnapshot {
    /// Every delivery seen by the listener, forwarded or not
    pub fn delivered(&self) -> u64 {
        self.messages_received + self.messages_ignored
    }
}
