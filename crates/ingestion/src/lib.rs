//! # Ingestion
//!
//! Sensor message ingestion module.
//!
//! Responsibilities:
//! - Subscribe to a world view and forward every sensor message to a sink
//!   (`SensorMessageListener`)
//! - In-process world view for local runs and tests (`LocalWorldView`)
//! - Message sources: synthesized (`MockSensorFeed`) and recorded (`ReplayFeed`)
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{IngestionMetrics, LocalWorldView, MockSensorFeed, SensorMessageListener};
//!
//! let world_view = Arc::new(LocalWorldView::new());
//! let listener = SensorMessageListener::subscribe(
//!     world_view.clone(),
//!     registry.clone(),
//!     Arc::new(IngestionMetrics::new()),
//! )?;
//!
//! let feed = MockSensorFeed::range("front_sonar", 20.0)?;
//! feed.start(world_view.clone());
//! // ...
//! feed.stop();
//! listener.unsubscribe();
//! ```

mod config;
mod error;
mod listener;
mod mock;
mod pacing;
mod replay;
mod world_view;

// Re-exports
pub use config::{IngestionMetrics, MetricsSnapshot, MockFeedConfig};
pub use contracts::SensorMessage;
pub use error::{IngestionError, Result};
pub use listener::SensorMessageListener;
pub use mock::{synthesize, MockSensorFeed};
pub use replay::{read_recording, ReplayFeed};
pub use world_view::LocalWorldView;
