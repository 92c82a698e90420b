//! Session orchestrator - wires world view, module and feeds together.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{ReplayConfig, SensorMasterConfig};
use ingestion::{LocalWorldView, MockFeedConfig, MockSensorFeed, ReplayFeed};
use sensor_module::SensorMasterModule;
use tracing::{info, warn};

use super::report::{SensorSummary, SessionReport};

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Loaded and validated configuration
    pub config: SensorMasterConfig,

    /// Stop after this long (None = until shutdown signal)
    pub duration: Option<Duration>,

    /// Readiness report period (None = disabled)
    pub report_interval: Option<Duration>,
}

/// One run of the module against its feeds
pub struct Session {
    config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run until the duration elapses or `shutdown` resolves.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<SessionReport> {
        let start_time = Instant::now();
        let config = &self.config.config;

        let world_view = Arc::new(LocalWorldView::new());
        let module = Arc::new(
            SensorMasterModule::start_new(world_view.clone(), &config.registry)
                .context("Failed to start sensor module")?,
        );

        let feeds = config
            .feeds
            .iter()
            .map(|feed| {
                MockSensorFeed::new(MockFeedConfig::from(feed))
                    .with_context(|| format!("Invalid feed {}", feed.name))
            })
            .collect::<Result<Vec<_>>>()?;

        let replay = config
            .replay
            .as_ref()
            .map(|replay| {
                ReplayFeed::load(replay)
                    .with_context(|| format!("Failed to load replay {}", replay.path.display()))
            })
            .transpose()?;

        for feed in &feeds {
            feed.start(world_view.clone());
        }
        if let Some(replay) = &replay {
            info!(path = %replay.path().display(), records = replay.len(), "Starting replay");
            replay.start(world_view.clone());
        }

        info!(
            feeds = feeds.len(),
            replay = replay.is_some(),
            duration = ?self.config.duration,
            "Session running"
        );

        self.wait(&module, shutdown).await;

        // Snapshot before teardown; the registry is discarded on shutdown
        let sensors: Vec<SensorSummary> = module
            .sensors_by_class(contracts::SensorClass::Any)
            .iter()
            .map(SensorSummary::from)
            .collect();
        let final_status = module.status();

        let teardown_module = module.clone();
        let teardown_view = world_view.clone();
        tokio::task::spawn_blocking(move || {
            for feed in &feeds {
                feed.stop();
            }
            if let Some(replay) = &replay {
                replay.stop();
            }
            teardown_module.shutdown();
            teardown_view.close();
        })
        .await
        .context("Session teardown panicked")?;

        let report = SessionReport {
            duration: start_time.elapsed(),
            published: world_view.published(),
            status: final_status,
            sensors,
        };

        info!(
            duration_secs = report.duration.as_secs_f64(),
            sensors = report.sensors.len(),
            published = report.published,
            "Session shutdown complete"
        );

        Ok(report)
    }

    async fn wait(&self, module: &SensorMasterModule, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        let deadline = async {
            match self.config.duration {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        // Never ticks when reporting is disabled
        let period = self.config.report_interval.unwrap_or(Duration::from_secs(3600));
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        let reporting = self.config.report_interval.is_some();
        let mut was_ready = false;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping session...");
                    break;
                }
                _ = &mut deadline => {
                    info!("Session duration reached");
                    break;
                }
                _ = ticker.tick(), if reporting => {
                    let status = module.status();
                    if status.ready && !was_ready {
                        info!(sensors = status.sensor_count, "Registry ready");
                    }
                    was_ready = status.ready;
                    info!(
                        ready = status.ready,
                        types = status.type_count,
                        sensors = status.sensor_count,
                        created = status.filing.created,
                        updated = status.filing.updated,
                        dropped = status.filing.dropped(),
                        "Registry report"
                    );
                }
            }
        }
    }
}

/// Apply `run` command overrides to the replay section
pub fn apply_replay_overrides(
    config: &mut SensorMasterConfig,
    path: Option<&std::path::Path>,
    speed: Option<f64>,
    loop_playback: bool,
) {
    if let Some(path) = path {
        let replay = config
            .replay
            .get_or_insert_with(|| ReplayConfig::new(path));
        replay.path = path.to_path_buf();
    }

    if let Some(replay) = config.replay.as_mut() {
        if let Some(speed) = speed {
            replay.speed_multiplier = speed;
        }
        if loop_playback {
            replay.loop_playback = true;
        }
    }
}
