//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{apply_replay_overrides, Session, SessionConfig};

/// Execute the `run` command
pub async fn run_session(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if let Some(speed) = args.replay_speed {
        if speed.is_nan() || speed <= 0.0 {
            anyhow::bail!("--replay-speed must be > 0, got {speed}");
        }
    }

    apply_replay_overrides(
        &mut config,
        args.replay.as_deref(),
        args.replay_speed,
        args.replay_loop,
    );

    info!(
        feeds = config.feeds.len(),
        replay = ?config.replay.as_ref().map(|r| r.path.display().to_string()),
        unknown_sensors = ?config.registry.unknown_sensors,
        "Configuration loaded"
    );

    if config.feeds.is_empty() && config.replay.is_none() {
        warn!("No feeds and no replay configured - the registry will stay empty");
    }

    let session = Session::new(SessionConfig {
        config,
        duration: (args.duration > 0).then(|| Duration::from_secs(args.duration)),
        report_interval: (args.report_interval > 0)
            .then(|| Duration::from_secs(args.report_interval)),
    });

    info!("Starting session...");
    let report = session
        .run(shutdown_signal())
        .await
        .context("Session execution failed")?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize session report")?;
        println!("{json}");
    } else {
        report.print_summary();
    }

    info!("Sensor Master finished");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
