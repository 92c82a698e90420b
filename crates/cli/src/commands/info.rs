//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{SensorCapability, SensorMasterConfig, SensorType, UnknownSensorPolicy};
use sensor_factory::SensorFactory;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    unknown_sensors: UnknownSensorPolicy,
    feeds: Vec<FeedInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replay: Option<ReplayInfo>,
}

#[derive(Serialize)]
struct FeedInfo {
    name: String,
    sensor_type: String,
    frequency_hz: f64,
    /// `None` when the tag is dropped as unsupported
    category: Option<SensorType>,
    capabilities: Vec<SensorCapability>,
}

#[derive(Serialize)]
struct ReplayInfo {
    path: String,
    speed_multiplier: f64,
    loop_playback: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&config);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(config: &SensorMasterConfig) -> ConfigInfo {
    let factory = SensorFactory::from_config(&config.registry);

    let feeds = config
        .feeds
        .iter()
        .map(|feed| {
            let category = factory.resolve(&feed.sensor_type);
            FeedInfo {
                name: feed.name.clone(),
                sensor_type: feed.sensor_type.clone(),
                frequency_hz: feed.frequency_hz,
                category,
                capabilities: category
                    .map(|c| c.capabilities().to_vec())
                    .unwrap_or_default(),
            }
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", config.version),
        unknown_sensors: config.registry.unknown_sensors,
        feeds,
        replay: config.replay.as_ref().map(|r| ReplayInfo {
            path: r.path.display().to_string(),
            speed_multiplier: r.speed_multiplier,
            loop_playback: r.loop_playback,
        }),
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Sensor Master Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📍 Registry");
    println!("   ├─ Version: {}", info.version);
    println!("   └─ Unknown sensors: {:?}", info.unknown_sensors);

    println!("\n📡 Feeds ({})", info.feeds.len());
    for (i, feed) in info.feeds.iter().enumerate() {
        let prefix = if i == info.feeds.len() - 1 { "└─" } else { "├─" };
        let category = match feed.category {
            Some(category) => format!("{category} {:?}", feed.capabilities),
            None => "unsupported".to_string(),
        };
        println!(
            "   {} {}/{} ({} Hz) -> {}",
            prefix, feed.sensor_type, feed.name, feed.frequency_hz, category
        );
    }

    if let Some(replay) = &info.replay {
        println!("\n⏯  Replay");
        println!("   ├─ Path: {}", replay.path);
        println!("   ├─ Speed: {}x", replay.speed_multiplier);
        println!("   └─ Loop: {}", replay.loop_playback);
    }

    println!();
}
