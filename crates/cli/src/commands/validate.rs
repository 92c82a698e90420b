//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{SensorMasterConfig, UnknownSensorPolicy};
use sensor_factory::SensorFactory;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    unknown_sensors: UnknownSensorPolicy,
    feed_count: usize,
    replay: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    unknown_sensors: config.registry.unknown_sensors,
                    feed_count: config.feeds.len(),
                    replay: config.replay.is_some(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &SensorMasterConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let factory = SensorFactory::from_config(&config.registry);

    if config.feeds.is_empty() && config.replay.is_none() {
        warnings.push("No feeds and no replay configured - the registry will stay empty".to_string());
    }

    for feed in &config.feeds {
        if factory.resolve(&feed.sensor_type).is_none() {
            warnings.push(format!(
                "Feed '{}' uses unsupported sensor type '{}' - its messages will be dropped",
                feed.name, feed.sensor_type
            ));
        }
    }

    if let Some(replay) = &config.replay {
        if !replay.path.exists() {
            warnings.push(format!(
                "Replay file '{}' does not exist yet",
                replay.path.display()
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Unknown sensors: {:?}", summary.unknown_sensors);
            println!("  Feeds: {}", summary.feed_count);
            println!("  Replay: {}", if summary.replay { "yes" } else { "no" });
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
