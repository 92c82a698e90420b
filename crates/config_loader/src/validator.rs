//! Configuration validation
//!
//! Rules:
//! - field rules declared on the config types (`validator` derive)
//! - feed `(sensor_type, name)` pairs unique, case-insensitively
//! - replay path non-empty

use std::collections::HashSet;

use contracts::{ContractError, SensorKey, SensorMasterConfig};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Validate a SensorMasterConfig
///
/// Returns the first error encountered (field rules first, ordered by path).
pub fn validate(config: &SensorMasterConfig) -> Result<(), ContractError> {
    validate_fields(config)?;
    validate_unique_feeds(config)?;
    validate_replay(config)?;
    Ok(())
}

/// Run the derived field rules
fn validate_fields(config: &SensorMasterConfig) -> Result<(), ContractError> {
    let Err(errors) = config.validate() else {
        return Ok(());
    };

    let mut flat = Vec::new();
    flatten(&errors, String::new(), &mut flat);
    flat.sort();

    match flat.into_iter().next() {
        Some((field, message)) => Err(ContractError::config_validation(field, message)),
        None => Err(ContractError::config_validation("<root>", errors.to_string())),
    }
}

fn flatten(errors: &ValidationErrors, prefix: String, out: &mut Vec<(String, String)>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    out.push((path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => flatten(nested, path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flatten(nested, format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

/// Two feeds with the same key would publish into the same sensor
fn validate_unique_feeds(config: &SensorMasterConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, feed) in config.feeds.iter().enumerate() {
        let key = (
            SensorKey::normalize(&feed.sensor_type),
            SensorKey::normalize(&feed.name),
        );
        if !seen.insert(key) {
            return Err(ContractError::config_validation(
                format!("feeds[{idx}]"),
                format!("duplicate feed {}/{}", feed.sensor_type, feed.name),
            ));
        }
    }
    Ok(())
}

fn validate_replay(config: &SensorMasterConfig) -> Result<(), ContractError> {
    if let Some(replay) = &config.replay {
        if replay.path.as_os_str().is_empty() {
            return Err(ContractError::config_validation(
                "replay.path",
                "replay path cannot be empty",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{FeedConfig, ReplayConfig};

    fn feed(sensor_type: &str, name: &str) -> FeedConfig {
        FeedConfig {
            name: name.into(),
            sensor_type: sensor_type.into(),
            frequency_hz: 10.0,
        }
    }

    fn minimal_config() -> SensorMasterConfig {
        SensorMasterConfig {
            feeds: vec![feed("sonar", "front"), feed("gps", "gps0")],
            ..Default::default()
        }
    }

    fn error_of(config: &SensorMasterConfig) -> String {
        validate(config).unwrap_err().to_string()
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&minimal_config()).is_ok());
        assert!(validate(&SensorMasterConfig::default()).is_ok());
    }

    #[test]
    fn test_duplicate_feed_ignores_case() {
        let mut config = minimal_config();
        config.feeds.push(feed("Sonar", "FRONT"));
        let err = error_of(&config);
        assert!(err.contains("duplicate feed"), "got: {err}");
        assert!(err.contains("feeds[2]"), "got: {err}");
    }

    #[test]
    fn test_same_name_different_type_is_fine() {
        let mut config = minimal_config();
        config.feeds.push(feed("ir", "front"));
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_frequency() {
        let mut config = minimal_config();
        config.feeds[1].frequency_hz = -5.0;
        let err = error_of(&config);
        assert!(err.contains("frequency_hz must be in (0, 1000]"), "got: {err}");
        assert!(err.contains("feeds[1].frequency_hz"), "got: {err}");
    }

    #[test]
    fn test_empty_feed_name() {
        let mut config = minimal_config();
        config.feeds[0].name = String::new();
        let err = error_of(&config);
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_replay_rules() {
        let mut config = minimal_config();
        config.replay = Some(ReplayConfig::new(""));
        assert!(error_of(&config).contains("replay path cannot be empty"));

        config.replay = Some(ReplayConfig {
            speed_multiplier: 0.0,
            ..ReplayConfig::new("run.jsonl")
        });
        assert!(error_of(&config).contains("speed_multiplier must be > 0"));
    }
}
