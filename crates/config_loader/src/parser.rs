//! Config parsing
//!
//! TOML is the primary format; JSON is accepted as well.

use contracts::{ContractError, SensorMasterConfig};

/// Config file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer the format from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn parse_toml(content: &str) -> Result<SensorMasterConfig, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse_json(content: &str) -> Result<SensorMasterConfig, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse without validating
pub fn parse(content: &str, format: ConfigFormat) -> Result<SensorMasterConfig, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::UnknownSensorPolicy;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[registry]
unknown_sensors = "retain"

[[feeds]]
name = "front_sonar"
sensor_type = "sonar"
frequency_hz = 20.0

[[feeds]]
name = "gps0"
sensor_type = "gps"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.registry.unknown_sensors, UnknownSensorPolicy::Retain);
        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.feeds[1].frequency_hz, 10.0);
        assert!(config.replay.is_none());
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "feeds": [{ "name": "scan", "sensor_type": "RangeScanner", "frequency_hz": 5.0 }],
            "replay": { "path": "run.jsonl", "loop_playback": true }
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.registry.unknown_sensors, UnknownSensorPolicy::Drop);
        let replay = config.replay.unwrap();
        assert!(replay.loop_playback);
        assert_eq!(replay.speed_multiplier, 1.0);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = parse_toml("[registry]\nunknown_sensors = \"keep\"\n");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
