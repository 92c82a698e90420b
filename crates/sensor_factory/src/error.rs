//! Sensor Factory error types

use thiserror::Error;

/// Sensor Factory specific error
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Type tag outside the known table
    #[error("sensor type '{type_tag}' is not supported")]
    Unsupported { type_tag: String },

    /// Message fields do not decode into the sensor's reading type
    #[error("failed to decode message for sensor '{type_tag}/{name}': {source}")]
    Decode {
        type_tag: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Message routed to a sensor it does not belong to
    #[error("message for '{message}' filed on sensor '{sensor}'")]
    KeyMismatch { sensor: String, message: String },
}

impl FactoryError {
    /// Create unsupported sensor error
    pub fn unsupported(type_tag: impl Into<String>) -> Self {
        Self::Unsupported {
            type_tag: type_tag.into(),
        }
    }

    /// Whether this is the "unknown type tag" case.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, FactoryError>;
