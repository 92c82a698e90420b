//! WorldView trait - sensor event source abstraction
//!
//! Decouples the listener from the transport that produces sensor messages.
//! The in-process bus, mock feeds and replay feeds all go through this
//! interface, as would a real simulator connection.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{ContractError, SensorMessage};

/// Sensor message callback type
///
/// Invoked once per delivered message, on whatever thread the world view
/// delivers from.
pub type SensorMessageCallback = Arc<dyn Fn(&SensorMessage) + Send + Sync>;

/// Handle returned by [`WorldView::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Event source delivering sensor messages.
///
/// # Contract
///
/// 1. Messages are delivered one at a time, in the order the source
///    received them.
/// 2. `unsubscribe` of an unknown id returns `Ok(false)`.
/// 3. Once the source is released, both calls return
///    [`ContractError::WorldViewClosed`].
pub trait WorldView: Send + Sync {
    /// Register a callback on the sensor message stream.
    fn subscribe(&self, callback: SensorMessageCallback) -> Result<SubscriptionId, ContractError>;

    /// Remove a callback. Returns whether it was still registered.
    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, ContractError>;
}

/// What filing one message did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    /// New `(type, name)` pair stored
    Created,
    /// Existing sensor overwritten in place
    Updated,
    /// Factory does not know the type tag; message dropped
    Unsupported,
    /// Empty keys or undecodable payload; message dropped
    Malformed,
}

impl FileOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unsupported => "unsupported",
            Self::Malformed => "malformed",
        }
    }

    /// Whether the message ended up in the registry.
    pub fn is_filed(self) -> bool {
        matches!(self, Self::Created | Self::Updated)
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forwarding target of the listener.
pub trait SensorMessageSink: Send + Sync {
    /// File one message. Never fails; the outcome is informational.
    fn file_message(&self, message: &SensorMessage) -> FileOutcome;
}
