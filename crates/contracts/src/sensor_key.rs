//! SensorKey - Case-normalized, cheap-to-clone registry key
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Registry key for a sensor type tag or a sensor instance name.
///
/// The transport layer is not consistent about casing, so every key is
/// lower-cased on construction. Two keys are equal iff their normalized
/// forms are equal, which means `"Camera"` and `"camera"` address the same
/// bucket.
///
/// Cloning only increments a reference count.
///
/// # Examples
/// ```
/// use contracts::SensorKey;
///
/// let key = SensorKey::normalize("Front_Sonar");
/// assert_eq!(key, "front_sonar");
/// assert_eq!(key, SensorKey::normalize("FRONT_SONAR"));
/// ```
#[derive(Clone, Default)]
pub struct SensorKey(Arc<str>);

impl SensorKey {
    /// Build a key from raw transport text, lower-casing it.
    #[inline]
    pub fn normalize(s: &str) -> Self {
        if needs_lowering(s) {
            Self(Arc::from(s.to_lowercase()))
        } else {
            Self(Arc::from(s))
        }
    }

    /// Get the normalized string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Only all-ASCII text without capitals is known to survive `to_lowercase`
// unchanged; titlecase and other non-ASCII letters take the slow path.
#[inline]
fn needs_lowering(s: &str) -> bool {
    !s.bytes().all(|b| b.is_ascii() && !b.is_ascii_uppercase())
}

impl Deref for SensorKey {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for SensorKey {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets HashMap<SensorKey, _> be queried with an already-normalized &str.
impl Borrow<str> for SensorKey {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SensorKey {
    #[inline]
    fn from(s: &str) -> Self {
        Self::normalize(s)
    }
}

impl From<String> for SensorKey {
    #[inline]
    fn from(s: String) -> Self {
        if needs_lowering(&s) {
            Self(Arc::from(s.to_lowercase()))
        } else {
            Self(Arc::from(s))
        }
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SensorKey({:?})", self.0)
    }
}

impl PartialEq for SensorKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for SensorKey {}

impl PartialEq<str> for SensorKey {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for SensorKey {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl PartialOrd for SensorKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SensorKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

// Same as str hash so `Borrow<str>` lookups agree
impl Hash for SensorKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Serialize for SensorKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SensorKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

/// A `(type, name)` pair identifying one filed sensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageDescriptor {
    /// Normalized type tag
    pub sensor_type: SensorKey,

    /// Normalized instance name
    pub name: SensorKey,
}

impl MessageDescriptor {
    pub fn new(sensor_type: impl Into<SensorKey>, name: impl Into<SensorKey>) -> Self {
        Self {
            sensor_type: sensor_type.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.sensor_type, self.name)
    }
}
