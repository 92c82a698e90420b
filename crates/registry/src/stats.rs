//! Filing statistics

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::FileOutcome;
use serde::Serialize;

/// Per-outcome message counters
#[derive(Debug, Default)]
pub struct FilingStats {
    created: AtomicU64,
    updated: AtomicU64,
    unsupported: AtomicU64,
    malformed: AtomicU64,
}

impl FilingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one filed message
    pub fn record(&self, outcome: FileOutcome) {
        let counter = match outcome {
            FileOutcome::Created => &self.created,
            FileOutcome::Updated => &self.updated,
            FileOutcome::Unsupported => &self.unsupported,
            FileOutcome::Malformed => &self.malformed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> FilingStatsSnapshot {
        FilingStatsSnapshot {
            created: self.created.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
            unsupported: self.unsupported.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`FilingStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilingStatsSnapshot {
    /// New sensors stored
    pub created: u64,

    /// In-place overwrites
    pub updated: u64,

    /// Dropped, unknown type tag
    pub unsupported: u64,

    /// Dropped, empty keys or undecodable payload
    pub malformed: u64,
}

impl FilingStatsSnapshot {
    /// Messages seen in total
    pub fn total(&self) -> u64 {
        self.created + self.updated + self.unsupported + self.malformed
    }

    /// Messages that were dropped
    pub fn dropped(&self) -> u64 {
        self.unsupported + self.malformed
    }
}
