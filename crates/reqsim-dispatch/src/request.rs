//! Request model for the replay simulation.
//!
//! Each [`RequestRecord`] is one line of a request log: when it arrived, what
//! it asked for, and how many time units a server needs to process it.

use serde::{Deserialize, Serialize};

/// A single request flowing through the simulated system.
///
/// Records are immutable once built; the simulation only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    id: u64,
    timestamp: i64,
    target: String,
    processing_time: u32,
}

impl RequestRecord {
    /// Build a record. `id` is the record's position in the input sequence.
    pub fn new(id: u64, timestamp: i64, target: impl Into<String>, processing_time: u32) -> Self {
        Self {
            id,
            timestamp,
            target: target.into(),
            processing_time,
        }
    }

    /// Zero-based position in the input sequence.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Arrival timestamp. Ordering key only; it never delays scheduling.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Requested resource identifier.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Time units a server needs to process this request.
    pub fn processing_time(&self) -> u32 {
        self.processing_time
    }
}
