use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::AccountRecord;

/// The finalized block chosen to represent one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotId {
    pub date: NaiveDate,
    pub block_hash: String,
    pub block_height: u64,
}

impl SnapshotId {
    /// `YYYY-MM-DD`; used as marker value and commit message
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (block {} at height {})",
            self.date_string(),
            self.block_hash,
            self.block_height
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotStage {
    Pending,
    Collecting,
    Collected,
    Published,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch {
    pub records: Vec<AccountRecord>,
    pub origin: BatchOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOrigin {
    /// Fetched from the node in this run
    Fetched { enumerated: usize, dropped: usize },
    /// Loaded from a cache artifact written by an earlier, unpublished run
    Cache,
}

impl RecordBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
