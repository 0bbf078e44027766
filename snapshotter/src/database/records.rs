//! Database record types (entities).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One stored document; `id` mirrors the body's `_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

/// Selects documents of `collection` whose body has a non-null `field`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFilter {
    pub collection: String,
    pub field_exists: String,
}

impl DocumentFilter {
    pub fn field_exists(collection: &str, field: &str) -> Self {
        Self {
            collection: collection.to_string(),
            field_exists: field.to_string(),
        }
    }
}

/// Last finalized block of one day, written upstream by the block indexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub hash_for_last_block: String,
    pub height_for_last_block: u64,
}

/// Stored form of the last-completed marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub date: String,
}
