//! Document store for the snapshot pipeline.
//!
//! This module provides SQLite persistence for:
//! - Account documents of the latest published snapshot (`documents`)
//! - Helper values such as the last-completed marker (`helpers`)
//! - Upstream inputs: per-day finalized block summaries (`blocks_per_day`)
//!   and account creation events (`account_creations`)
//!
//! The module is organized into submodules:
//! - `records` - All record types (entities)
//! - `documents` - Bulk delete/insert of documents
//! - `helpers` - Marker get/set
//! - `ledger` - Day summaries and account creation events

mod documents;
mod helpers;
mod ledger;
mod records;

pub use records::*;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::{error, info};

use crate::errors::StoreError;

/// What the pipeline needs from the document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Delete every document matching `filter`; returns the number deleted
    async fn bulk_delete(&self, filter: &DocumentFilter) -> Result<u64, StoreError>;

    /// Insert all documents into `collection` as one unit; returns the number inserted
    async fn bulk_insert(&self, collection: &str, documents: &[Document]) -> Result<u64, StoreError>;

    async fn get_marker(&self, id: &str) -> Result<Option<String>, StoreError>;

    async fn set_marker(&self, id: &str, value: &str) -> Result<(), StoreError>;

    /// Summary of the most recent finalized day, by block height
    async fn latest_day_summary(&self) -> Result<Option<DaySummary>, StoreError>;

    /// Accounts with a creation event at or below `block_height`
    async fn accounts_created_up_to(&self, block_height: u64) -> Result<Vec<String>, StoreError>;
}

pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Expose pool for integration test queries
    #[allow(dead_code)]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn new(database_path: &str) -> anyhow::Result<Self> {
        info!("Database path: {}", database_path);

        if let Some(parent) = Path::new(database_path).parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                error!("FAILED to create parent directory {:?}: {}", parent, e);
                return Err(e.into());
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path);
        Ok(Self::connect(&database_url).await?)
    }

    /// Connect to `database_url` and create missing tables
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = match SqlitePoolOptions::new()
            // a single writer keeps in-memory databases shared across calls
            .max_connections(if database_url.contains(":memory:") { 1 } else { 4 })
            .connect(database_url)
            .await
        {
            Ok(pool) => pool,
            Err(e) => {
                error!("FAILED to connect to database {}: {}", database_url, e);
                return Err(e.into());
            }
        };

        let database = Self { pool };
        database.initialize_tables().await?;
        info!("Database tables initialized successfully");
        Ok(database)
    }

    async fn initialize_tables(&self) -> Result<(), StoreError> {
        let statements = [
            (
                "documents",
                r#"
                CREATE TABLE IF NOT EXISTS documents (
                    collection TEXT NOT NULL,
                    id TEXT NOT NULL,
                    body TEXT NOT NULL,
                    PRIMARY KEY (collection, id)
                )
                "#,
            ),
            (
                "helpers",
                r#"
                CREATE TABLE IF NOT EXISTS helpers (
                    id TEXT PRIMARY KEY,
                    body TEXT NOT NULL,
                    updated_at DATETIME NOT NULL
                )
                "#,
            ),
            (
                "blocks_per_day",
                r#"
                CREATE TABLE IF NOT EXISTS blocks_per_day (
                    date TEXT PRIMARY KEY,
                    hash_for_last_block TEXT NOT NULL,
                    height_for_last_block INTEGER NOT NULL
                )
                "#,
            ),
            (
                "blocks_per_day height index",
                "CREATE INDEX IF NOT EXISTS idx_blocks_per_day_height ON blocks_per_day(height_for_last_block DESC)",
            ),
            (
                "account_creations",
                r#"
                CREATE TABLE IF NOT EXISTS account_creations (
                    account_id TEXT PRIMARY KEY,
                    block_height INTEGER NOT NULL
                )
                "#,
            ),
        ];

        for (name, sql) in statements {
            if let Err(e) = sqlx::query(sql).execute(&self.pool).await {
                error!("FAILED to create {}: {}", name, e);
                return Err(e.into());
            }
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for Database {
    async fn bulk_delete(&self, filter: &DocumentFilter) -> Result<u64, StoreError> {
        self.delete_documents(filter).await
    }

    async fn bulk_insert(&self, collection: &str, documents: &[Document]) -> Result<u64, StoreError> {
        self.insert_documents(collection, documents).await
    }

    async fn get_marker(&self, id: &str) -> Result<Option<String>, StoreError> {
        self.read_marker(id).await
    }

    async fn set_marker(&self, id: &str, value: &str) -> Result<(), StoreError> {
        self.write_marker(id, value).await
    }

    async fn latest_day_summary(&self) -> Result<Option<DaySummary>, StoreError> {
        self.read_latest_day_summary().await
    }

    async fn accounts_created_up_to(&self, block_height: u64) -> Result<Vec<String>, StoreError> {
        self.read_accounts_created_up_to(block_height).await
    }
}
