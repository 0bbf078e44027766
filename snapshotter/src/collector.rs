//! Builds the record batch for one snapshot
//!
//! ```text
//! enumerate accounts ──► cache hit? ──yes──► cached records
//!                            │
//!                            no
//!                            ▼
//!        fetch + classify + transform (bounded concurrency)
//!                            │
//!                            ▼
//!                     save to cache ──► records
//! ```
//!
//! Accounts are independent, so lookups run concurrently and results are kept in
//! completion order. A failing account is logged and dropped; only a failure to
//! enumerate the account set aborts collection.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::SnapshotCache;
use crate::chain::ChainClient;
use crate::config::{AccountSource, Config};
use crate::database::DocumentStore;
use crate::errors::CollectError;
use crate::record::AccountRecord;
use crate::snapshot::{BatchOrigin, RecordBatch};

#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub account_source: AccountSource,
    pub genesis_accounts: Vec<String>,
    pub concurrency: usize,
    pub progress_interval: usize,
}

impl CollectorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            account_source: config.account_source,
            genesis_accounts: config.genesis_accounts.clone(),
            concurrency: config.fetch_concurrency.max(1),
            progress_interval: config.progress_interval.max(1),
        }
    }
}

pub struct SnapshotCollector {
    chain: Arc<dyn ChainClient>,
    store: Arc<dyn DocumentStore>,
    cache: SnapshotCache,
    settings: CollectorSettings,
}

impl SnapshotCollector {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        store: Arc<dyn DocumentStore>,
        cache: SnapshotCache,
        settings: CollectorSettings,
    ) -> Self {
        Self {
            chain,
            store,
            cache,
            settings,
        }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Every account valid as of the target block, without duplicates
    pub async fn enumerate_accounts(
        &self,
        block_hash: &str,
        block_height: u64,
    ) -> Result<Vec<String>, CollectError> {
        let accounts = match self.settings.account_source {
            AccountSource::Rpc => self
                .chain
                .list_accounts_asof(block_hash)
                .await
                .map_err(|e| CollectError::Enumeration {
                    block_hash: block_hash.to_string(),
                    reason: e.to_string(),
                })?,
            AccountSource::Ledger => {
                let mut accounts = self.settings.genesis_accounts.clone();
                let created = self
                    .store
                    .accounts_created_up_to(block_height)
                    .await
                    .map_err(|e| CollectError::Enumeration {
                        block_hash: block_hash.to_string(),
                        reason: e.to_string(),
                    })?;
                accounts.extend(created);
                accounts
            }
        };

        let mut seen = HashSet::with_capacity(accounts.len());
        let unique: Vec<String> = accounts
            .into_iter()
            .filter(|account| seen.insert(account.clone()))
            .collect();

        info!(
            "Enumerated {} accounts at height {} ({:?} source)",
            unique.len(),
            block_height,
            self.settings.account_source
        );
        Ok(unique)
    }

    pub async fn collect(
        &self,
        block_hash: &str,
        block_height: u64,
    ) -> Result<RecordBatch, CollectError> {
        let accounts = self.enumerate_accounts(block_hash, block_height).await?;

        if let Some(records) = self.cache.load(block_hash).await {
            info!(
                "Reusing cached batch of {} records for block {}",
                records.len(),
                block_hash
            );
            return Ok(RecordBatch {
                records,
                origin: BatchOrigin::Cache,
            });
        }

        let (records, dropped) = self.fetch_all(block_hash, &accounts).await;
        self.cache.save(block_hash, &records).await;

        Ok(RecordBatch {
            records,
            origin: BatchOrigin::Fetched {
                enumerated: accounts.len(),
                dropped,
            },
        })
    }

    async fn fetch_all(&self, block_hash: &str, accounts: &[String]) -> (Vec<AccountRecord>, usize) {
        let total = accounts.len();
        info!(
            "Start of loop through all {} accounts at {} (concurrency {})",
            total, block_hash, self.settings.concurrency
        );

        let chain = &self.chain;
        let mut results = stream::iter(accounts)
            .map(|account_id| async move {
                let result = chain.get_account_state(block_hash, account_id).await;
                (account_id, result)
            })
            .buffer_unordered(self.settings.concurrency)
            .boxed();

        let mut records = Vec::with_capacity(total);
        let mut dropped = 0usize;
        let mut completed = 0usize;

        while let Some((account_id, result)) = results.next().await {
            match result {
                Ok(state) => records.push(AccountRecord::from(&state)),
                Err(e) => {
                    warn!("Dropping account {} from batch: {}", account_id, e);
                    dropped += 1;
                }
            }

            completed += 1;
            if completed % self.settings.progress_interval == 0 {
                info!("Processed {}/{} accounts...", completed, total);
            }
        }

        info!(
            "Collected {} records at {} ({} dropped)",
            records.len(),
            block_hash,
            dropped
        );
        (records, dropped)
    }
}
