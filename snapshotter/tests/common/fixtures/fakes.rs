//! In-process fakes for the pipeline collaborators
//!
//! Each fake counts the calls the tests care about and can be told to fail.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use snapshotter::chain::{ChainClient, RawAccountInfo};
use snapshotter::database::{Database, DaySummary, Document, DocumentFilter, DocumentStore};
use snapshotter::errors::{ChainError, StoreError, VcsError};
use snapshotter::services::{NotificationChannel, NotificationSink, Severity};
use snapshotter::vcs::{CommitOutcome, VersionControl};

// ============================================================================
// Chain
// ============================================================================

#[derive(Default)]
pub struct FakeChain {
    accounts: Vec<String>,
    infos: HashMap<String, RawAccountInfo>,
    fail_listing: AtomicBool,
    info_calls: AtomicUsize,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listed account whose lookup returns `info`
    pub fn with_account(mut self, account_id: &str, info: Value) -> Self {
        self.accounts.push(account_id.to_string());
        self.infos.insert(
            account_id.to_string(),
            serde_json::from_value(info).expect("valid raw account info"),
        );
        self
    }

    /// Listed account whose lookup fails with HTTP 404
    pub fn with_unreachable_account(mut self, account_id: &str) -> Self {
        self.accounts.push(account_id.to_string());
        self
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn list_accounts_asof(&self, block_hash: &str) -> Result<Vec<String>, ChainError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(ChainError::Status {
                url: format!("fake://{}/accounts", block_hash),
                status: 503,
            });
        }
        Ok(self.accounts.clone())
    }

    async fn get_account_info(
        &self,
        block_hash: &str,
        account_id: &str,
    ) -> Result<RawAccountInfo, ChainError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.infos
            .get(account_id)
            .cloned()
            .ok_or_else(|| ChainError::Status {
                url: format!("fake://{}/accounts/{}", block_hash, account_id),
                status: 404,
            })
    }
}

// ============================================================================
// Document store
// ============================================================================

/// Real SQLite store with injectable failures and a mutation counter
pub struct FlakyStore {
    inner: Database,
    fail_delete: AtomicBool,
    fail_insert: AtomicBool,
    fail_summary: AtomicBool,
    mutations: AtomicUsize,
}

fn injected(what: &str) -> StoreError {
    StoreError::InvalidValue {
        field: what.to_string(),
        reason: "injected failure".to_string(),
    }
}

impl FlakyStore {
    pub fn new(inner: Database) -> Self {
        Self {
            inner,
            fail_delete: AtomicBool::new(false),
            fail_insert: AtomicBool::new(false),
            fail_summary: AtomicBool::new(false),
            mutations: AtomicUsize::new(0),
        }
    }

    pub fn database(&self) -> &Database {
        &self.inner
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn fail_summary(&self, fail: bool) {
        self.fail_summary.store(fail, Ordering::SeqCst);
    }

    /// Number of delete, insert and marker writes that reached the store
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn bulk_delete(&self, filter: &DocumentFilter) -> Result<u64, StoreError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(injected("bulk_delete"));
        }
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.bulk_delete(filter).await
    }

    async fn bulk_insert(&self, collection: &str, documents: &[Document]) -> Result<u64, StoreError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(injected("bulk_insert"));
        }
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.bulk_insert(collection, documents).await
    }

    async fn get_marker(&self, id: &str) -> Result<Option<String>, StoreError> {
        self.inner.get_marker(id).await
    }

    async fn set_marker(&self, id: &str, value: &str) -> Result<(), StoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.set_marker(id, value).await
    }

    async fn latest_day_summary(&self) -> Result<Option<DaySummary>, StoreError> {
        if self.fail_summary.load(Ordering::SeqCst) {
            return Err(injected("latest_day_summary"));
        }
        self.inner.latest_day_summary().await
    }

    async fn accounts_created_up_to(&self, block_height: u64) -> Result<Vec<String>, StoreError> {
        self.inner.accounts_created_up_to(block_height).await
    }
}

// ============================================================================
// Version control
// ============================================================================

#[derive(Default)]
pub struct FakeVcs {
    commits: Mutex<Vec<String>>,
    stage_calls: AtomicUsize,
    pushes: AtomicUsize,
    fail_push: AtomicBool,
    clean: AtomicBool,
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_push(&self, fail: bool) {
        self.fail_push.store(fail, Ordering::SeqCst);
    }

    /// Report `NothingToCommit` from every commit
    pub fn set_clean(&self, clean: bool) {
        self.clean.store(clean, Ordering::SeqCst);
    }

    /// Messages of commits that actually recorded changes
    pub fn commits(&self) -> Vec<String> {
        self.commits.lock().unwrap().clone()
    }

    pub fn stage_calls(&self) -> usize {
        self.stage_calls.load(Ordering::SeqCst)
    }

    pub fn pushes(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionControl for FakeVcs {
    async fn stage_all(&self) -> Result<(), VcsError> {
        self.stage_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<CommitOutcome, VcsError> {
        if self.clean.load(Ordering::SeqCst) {
            return Ok(CommitOutcome::NothingToCommit);
        }
        self.commits.lock().unwrap().push(message.to_string());
        Ok(CommitOutcome::Committed)
    }

    async fn push(&self) -> Result<(), VcsError> {
        if self.fail_push.load(Ordering::SeqCst) {
            return Err(VcsError::CommandFailed {
                args: "push --force-with-lease origin HEAD".to_string(),
                stderr: "fatal: unable to access remote".to_string(),
            });
        }
        self.pushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(NotificationChannel, String, Severity)>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the message, then report failure to the caller
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(NotificationChannel, String, Severity)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn send(&self, channel: NotificationChannel, message: &str, severity: Severity) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((channel, message.to_string(), severity));
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("notification sink unavailable"));
        }
        Ok(())
    }
}
