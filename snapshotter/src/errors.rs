//! Error types for the snapshot pipeline
//!
//! Errors are split by how far they are allowed to propagate:
//! - `AccountError` stays inside the collector; the account is dropped and the run continues
//! - `CollectError`, `PublishError` and `RunError` abort the current run, which the
//!   polling loop retries on its next tick
//! - notification failures never surface as errors at all

use thiserror::Error;

/// Failures talking to the chain RPC endpoint
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Raw account state that cannot be turned into an `AccountState`
#[derive(Debug, Error, PartialEq)]
pub enum ClassifyError {
    #[error("account {account} has neither an initial nor a normal credential")]
    MalformedCredential { account: String },

    #[error("account {account} has an invalid credential month {year}-{month}")]
    InvalidCredentialMonth {
        account: String,
        year: i32,
        month: u32,
    },

    #[error("account {account} has locked balance {locked} above total balance {total}")]
    LockedExceedsTotal {
        account: String,
        total: u64,
        locked: u64,
    },

    #[error("account {account} delegates to neither passive delegation nor a baker")]
    InvalidDelegationTarget { account: String },
}

/// Per-account failure; never fatal to a run
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] ChainError),

    #[error("classification failed: {0}")]
    Classify(#[from] ClassifyError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid stored value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("failed to spawn git {args}: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {args} failed: {stderr}")]
    CommandFailed { args: String, stderr: String },
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to enumerate accounts at block {block_hash}: {reason}")]
    Enumeration { block_hash: String, reason: String },
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to write archive file {path}: {reason}")]
    Archive { path: String, reason: String },

    #[error("failed to encode account documents: {0}")]
    DocumentEncode(#[source] serde_json::Error),

    #[error("failed to delete previous account documents: {0}")]
    DocumentDelete(#[source] StoreError),

    /// The previous documents are already gone at this point; the collection
    /// stays empty until the next successful run.
    #[error("deleted {deleted} account documents but inserting the new batch failed: {source}")]
    InsertAfterDelete {
        deleted: u64,
        #[source]
        source: StoreError,
    },

    #[error("version control step failed: {0}")]
    Vcs(#[from] VcsError),

    #[error("marker store error: {0}")]
    Marker(#[source] StoreError),
}

/// Anything that stops a daily run before the marker advances
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to read day summary: {0}")]
    DaySummary(#[source] StoreError),

    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}
