//! Central repository for pipeline constants
//!
//! Values that also appear in `config/main.toml` are the defaults used when the
//! field is omitted there.

/// Chain amounts are integers in micro-units; the archive shows display units
pub const MICRO_UNITS_PER_UNIT: f64 = 1_000_000.0;

/// Sentinel stored in `delegation_target` for passive delegation
pub const PASSIVE_DELEGATION: &str = "passiveDelegation";

/// Credential entry whose policy supplies the creation and expiry months
pub const PRIMARY_CREDENTIAL_KEY: &str = "0";

/// Document store layout
pub mod store {
    /// Collection holding one document per account of the latest snapshot
    pub const NIGHTLY_ACCOUNTS: &str = "nightly_accounts";

    /// Field present on every account document, used to select them for deletion
    pub const ACCOUNT_FIELD: &str = "account";

    /// Helper id of the last-completed marker
    pub const LAST_COMPLETED_MARKER: &str = "last_known_nightly_accounts";
}

/// Scheduling and collection defaults
pub mod defaults {
    /// Polling interval of the daily runner (5 minutes)
    pub const POLL_INTERVAL_SECONDS: u64 = 300;

    pub const RPC_TIMEOUT_SECONDS: u64 = 30;

    /// Number of account lookups in flight at once
    pub const FETCH_CONCURRENCY: usize = 32;

    /// Log collection progress every this many accounts
    pub const PROGRESS_INTERVAL: usize = 10_000;

    pub const ARCHIVE_FILENAME: &str = "accounts.csv";

    pub const ARCHIVE_REMOTE: &str = "origin";

    pub const CACHE_DIR: &str = "cache";
}

/// Cache artifact format
pub mod cache {
    /// Bumped whenever `AccountRecord` or the envelope changes shape
    pub const FORMAT_VERSION: u32 = 1;

    pub const FILE_SUFFIX: &str = ".snapshot.json";
}

/// Notification webhook
pub mod notifications {
    use std::time::Duration;

    pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
}
