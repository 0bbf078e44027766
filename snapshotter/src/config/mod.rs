pub mod manager;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
pub use manager::ConfigManager;

use crate::constants::defaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rpc_url: String,
    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_seconds: u64,
    pub database_path: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
    #[serde(default)]
    pub notification_webhook_url: String,
    #[serde(default)]
    pub account_source: AccountSource,
    // Accounts that predate creation-event tracking; only used by the ledger source
    #[serde(default)]
    pub genesis_accounts: Vec<String>,
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    // Populated from the environment, never from main.toml
    #[serde(skip)]
    pub run_mode: RunMode,
    #[serde(skip)]
    pub vcs_token: Option<String>,
}

fn default_rpc_timeout() -> u64 {
    defaults::RPC_TIMEOUT_SECONDS
}

fn default_poll_interval() -> u64 {
    defaults::POLL_INTERVAL_SECONDS
}

fn default_fetch_concurrency() -> usize {
    defaults::FETCH_CONCURRENCY
}

fn default_progress_interval() -> usize {
    defaults::PROGRESS_INTERVAL
}

/// Where the account set of a snapshot comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountSource {
    /// Ask the node for every account that exists at the target block
    #[default]
    Rpc,
    /// Accounts with a creation event up to the target height, plus `genesis_accounts`
    Ledger,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    #[default]
    Local,
    Server,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub local_dir: String,
    pub server_dir: String,
    #[serde(default = "default_remote")]
    pub remote: String,
    /// Push URL without credentials, e.g. `https://github.com/org/accounts`
    pub remote_url: Option<String>,
    #[serde(default = "default_archive_filename")]
    pub filename: String,
}

fn default_remote() -> String {
    defaults::ARCHIVE_REMOTE.to_string()
}

fn default_archive_filename() -> String {
    defaults::ARCHIVE_FILENAME.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> String {
    defaults::CACHE_DIR.to_string()
}

impl Config {
    /// Working directory of the archive repository for the active run mode
    pub fn archive_dir(&self) -> PathBuf {
        match self.run_mode {
            RunMode::Local => PathBuf::from(&self.archive.local_dir),
            RunMode::Server => PathBuf::from(&self.archive.server_dir),
        }
    }

    /// Remote URL with the bot token spliced in after the scheme
    pub fn authenticated_remote_url(&self) -> Option<String> {
        let url = self.archive.remote_url.as_ref()?;
        match (&self.vcs_token, url.split_once("://")) {
            (Some(token), Some((scheme, rest))) if !token.is_empty() => {
                Some(format!("{}://{}@{}", scheme, token, rest))
            }
            _ => Some(url.clone()),
        }
    }
}
