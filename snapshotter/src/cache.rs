//! Resumable local cache of collected record batches
//!
//! A full collection can take hours; if the process dies before publishing, the
//! next run for the same block reuses the batch instead of fetching again.
//!
//! Artifacts live at `{dir}/{block_hash}.snapshot.json`:
//!
//! ```text
//! { "version": 1, "block_hash": "...", "record_count": N,
//!   "checksum": "<sha256 hex of records JSON>", "records": [...] }
//! ```
//!
//! The checksum covers the `records` bytes exactly as stored. Anything that does
//! not validate is a miss, never an error.

use glob::glob;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::constants::cache::{FILE_SUFFIX, FORMAT_VERSION};
use crate::record::AccountRecord;

#[derive(Serialize, Deserialize)]
struct CacheEnvelope {
    version: u32,
    block_hash: String,
    record_count: usize,
    checksum: String,
    records: Box<RawValue>,
}

#[derive(Debug, Clone)]
pub struct SnapshotCache {
    dir: PathBuf,
}

impl SnapshotCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, block_hash: &str) -> PathBuf {
        let safe: String = block_hash
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{}{}", safe, FILE_SUFFIX))
    }

    /// Previously saved batch for `block_hash`, if present and intact
    pub async fn load(&self, block_hash: &str) -> Option<Vec<AccountRecord>> {
        let path = self.path_for(block_hash);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("No cached batch at {}: {}", path.display(), e);
                return None;
            }
        };

        let envelope: CacheEnvelope = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Ignoring unreadable cache file {}: {}", path.display(), e);
                return None;
            }
        };

        let records = match verify(&envelope, block_hash) {
            Ok(records) => records,
            Err(reason) => {
                warn!("Ignoring cache file {}: {}", path.display(), reason);
                return None;
            }
        };

        info!(
            "Loaded {} cached records for block {}",
            records.len(),
            block_hash
        );
        Some(records)
    }

    /// Best-effort persist; returns whether the artifact was written
    pub async fn save(&self, block_hash: &str, records: &[AccountRecord]) -> bool {
        match self.try_save(block_hash, records).await {
            Ok(path) => {
                info!("Cached {} records at {}", records.len(), path.display());
                true
            }
            Err(e) => {
                warn!("Failed to cache batch for block {}: {}", block_hash, e);
                false
            }
        }
    }

    async fn try_save(&self, block_hash: &str, records: &[AccountRecord]) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.dir).await?;

        let records_json = serde_json::to_string(records)?;
        let envelope = CacheEnvelope {
            version: FORMAT_VERSION,
            block_hash: block_hash.to_string(),
            record_count: records.len(),
            checksum: checksum(&records_json),
            records: RawValue::from_string(records_json)?,
        };
        let bytes = serde_json::to_vec(&envelope)?;

        let path = self.path_for(block_hash);
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, &bytes).await?;
        fs::rename(&tmp_path, &path).await?;
        Ok(path)
    }

    /// Remove every cache artifact; returns how many were deleted
    pub async fn prune(&self) -> usize {
        let pattern = format!("{}/*{}", self.dir.display(), FILE_SUFFIX);
        let entries = match glob(&pattern) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Invalid cache glob {}: {}", pattern, e);
                return 0;
            }
        };

        let mut removed = 0;
        for path in entries.flatten() {
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove cache file {}: {}", path.display(), e),
            }
        }

        if removed > 0 {
            info!("Removed {} cache files from {}", removed, self.dir.display());
        }
        removed
    }
}

fn checksum(records_json: &str) -> String {
    hex::encode(Sha256::digest(records_json.as_bytes()))
}

/// Records of a structurally valid envelope for `block_hash`
fn verify(envelope: &CacheEnvelope, block_hash: &str) -> Result<Vec<AccountRecord>, String> {
    if envelope.version != FORMAT_VERSION {
        return Err(format!(
            "format version {} (expected {})",
            envelope.version, FORMAT_VERSION
        ));
    }
    if envelope.block_hash != block_hash {
        return Err(format!("written for block {}", envelope.block_hash));
    }
    if checksum(envelope.records.get()) != envelope.checksum {
        return Err("checksum mismatch".to_string());
    }

    let records: Vec<AccountRecord> =
        serde_json::from_str(envelope.records.get()).map_err(|e| e.to_string())?;
    if envelope.record_count != records.len() {
        return Err(format!(
            "record count {} but {} records present",
            envelope.record_count,
            records.len()
        ));
    }
    Ok(records)
}
