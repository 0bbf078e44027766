//! Publishes a collected batch to the archive, the document store and git
//!
//! Order matters: the marker is the last write, so a run that fails anywhere
//! earlier is retried from scratch on the next tick (cheaply, through the cache).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{error, info};

use crate::constants::store::{ACCOUNT_FIELD, LAST_COMPLETED_MARKER, NIGHTLY_ACCOUNTS};
use crate::database::{Document, DocumentFilter, DocumentStore};
use crate::errors::PublishError;
use crate::record::{AccountRecord, ARCHIVE_COLUMNS};
use crate::services::{notify_best_effort, NotificationChannel, NotificationSink, Severity};
use crate::snapshot::{RecordBatch, SnapshotId};
use crate::vcs::{CommitOutcome, VersionControl};

#[derive(Debug, Clone, PartialEq)]
pub enum PublishResult {
    Published {
        records: usize,
        replaced_documents: u64,
        commit: CommitOutcome,
    },
    /// The marker already names this date; nothing was written
    AlreadyPublished,
}

pub struct SnapshotPublisher {
    store: Arc<dyn DocumentStore>,
    vcs: Arc<dyn VersionControl>,
    notifier: Arc<dyn NotificationSink>,
    archive_path: PathBuf,
}

impl SnapshotPublisher {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        vcs: Arc<dyn VersionControl>,
        notifier: Arc<dyn NotificationSink>,
        archive_dir: &Path,
        archive_filename: &str,
    ) -> Self {
        Self {
            store,
            vcs,
            notifier,
            archive_path: archive_dir.join(archive_filename),
        }
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Date of the last fully published snapshot
    pub async fn last_completed_date(&self) -> Result<Option<String>, PublishError> {
        self.store
            .get_marker(LAST_COMPLETED_MARKER)
            .await
            .map_err(PublishError::Marker)
    }

    pub async fn publish(
        &self,
        snapshot: &SnapshotId,
        batch: &RecordBatch,
    ) -> Result<PublishResult, PublishError> {
        let date = snapshot.date_string();

        if self.last_completed_date().await?.as_deref() == Some(date.as_str()) {
            info!("Snapshot {} already published, skipping", date);
            return Ok(PublishResult::AlreadyPublished);
        }

        info!("Step 1: Writing {} records to {}", batch.len(), self.archive_path.display());
        write_archive(&self.archive_path, &batch.records).await?;

        info!("Step 2: Replacing account documents in {}", NIGHTLY_ACCOUNTS);
        let replaced_documents = self.replace_documents(&batch.records).await?;

        info!("Step 3: Committing and pushing archive for {}", date);
        self.vcs.stage_all().await?;
        let commit = self.vcs.commit(&date).await?;
        self.vcs.push().await?;

        info!("Step 4: Advancing marker to {}", date);
        self.store
            .set_marker(LAST_COMPLETED_MARKER, &date)
            .await
            .map_err(PublishError::Marker)?;

        notify_best_effort(
            self.notifier.as_ref(),
            NotificationChannel::Notifier,
            &format!(
                "Accounts Retrieval: Nightly accounts ({}) saved for {}.",
                batch.len(),
                date
            ),
            Severity::Info,
        )
        .await;

        Ok(PublishResult::Published {
            records: batch.len(),
            replaced_documents,
            commit,
        })
    }

    /// Delete-then-insert of the whole account collection; returns documents removed
    async fn replace_documents(&self, records: &[AccountRecord]) -> Result<u64, PublishError> {
        let documents = records
            .iter()
            .map(|record| {
                Ok(Document {
                    id: record.account.clone(),
                    body: record.to_document()?,
                })
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()
            .map_err(PublishError::DocumentEncode)?;

        let filter = DocumentFilter::field_exists(NIGHTLY_ACCOUNTS, ACCOUNT_FIELD);
        let deleted = self
            .store
            .bulk_delete(&filter)
            .await
            .map_err(PublishError::DocumentDelete)?;

        match self.store.bulk_insert(NIGHTLY_ACCOUNTS, &documents).await {
            Ok(inserted) => {
                info!("Replaced {} account documents with {}", deleted, inserted);
                Ok(deleted)
            }
            Err(source) => {
                error!(
                    "Deleted {} account documents but insert failed; collection is now empty: {}",
                    deleted, source
                );
                Err(PublishError::InsertAfterDelete { deleted, source })
            }
        }
    }
}

/// Render `records` as CSV with a fixed header, even for an empty batch
pub fn render_archive(records: &[AccountRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(ARCHIVE_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

async fn write_archive(path: &Path, records: &[AccountRecord]) -> Result<(), PublishError> {
    let archive_error = |reason: String| PublishError::Archive {
        path: path.display().to_string(),
        reason,
    };

    let bytes = render_archive(records).map_err(|e| archive_error(e.to_string()))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| archive_error(e.to_string()))?;
    }

    let tmp_path = path.with_extension("csv.tmp");
    fs::write(&tmp_path, &bytes)
        .await
        .map_err(|e| archive_error(e.to_string()))?;
    fs::rename(&tmp_path, path)
        .await
        .map_err(|e| archive_error(e.to_string()))?;

    Ok(())
}
