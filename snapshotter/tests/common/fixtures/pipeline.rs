//! Fully wired pipeline over fakes, rooted in a temporary directory

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use snapshotter::cache::SnapshotCache;
use snapshotter::collector::{CollectorSettings, SnapshotCollector};
use snapshotter::config::AccountSource;
use snapshotter::publisher::SnapshotPublisher;
use snapshotter::runner::DailyRunner;

use super::fakes::{FakeChain, FakeVcs, FlakyStore, RecordingNotifier};
use super::test_database::test_database;

pub struct TestPipeline {
    pub dir: TempDir,
    pub chain: Arc<FakeChain>,
    pub store: Arc<FlakyStore>,
    pub vcs: Arc<FakeVcs>,
    pub notifier: Arc<RecordingNotifier>,
    pub settings: CollectorSettings,
}

impl TestPipeline {
    pub async fn new(chain: FakeChain) -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
            chain: Arc::new(chain),
            store: Arc::new(FlakyStore::new(test_database().await)),
            vcs: Arc::new(FakeVcs::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            settings: CollectorSettings {
                account_source: AccountSource::Rpc,
                genesis_accounts: Vec::new(),
                concurrency: 4,
                progress_interval: 2,
            },
        }
    }

    pub fn with_settings(mut self, settings: CollectorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.dir.path().join("archive")
    }

    pub fn archive_file(&self) -> PathBuf {
        self.archive_dir().join("accounts.csv")
    }

    pub fn cache(&self) -> SnapshotCache {
        SnapshotCache::new(self.dir.path().join("cache"))
    }

    pub fn collector(&self) -> SnapshotCollector {
        SnapshotCollector::new(
            self.chain.clone(),
            self.store.clone(),
            self.cache(),
            self.settings.clone(),
        )
    }

    pub fn publisher(&self) -> SnapshotPublisher {
        SnapshotPublisher::new(
            self.store.clone(),
            self.vcs.clone(),
            self.notifier.clone(),
            &self.archive_dir(),
            "accounts.csv",
        )
    }

    pub fn runner(&self) -> DailyRunner {
        DailyRunner::new(
            self.store.clone(),
            self.collector(),
            self.publisher(),
            self.notifier.clone(),
        )
    }
}
