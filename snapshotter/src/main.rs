use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use snapshotter::chain::{ChainClient, HttpChainClient};
use snapshotter::collector::{CollectorSettings, SnapshotCollector};
use snapshotter::config::ConfigManager;
use snapshotter::database::{Database, DocumentStore};
use snapshotter::publisher::SnapshotPublisher;
use snapshotter::runner::DailyRunner;
use snapshotter::services::{NotificationService, NotificationSink};
use snapshotter::vcs::{GitArchive, VersionControl};
use snapshotter::SnapshotCache;

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("snapshotter=info".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("sqlx=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting nightly account snapshotter");

    let config_manager = ConfigManager::new(ConfigManager::config_dir_from_env()).await?;
    let config = config_manager.get_current_config();
    info!("Run mode: {:?}", config.run_mode);

    let store: Arc<dyn DocumentStore> = Arc::new(Database::new(&config.database_path).await?);
    info!("Document store initialized");

    let chain: Arc<dyn ChainClient> = Arc::new(HttpChainClient::new(
        &config.rpc_url,
        config.rpc_timeout_seconds,
    )?);

    let notification_service = NotificationService::new(config.notification_webhook_url.clone())?;
    if notification_service.is_enabled() {
        info!(
            "Notifications enabled with webhook: {}",
            notification_service.get_webhook_url()
        );
    } else {
        warn!("No notification_webhook_url configured, notifications disabled");
    }
    let notifier: Arc<dyn NotificationSink> = Arc::new(notification_service);

    let archive_dir = config.archive_dir();
    let git_archive = GitArchive::new(&archive_dir, config.archive.remote.clone());
    if let Err(e) = git_archive
        .prepare(config.authenticated_remote_url().as_deref())
        .await
    {
        error!("Failed to prepare archive repository {}: {}", archive_dir.display(), e);
        warn!("Continuing; publishing will retry git operations on every run");
    }
    let vcs: Arc<dyn VersionControl> = Arc::new(git_archive);

    let cache = SnapshotCache::new(&config.cache.dir);
    let collector = SnapshotCollector::new(
        chain,
        store.clone(),
        cache,
        CollectorSettings::from_config(&config),
    );
    let publisher = SnapshotPublisher::new(
        store.clone(),
        vcs,
        notifier.clone(),
        &archive_dir,
        &config.archive.filename,
    );

    let runner = DailyRunner::new(store, collector, publisher, notifier);

    info!(
        "Polling for new finalized days every {}s",
        config.poll_interval_seconds
    );
    runner
        .run_forever(Duration::from_secs(config.poll_interval_seconds))
        .await;

    Ok(())
}
