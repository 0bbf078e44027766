pub mod cache;
pub mod chain;
pub mod collector;
pub mod config;
pub mod constants;
pub mod database;
pub mod errors;
pub mod publisher;
pub mod record;
pub mod runner;
pub mod services;
pub mod snapshot;
pub mod vcs;

// Re-export commonly used types
pub use cache::SnapshotCache;
pub use chain::{AccountRole, AccountState, ChainClient, HttpChainClient};
pub use collector::{CollectorSettings, SnapshotCollector};
pub use config::{Config, ConfigManager};
pub use database::{Database, DocumentStore};
pub use publisher::{PublishResult, SnapshotPublisher};
pub use record::AccountRecord;
pub use runner::{DailyRunner, RunnerState, TickOutcome};
pub use services::{NotificationService, NotificationSink};
pub use snapshot::{RecordBatch, SnapshotId};
pub use vcs::{GitArchive, VersionControl};
