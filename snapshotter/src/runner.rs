//! Daily run orchestration
//!
//! ```text
//! Idle ──► TargetIdentified ──► Running(Collecting ─► Collected ─► Published) ──► Completed
//!   ▲            │                         │
//!   └── not due ─┘                         └── any error: marker untouched, back to Idle
//! ```
//!
//! A run is due when the most recent finalized day summary names a date other
//! than the last-completed marker. Retrying is left to the polling loop.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::collector::SnapshotCollector;
use crate::database::DocumentStore;
use crate::errors::RunError;
use crate::publisher::{PublishResult, SnapshotPublisher};
use crate::services::{notify_best_effort, NotificationChannel, NotificationSink, Severity};
use crate::snapshot::{SnapshotId, SnapshotStage};

#[derive(Debug, Clone, PartialEq)]
pub enum RunnerState {
    Idle,
    TargetIdentified(SnapshotId),
    Running {
        snapshot: SnapshotId,
        stage: SnapshotStage,
    },
    Completed(SnapshotId),
}

impl RunnerState {
    /// Lifecycle stage of the snapshot this state refers to, if any
    pub fn stage(&self) -> Option<SnapshotStage> {
        match self {
            RunnerState::Idle => None,
            RunnerState::TargetIdentified(_) => Some(SnapshotStage::Pending),
            RunnerState::Running { stage, .. } => Some(*stage),
            RunnerState::Completed(_) => Some(SnapshotStage::Published),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    NothingDue,
    Ran {
        snapshot: SnapshotId,
        result: PublishResult,
    },
}

pub struct DailyRunner {
    store: Arc<dyn DocumentStore>,
    collector: SnapshotCollector,
    publisher: SnapshotPublisher,
    notifier: Arc<dyn NotificationSink>,
    state: Mutex<RunnerState>,
}

impl DailyRunner {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        collector: SnapshotCollector,
        publisher: SnapshotPublisher,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            collector,
            publisher,
            notifier,
            state: Mutex::new(RunnerState::Idle),
        }
    }

    pub async fn state(&self) -> RunnerState {
        self.state.lock().await.clone()
    }

    async fn set_state(&self, state: RunnerState) {
        *self.state.lock().await = state;
    }

    /// The snapshot that should be published next, if any
    pub async fn next_due(&self) -> Result<Option<SnapshotId>, RunError> {
        let Some(summary) = self
            .store
            .latest_day_summary()
            .await
            .map_err(RunError::DaySummary)?
        else {
            return Ok(None);
        };

        let candidate = SnapshotId {
            date: summary.date,
            block_hash: summary.hash_for_last_block,
            block_height: summary.height_for_last_block,
        };

        let last_completed = self.publisher.last_completed_date().await?;
        if last_completed.as_deref() == Some(candidate.date_string().as_str()) {
            return Ok(None);
        }

        Ok(Some(candidate))
    }

    /// One pass of the state machine: decide, and if due, collect and publish
    pub async fn tick(&self) -> Result<TickOutcome, RunError> {
        self.set_state(RunnerState::Idle).await;

        let snapshot = match self.next_due().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return Ok(TickOutcome::NothingDue),
            Err(e) => return Err(e),
        };

        self.set_state(RunnerState::TargetIdentified(snapshot.clone()))
            .await;

        match self.run(&snapshot).await {
            Ok(result) => {
                self.set_state(RunnerState::Completed(snapshot.clone())).await;
                Ok(TickOutcome::Ran { snapshot, result })
            }
            Err(e) => {
                self.set_state(RunnerState::Idle).await;
                Err(e)
            }
        }
    }

    async fn run(&self, snapshot: &SnapshotId) -> Result<PublishResult, RunError> {
        let run_id = Uuid::new_v4();
        info!("Run {}: starting snapshot {}", run_id, snapshot);

        self.set_stage(snapshot, SnapshotStage::Collecting).await;
        let batch = self
            .collector
            .collect(&snapshot.block_hash, snapshot.block_height)
            .await?;
        info!(
            "Run {}: collected {} records ({:?})",
            run_id,
            batch.len(),
            batch.origin
        );

        self.set_stage(snapshot, SnapshotStage::Collected).await;
        let result = self.publisher.publish(snapshot, &batch).await?;

        self.set_stage(snapshot, SnapshotStage::Published).await;
        self.collector.cache().prune().await;

        info!("Run {}: snapshot {} finished: {:?}", run_id, snapshot.date_string(), result);
        Ok(result)
    }

    async fn set_stage(&self, snapshot: &SnapshotId, stage: SnapshotStage) {
        self.set_state(RunnerState::Running {
            snapshot: snapshot.clone(),
            stage,
        })
        .await;
    }

    /// Poll forever; a failed run is logged, reported and retried on the next tick
    pub async fn run_forever(&self, poll_interval: Duration) {
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            match self.tick().await {
                Ok(TickOutcome::NothingDue) => info!("Nothing to do..."),
                Ok(TickOutcome::Ran { snapshot, result }) => {
                    info!("Snapshot {} done: {:?}", snapshot.date_string(), result)
                }
                Err(e) => {
                    error!("Snapshot run failed, will retry next tick: {}", e);
                    notify_best_effort(
                        self.notifier.as_ref(),
                        NotificationChannel::Errors,
                        &format!("Accounts Retrieval: run failed: {}", e),
                        Severity::Error,
                    )
                    .await;
                }
            }
        }
    }
}
