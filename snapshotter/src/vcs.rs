//! Version-controlled archive of published snapshots
//!
//! The archive directory is a git working copy; every published snapshot becomes
//! one commit whose message is the snapshot date. `GitArchive` shells out to the
//! `git` binary rather than linking a git library.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::VcsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The index matched HEAD; not an error
    NothingToCommit,
}

#[async_trait]
pub trait VersionControl: Send + Sync {
    async fn stage_all(&self) -> Result<(), VcsError>;

    async fn commit(&self, message: &str) -> Result<CommitOutcome, VcsError>;

    async fn push(&self) -> Result<(), VcsError>;
}

#[derive(Debug, Clone)]
pub struct GitArchive {
    repo_dir: PathBuf,
    remote: String,
}

struct GitOutput {
    success: bool,
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl GitArchive {
    pub fn new(repo_dir: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote: remote.into(),
        }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Make sure the push remote exists and the working copy is up to date.
    /// `remote_url` is only used when the remote has to be created.
    pub async fn prepare(&self, remote_url: Option<&str>) -> Result<(), VcsError> {
        let existing = self.git(&["remote", "get-url", &self.remote]).await?;
        if existing.success {
            debug!("Remote {} exists", self.remote);
        } else if let Some(url) = remote_url {
            info!("Remote {} missing, creating it", self.remote);
            self.git_ok(&["remote", "add", &self.remote, url]).await?;
        } else {
            warn!(
                "Remote {} does not exist and no remote_url is configured; pushes will fail",
                self.remote
            );
            return Ok(());
        }

        self.git_ok(&["pull", &self.remote]).await?;
        info!("Pulled latest archive from {}", self.remote);
        Ok(())
    }

    async fn git(&self, args: &[&str]) -> Result<GitOutput, VcsError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_dir)
            .args(args)
            .output()
            .await
            .map_err(|source| VcsError::Spawn {
                args: redact(args),
                source,
            })?;

        Ok(GitOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    async fn git_ok(&self, args: &[&str]) -> Result<String, VcsError> {
        let output = self.git(args).await?;
        if !output.success {
            return Err(VcsError::CommandFailed {
                args: redact(args),
                stderr: output.stderr,
            });
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl VersionControl for GitArchive {
    async fn stage_all(&self) -> Result<(), VcsError> {
        self.git_ok(&["add", "-A"]).await?;
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<CommitOutcome, VcsError> {
        // exit 0: nothing staged, exit 1: staged changes
        let diff = self.git(&["diff", "--cached", "--quiet"]).await?;
        match diff.code {
            Some(0) => {
                info!("Nothing to commit for {}", message);
                return Ok(CommitOutcome::NothingToCommit);
            }
            Some(1) => {}
            _ => {
                return Err(VcsError::CommandFailed {
                    args: "diff --cached --quiet".to_string(),
                    stderr: diff.stderr,
                })
            }
        }

        self.git_ok(&["commit", "-m", message]).await?;
        info!("Committed archive: {}", message);
        Ok(CommitOutcome::Committed)
    }

    async fn push(&self) -> Result<(), VcsError> {
        self.git_ok(&["push", "--force-with-lease", &self.remote, "HEAD"])
            .await?;
        info!("Pushed archive to {}", self.remote);
        Ok(())
    }
}

/// Render git arguments for logs without credentials embedded in URLs
fn redact(args: &[&str]) -> String {
    args.iter()
        .map(|arg| match arg.split_once("://") {
            Some((scheme, rest)) => match rest.split_once('@') {
                Some((_, host)) => format!("{}://***@{}", scheme, host),
                None => arg.to_string(),
            },
            None => arg.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
