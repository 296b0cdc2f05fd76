// Closed error taxonomy for git sync operations.
//
// Every failure the worker can surface is tagged with a `GitErrorKind`.
// The kind is the error's identity and never changes; the message is
// advisory text that the host-side translator may rewrite before the
// error reaches a user.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a git sync failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GitErrorKind {
    /// A post-condition the sync algorithm assumed did not hold
    /// (e.g. the repo is still dirty or ahead after a full sync pass).
    AssumeSyncViolated,
    /// A required sync parameter (token, remote URL, ...) was absent.
    SyncParameterMissing { parameter: String },
    /// `git push` or `git pull` failed.
    PullPushFailure,
    /// The wiki folder is not a git repository.
    NotInitialized,
    /// The sync state machine looped without converging.
    SyncScriptDeadLoop,
    /// The repo was in a special state (e.g. mid-rebase) and the
    /// automatic fix did not restore it.
    SpecialGitStateAutoFixFailed,
    /// The background worker could not be spawned or reached.
    WorkerUnavailable,
    /// A git subprocess could not be run or exited non-zero outside the
    /// categories above.
    CommandFailed,
}

/// A git sync failure: a closed category plus a display message.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{message}")]
pub struct GitError {
    pub kind: GitErrorKind,
    pub message: String,
}

impl GitError {
    pub fn new(kind: GitErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn assume_sync_violated(detail: impl Into<String>) -> Self {
        Self::new(GitErrorKind::AssumeSyncViolated, detail)
    }

    pub fn parameter_missing(parameter: impl Into<String>) -> Self {
        let parameter = parameter.into();
        Self {
            message: format!("required sync parameter missing: {parameter}"),
            kind: GitErrorKind::SyncParameterMissing { parameter },
        }
    }

    pub fn pull_push_failure(detail: impl Into<String>) -> Self {
        Self::new(GitErrorKind::PullPushFailure, detail)
    }

    pub fn not_initialized(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(GitErrorKind::NotInitialized, format!("{path} is not a git repository"))
    }

    pub fn dead_loop() -> Self {
        Self::new(GitErrorKind::SyncScriptDeadLoop, "sync did not converge and was aborted")
    }

    pub fn auto_fix_failed(detail: impl Into<String>) -> Self {
        Self::new(GitErrorKind::SpecialGitStateAutoFixFailed, detail)
    }

    pub fn worker_unavailable() -> Self {
        Self::new(GitErrorKind::WorkerUnavailable, "git worker is not available")
    }

    pub fn command_failed(detail: impl Into<String>) -> Self {
        Self::new(GitErrorKind::CommandFailed, detail)
    }

    /// Replace the display message, keeping the category.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}
