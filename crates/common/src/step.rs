// Sync step taxonomy emitted by the git worker.
//
// Steps travel over the worker event channel as raw identifier strings and
// are translated into human-readable text on the host side. The enumeration
// is deliberately open-ended on the wire: consumers must pass unknown step
// strings through unchanged so newer workers can add steps without breaking
// older hosts.

use serde::{Deserialize, Serialize};

/// A phase of a git init / clone / commit-and-sync run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GitStep {
    StartGitInitialization,
    GitRepositoryConfigurationFinished,
    StartConfiguringGithubRemoteRepository,
    StartBackupToGitRemote,
    PrepareCloneOnlineWiki,
    PrepareSync,
    HaveThingsToCommit,
    AddingFiles,
    AddComplete,
    CommitComplete,
    PreparingUserInfo,
    FetchingData,
    NoNeedToSync,
    LocalAheadStartUpload,
    CheckingLocalSyncState,
    CheckingLocalGitRepoSanity,
    LocalStateBehindSync,
    LocalStateDivergeRebase,
    RebaseResultChecking,
    RebaseConflictNeedsResolve,
    RebaseSucceed,
    GitPushFailed,
    GitMergeFailed,
    SyncFailedAlgorithmWrong,
    PerformLastCheckBeforeSynchronizationFinish,
    SynchronizationFinish,
    StartFetchingFromGithubRemote,
    CantSyncInSpecialGitStateAutoFixSucceed,
}

/// Steps that imply the sync run produced changes (new commits locally,
/// or commits integrated from the remote). Used by the orchestrator to
/// compute the "had changes" result of commit-and-sync.
pub const STEPS_WITH_CHANGES: &[GitStep] = &[
    GitStep::HaveThingsToCommit,
    GitStep::AddingFiles,
    GitStep::AddComplete,
    GitStep::CommitComplete,
    GitStep::LocalAheadStartUpload,
    GitStep::LocalStateBehindSync,
    GitStep::LocalStateDivergeRebase,
    GitStep::RebaseSucceed,
];

impl GitStep {
    /// Wire identifier for this step.
    pub fn as_str(&self) -> &'static str {
        match self {
            GitStep::StartGitInitialization => "StartGitInitialization",
            GitStep::GitRepositoryConfigurationFinished => "GitRepositoryConfigurationFinished",
            GitStep::StartConfiguringGithubRemoteRepository => {
                "StartConfiguringGithubRemoteRepository"
            }
            GitStep::StartBackupToGitRemote => "StartBackupToGitRemote",
            GitStep::PrepareCloneOnlineWiki => "PrepareCloneOnlineWiki",
            GitStep::PrepareSync => "PrepareSync",
            GitStep::HaveThingsToCommit => "HaveThingsToCommit",
            GitStep::AddingFiles => "AddingFiles",
            GitStep::AddComplete => "AddComplete",
            GitStep::CommitComplete => "CommitComplete",
            GitStep::PreparingUserInfo => "PreparingUserInfo",
            GitStep::FetchingData => "FetchingData",
            GitStep::NoNeedToSync => "NoNeedToSync",
            GitStep::LocalAheadStartUpload => "LocalAheadStartUpload",
            GitStep::CheckingLocalSyncState => "CheckingLocalSyncState",
            GitStep::CheckingLocalGitRepoSanity => "CheckingLocalGitRepoSanity",
            GitStep::LocalStateBehindSync => "LocalStateBehindSync",
            GitStep::LocalStateDivergeRebase => "LocalStateDivergeRebase",
            GitStep::RebaseResultChecking => "RebaseResultChecking",
            GitStep::RebaseConflictNeedsResolve => "RebaseConflictNeedsResolve",
            GitStep::RebaseSucceed => "RebaseSucceed",
            GitStep::GitPushFailed => "GitPushFailed",
            GitStep::GitMergeFailed => "GitMergeFailed",
            GitStep::SyncFailedAlgorithmWrong => "SyncFailedAlgorithmWrong",
            GitStep::PerformLastCheckBeforeSynchronizationFinish => {
                "PerformLastCheckBeforeSynchronizationFinish"
            }
            GitStep::SynchronizationFinish => "SynchronizationFinish",
            GitStep::StartFetchingFromGithubRemote => "StartFetchingFromGithubRemote",
            GitStep::CantSyncInSpecialGitStateAutoFixSucceed => {
                "CantSyncInSpecialGitStateAutoFixSucceed"
            }
        }
    }

    /// All steps, in a fixed order. Used by the translator tests to assert
    /// total coverage.
    pub fn all() -> &'static [GitStep] {
        &[
            GitStep::StartGitInitialization,
            GitStep::GitRepositoryConfigurationFinished,
            GitStep::StartConfiguringGithubRemoteRepository,
            GitStep::StartBackupToGitRemote,
            GitStep::PrepareCloneOnlineWiki,
            GitStep::PrepareSync,
            GitStep::HaveThingsToCommit,
            GitStep::AddingFiles,
            GitStep::AddComplete,
            GitStep::CommitComplete,
            GitStep::PreparingUserInfo,
            GitStep::FetchingData,
            GitStep::NoNeedToSync,
            GitStep::LocalAheadStartUpload,
            GitStep::CheckingLocalSyncState,
            GitStep::CheckingLocalGitRepoSanity,
            GitStep::LocalStateBehindSync,
            GitStep::LocalStateDivergeRebase,
            GitStep::RebaseResultChecking,
            GitStep::RebaseConflictNeedsResolve,
            GitStep::RebaseSucceed,
            GitStep::GitPushFailed,
            GitStep::GitMergeFailed,
            GitStep::SyncFailedAlgorithmWrong,
            GitStep::PerformLastCheckBeforeSynchronizationFinish,
            GitStep::SynchronizationFinish,
            GitStep::StartFetchingFromGithubRemote,
            GitStep::CantSyncInSpecialGitStateAutoFixSucceed,
        ]
    }

    /// Parse a wire identifier. Returns `None` for unknown strings so the
    /// caller can fall back to raw-text passthrough.
    pub fn parse(value: &str) -> Option<GitStep> {
        GitStep::all().iter().copied().find(|step| step.as_str() == value)
    }

    /// Whether this step implies the sync produced changes.
    pub fn implies_changes(&self) -> bool {
        STEPS_WITH_CHANGES.contains(self)
    }
}
