// Step and error message translation.
//
// Worker events carry raw step identifiers; this module maps them to the
// text shown in logs and dialogs. The mapping is total over the known
// steps but deliberately tolerant of unknown identifiers: a newer worker
// may emit steps this build has never heard of, and those pass through
// as raw text instead of failing.

use std::borrow::Cow;

use tracing::{debug, error};
use wikivault_common::error::{GitError, GitErrorKind};
use wikivault_common::step::GitStep;

/// Human-readable text for one sync step.
pub fn step_text(step: GitStep) -> &'static str {
    match step {
        GitStep::StartGitInitialization => "Initializing the local git repository",
        GitStep::GitRepositoryConfigurationFinished => "Local git repository is configured",
        GitStep::StartConfiguringGithubRemoteRepository => "Configuring the remote repository",
        GitStep::StartBackupToGitRemote => "Backing up to the remote repository",
        GitStep::PrepareCloneOnlineWiki => "Preparing to clone the online wiki",
        GitStep::PrepareSync => "Preparing to synchronize",
        GitStep::HaveThingsToCommit => "There are local changes to commit",
        GitStep::AddingFiles => "Adding changed files",
        GitStep::AddComplete => "Changed files added",
        GitStep::CommitComplete => "Local commit created",
        GitStep::PreparingUserInfo => "Preparing commit author information",
        GitStep::FetchingData => "Fetching data from the remote",
        GitStep::NoNeedToSync => "Local wiki is already up to date, nothing to sync",
        GitStep::LocalAheadStartUpload => "Local wiki is ahead, uploading commits",
        GitStep::CheckingLocalSyncState => "Checking how local and remote histories relate",
        GitStep::CheckingLocalGitRepoSanity => "Checking the local git repository",
        GitStep::LocalStateBehindSync => "Local wiki is behind, downloading commits",
        GitStep::LocalStateDivergeRebase => "Histories diverged, rebasing local commits",
        GitStep::RebaseResultChecking => "Checking the rebase result",
        GitStep::RebaseConflictNeedsResolve => "Rebase hit a conflict that needs manual resolution",
        GitStep::RebaseSucceed => "Rebase succeeded",
        GitStep::GitPushFailed => "Pushing to the remote failed",
        GitStep::GitMergeFailed => "Merging remote changes failed",
        GitStep::SyncFailedAlgorithmWrong => "Synchronization failed due to an internal error",
        GitStep::PerformLastCheckBeforeSynchronizationFinish => {
            "Performing a final check before finishing"
        }
        GitStep::SynchronizationFinish => "Synchronization finished",
        GitStep::StartFetchingFromGithubRemote => "Fetching from the remote repository",
        GitStep::CantSyncInSpecialGitStateAutoFixSucceed => {
            "Repository was in an inconsistent state and was repaired automatically"
        }
    }
}

/// Translate a worker message. Known step identifiers map to their text;
/// anything else passes through unchanged.
pub fn translate_message(message: &str) -> Cow<'_, str> {
    match GitStep::parse(message) {
        Some(step) => Cow::Borrowed(step_text(step)),
        None => Cow::Borrowed(message),
    }
}

/// Rewrite a git error's message into user-facing text, keeping its
/// category. Kinds outside the user-facing set pass through unchanged.
pub fn translate_error(error: GitError) -> GitError {
    error!(kind = ?error.kind, message = %error.message, "git sync error");
    let replacement = match &error.kind {
        GitErrorKind::AssumeSyncViolated => {
            Some("Synchronization finished in an unexpected state".to_string())
        }
        GitErrorKind::SyncParameterMissing { parameter } => {
            Some(format!("A git setting is missing, please fill it in: {parameter}"))
        }
        GitErrorKind::PullPushFailure => {
            Some("Could not exchange data with the remote repository".to_string())
        }
        GitErrorKind::NotInitialized => {
            Some("The wiki folder is not a git repository yet, run setup first".to_string())
        }
        GitErrorKind::SyncScriptDeadLoop => {
            Some("Synchronization kept looping without finishing and was stopped".to_string())
        }
        GitErrorKind::SpecialGitStateAutoFixFailed => Some(
            "The repository is in an inconsistent state that could not be repaired automatically"
                .to_string(),
        ),
        GitErrorKind::WorkerUnavailable | GitErrorKind::CommandFailed => None,
    };
    match replacement {
        Some(message) => {
            debug!(translated = %message, "git sync error translated");
            error.with_message(message)
        }
        None => error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_step_has_non_empty_text() {
        for step in GitStep::all() {
            let text = translate_message(step.as_str());
            assert!(!text.is_empty(), "step {step:?} translated to empty text");
            assert_ne!(text, step.as_str(), "step {step:?} fell through untranslated");
        }
    }

    #[test]
    fn unknown_message_passes_through_unchanged() {
        assert_eq!(translate_message("SomeFutureStep"), "SomeFutureStep");
        assert_eq!(translate_message("worker starting"), "worker starting");
    }

    #[test]
    fn user_facing_kinds_are_rewritten() {
        let error = translate_error(GitError::parameter_missing("accessToken"));
        assert!(error.message.contains("accessToken"));
        assert!(error.message.contains("missing"));
        assert!(matches!(error.kind, GitErrorKind::SyncParameterMissing { .. }));

        let error = translate_error(GitError::pull_push_failure("raw stderr"));
        assert_eq!(error.kind, GitErrorKind::PullPushFailure);
        assert!(!error.message.contains("raw stderr"));
    }

    #[test]
    fn non_user_facing_kinds_pass_through() {
        let original = GitError::command_failed("`git fetch` failed with code Some(128)");
        let translated = translate_error(original.clone());
        assert_eq!(translated, original);

        let original = GitError::worker_unavailable();
        assert_eq!(translate_error(original.clone()), original);
    }
}
