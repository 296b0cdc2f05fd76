// Sync orchestrator: the git façade consumed by the rest of the app.
//
// Sequences init/clone/commit-and-sync calls against the worker bridge,
// gates them on connectivity, logs translated progress, and decides when
// a failure becomes a modal dialog. Collaborators (worker, network probe,
// dialog presenter, git GUI opener) are injected at construction.

use std::path::Path;

use tracing::{debug, error, info, warn};
use wikivault_common::error::GitError;
use wikivault_common::event::{LogLevel, ProgressEvent};
use wikivault_common::step::GitStep;
use wikivault_common::types::{CommitAndSyncConfig, GitCredential, ModifiedFile, WikiWorkspace};

use super::engine::{CloneRequest, CommitAndSyncRequest, InitRepoRequest};
use super::translate::{translate_error, translate_message};
use super::worker::{EventStream, SyncWorker, WorkerEvent};
use crate::dialog::{DialogPresenter, FailureDialog, GitGuiOpener, GITHUB_DESKTOP_DOWNLOAD_URL};
use crate::net::NetworkProbe;

pub struct GitService<W, N, D, G> {
    worker: W,
    net: N,
    dialogs: D,
    gui: G,
}

impl<W, N, D, G> GitService<W, N, D, G>
where
    W: SyncWorker,
    N: NetworkProbe,
    D: DialogPresenter,
    G: GitGuiOpener,
{
    pub fn new(worker: W, net: N, dialogs: D, gui: G) -> Self {
        Self { worker, net, dialogs, gui }
    }

    /// Initialize a wiki folder as a git repository. Pushes to the remote
    /// right away only when the workspace is the synced primary wiki and
    /// the machine is online.
    pub async fn init_wiki_git(
        &self,
        workspace: &WikiWorkspace,
        remote_url: Option<String>,
        credential: Option<GitCredential>,
    ) -> Result<(), GitError> {
        let sync_immediately =
            workspace.is_synced_wiki && workspace.is_main_wiki && self.net.is_online().await;
        info!(
            workspace = %workspace.name,
            sync_immediately,
            "initializing wiki git repository"
        );
        let stream = self.worker.init_repo(InitRepoRequest {
            wiki_folder: workspace.wiki_folder_location.clone(),
            sync_immediately,
            remote_url,
            credential,
        })?;
        self.drive(stream).await.map(|_| ())
    }

    /// Commit local changes and synchronize with the remote. Returns
    /// whether the run produced changes. Offline is not an error: the
    /// call returns `false` without touching the worker, and it is the
    /// caller's job to try again later.
    pub async fn commit_and_sync(
        &self,
        workspace: &WikiWorkspace,
        config: CommitAndSyncConfig,
    ) -> bool {
        if !self.net.is_online().await {
            debug!(workspace = %workspace.name, "offline, skipping commit and sync");
            return false;
        }

        let request = CommitAndSyncRequest { workspace: workspace.clone(), config };
        let result = match self.worker.commit_and_sync(request) {
            Ok(stream) => self.drive(stream).await,
            Err(error) => Err(translate_error(error)),
        };
        match result {
            Ok(has_changes) => has_changes,
            Err(failure) => {
                // The failure is handled out of band via the dialog; report
                // "had changes" so callers refresh their state.
                self.present_failed_dialog(failure.message, &workspace.wiki_folder_location)
                    .await;
                true
            }
        }
    }

    /// Clone a remote wiki. A silent no-op while offline.
    pub async fn clone_wiki(
        &self,
        remote_url: String,
        wiki_folder: impl Into<std::path::PathBuf>,
        credential: GitCredential,
    ) -> Result<(), GitError> {
        if !self.net.is_online().await {
            debug!("offline, skipping clone");
            return Ok(());
        }
        let stream = self.worker.clone_repo(CloneRequest {
            remote_url,
            wiki_folder: wiki_folder.into(),
            credential,
        })?;
        self.drive(stream).await.map(|_| ())
    }

    /// Current dirty-file set; empty when the worker is unavailable.
    pub async fn modified_file_list(&self, wiki_folder: &Path) -> Vec<ModifiedFile> {
        self.worker.modified_file_list(wiki_folder.to_path_buf()).await
    }

    /// Configured backup remote of a wiki folder, if any.
    pub async fn workspace_remote(&self, wiki_folder: &Path) -> Option<String> {
        self.worker.remote_url(wiki_folder.to_path_buf()).await
    }

    /// Consume one event stream: log every event (translated), apply the
    /// push-failure dialog policy, and track whether any step implied
    /// changes. Resolves on the terminal event.
    async fn drive(&self, mut stream: EventStream) -> Result<bool, GitError> {
        let mut has_changes = false;
        while let Some(event) = stream.recv().await {
            match event {
                WorkerEvent::Progress(event) => {
                    self.observe(&event).await;
                    if event.step_id().is_some_and(|step| step.implies_changes()) {
                        has_changes = true;
                    }
                }
                WorkerEvent::Completed => return Ok(has_changes),
                WorkerEvent::Failed(failure) => return Err(translate_error(failure)),
            }
        }
        // The stream closed without a terminal event: the worker died.
        Err(translate_error(GitError::worker_unavailable()))
    }

    async fn observe(&self, event: &ProgressEvent) {
        let text = translate_message(&event.message);
        let detail = event.meta.as_ref().and_then(|meta| meta.detail.as_deref()).unwrap_or("");
        match event.level {
            LogLevel::Info => info!(step = ?event.step_id(), "{text}"),
            LogLevel::Warn => warn!(step = ?event.step_id(), detail, "{text}"),
            LogLevel::Error => error!(step = ?event.step_id(), detail, "{text}"),
        }

        // Only a push rejected with HTTP 403 earns a modal: the stored
        // token is expired or wrong and the user has to act.
        if event.step_id() == Some(GitStep::GitPushFailed)
            && (event.message.contains("403") || detail.contains("403"))
        {
            self.dialogs
                .present(FailureDialog {
                    title: "Git token missing".into(),
                    message: format!(
                        "Your git token may be expired or wrong ({detail})"
                    ),
                    buttons: vec!["OK".into()],
                    default_button: 0,
                    cancel_button: 0,
                })
                .await;
        }
    }

    async fn present_failed_dialog(&self, message: String, wiki_folder: &Path) {
        let choice = self
            .dialogs
            .present(FailureDialog {
                title: "Synchronization failed".into(),
                message,
                buttons: vec!["OK".into(), "GitHub Desktop".into()],
                default_button: 1,
                cancel_button: 0,
            })
            .await;
        if choice == 1 && !self.gui.open_repository(wiki_folder) {
            self.gui.open_url(GITHUB_DESKTOP_DOWNLOAD_URL);
        }
    }
}
