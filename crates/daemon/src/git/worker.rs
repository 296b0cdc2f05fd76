// Sync worker bridge.
//
// Owns the single background worker that performs git operations. The
// worker runs on a dedicated OS thread because the engine blocks on git
// subprocesses; the host talks to it over channels. Each streaming call
// gets its own event channel carrying progress events and exactly one
// terminal `Completed`/`Failed`. If the worker cannot be started within
// the startup timeout the bridge degrades: streaming calls fail fast and
// read-only queries return empty results.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};
use wikivault_common::error::GitError;
use wikivault_common::event::ProgressEvent;
use wikivault_common::types::ModifiedFile;

use super::engine::{CloneRequest, CommitAndSyncRequest, EventSink, InitRepoRequest, SyncEngine};

/// How long to wait for the worker thread to report ready.
pub const WORKER_STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

/// One message in a streaming call's event channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Progress(ProgressEvent),
    /// Terminal: the operation finished successfully.
    Completed,
    /// Terminal: the operation failed.
    Failed(GitError),
}

/// Receiving end of one streaming call.
pub type EventStream = mpsc::UnboundedReceiver<WorkerEvent>;

enum WorkerRequest {
    InitRepo { request: InitRepoRequest, events: mpsc::UnboundedSender<WorkerEvent> },
    CommitAndSync { request: CommitAndSyncRequest, events: mpsc::UnboundedSender<WorkerEvent> },
    CloneRepo { request: CloneRequest, events: mpsc::UnboundedSender<WorkerEvent> },
    ModifiedFileList { wiki_folder: PathBuf, reply: oneshot::Sender<Vec<ModifiedFile>> },
    RemoteUrl { wiki_folder: PathBuf, reply: oneshot::Sender<Option<String>> },
}

/// Abstraction over the worker bridge so the orchestrator can be tested
/// with scripted workers.
pub trait SyncWorker: Send + Sync + 'static {
    fn init_repo(&self, request: InitRepoRequest) -> Result<EventStream, GitError>;

    fn commit_and_sync(&self, request: CommitAndSyncRequest) -> Result<EventStream, GitError>;

    fn clone_repo(&self, request: CloneRequest) -> Result<EventStream, GitError>;

    fn modified_file_list(
        &self,
        wiki_folder: PathBuf,
    ) -> impl Future<Output = Vec<ModifiedFile>> + Send;

    fn remote_url(&self, wiki_folder: PathBuf) -> impl Future<Output = Option<String>> + Send;
}

/// The production bridge around the worker thread.
pub struct GitWorkerBridge {
    requests: Option<mpsc::UnboundedSender<WorkerRequest>>,
}

impl GitWorkerBridge {
    /// Spawn the worker with the default startup timeout.
    pub async fn spawn<E: SyncEngine>(engine: E) -> Self {
        Self::spawn_with_timeout(engine, WORKER_STARTUP_TIMEOUT).await
    }

    /// Spawn the worker, waiting at most `startup_timeout` for it to come
    /// up. On failure the bridge is returned in degraded mode rather than
    /// failing construction.
    pub async fn spawn_with_timeout<E: SyncEngine>(engine: E, startup_timeout: Duration) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        let spawned = std::thread::Builder::new()
            .name("git-worker".into())
            .spawn(move || worker_loop(engine, request_rx, ready_tx));
        if let Err(error) = spawned {
            warn!(error = %error, "failed to spawn git worker thread; git operations disabled");
            return Self { requests: None };
        }

        match tokio::time::timeout(startup_timeout, ready_rx).await {
            Ok(Ok(())) => {
                info!("git worker started");
                Self { requests: Some(request_tx) }
            }
            _ => {
                warn!(
                    timeout_secs = startup_timeout.as_secs(),
                    "git worker did not start in time; git operations disabled"
                );
                Self { requests: None }
            }
        }
    }

    /// A bridge with no worker. Streaming calls fail fast; queries return
    /// empty results.
    pub fn unavailable() -> Self {
        Self { requests: None }
    }

    pub fn is_available(&self) -> bool {
        self.requests.is_some()
    }

    fn send_streaming(
        &self,
        build: impl FnOnce(mpsc::UnboundedSender<WorkerEvent>) -> WorkerRequest,
    ) -> Result<EventStream, GitError> {
        let requests = self.requests.as_ref().ok_or_else(GitError::worker_unavailable)?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        requests.send(build(events_tx)).map_err(|_| GitError::worker_unavailable())?;
        Ok(events_rx)
    }
}

impl SyncWorker for GitWorkerBridge {
    fn init_repo(&self, request: InitRepoRequest) -> Result<EventStream, GitError> {
        self.send_streaming(|events| WorkerRequest::InitRepo { request, events })
    }

    fn commit_and_sync(&self, request: CommitAndSyncRequest) -> Result<EventStream, GitError> {
        self.send_streaming(|events| WorkerRequest::CommitAndSync { request, events })
    }

    fn clone_repo(&self, request: CloneRequest) -> Result<EventStream, GitError> {
        self.send_streaming(|events| WorkerRequest::CloneRepo { request, events })
    }

    async fn modified_file_list(&self, wiki_folder: PathBuf) -> Vec<ModifiedFile> {
        let Some(requests) = self.requests.as_ref() else {
            return Vec::new();
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        if requests.send(WorkerRequest::ModifiedFileList { wiki_folder, reply: reply_tx }).is_err()
        {
            return Vec::new();
        }
        reply_rx.await.unwrap_or_default()
    }

    async fn remote_url(&self, wiki_folder: PathBuf) -> Option<String> {
        let requests = self.requests.as_ref()?;
        let (reply_tx, reply_rx) = oneshot::channel();
        requests.send(WorkerRequest::RemoteUrl { wiki_folder, reply: reply_tx }).ok()?;
        reply_rx.await.ok().flatten()
    }
}

/// Worker thread body: signal readiness, then serve requests one at a
/// time until every bridge handle is dropped.
fn worker_loop<E: SyncEngine>(
    engine: E,
    mut requests: mpsc::UnboundedReceiver<WorkerRequest>,
    ready: oneshot::Sender<()>,
) {
    let _ = ready.send(());
    while let Some(request) = requests.blocking_recv() {
        match request {
            WorkerRequest::InitRepo { request, events } => {
                run_streaming(|sink| engine.init_repo(&request, sink), events);
            }
            WorkerRequest::CommitAndSync { request, events } => {
                run_streaming(|sink| engine.commit_and_sync(&request, sink), events);
            }
            WorkerRequest::CloneRepo { request, events } => {
                run_streaming(|sink| engine.clone_repo(&request, sink), events);
            }
            WorkerRequest::ModifiedFileList { wiki_folder, reply } => {
                let list = engine.modified_file_list(&wiki_folder).unwrap_or_else(|error| {
                    warn!(error = %error, "modified file list query failed");
                    Vec::new()
                });
                let _ = reply.send(list);
            }
            WorkerRequest::RemoteUrl { wiki_folder, reply } => {
                let remote = engine.remote_url(&wiki_folder).unwrap_or_else(|error| {
                    warn!(error = %error, "remote url query failed");
                    None
                });
                let _ = reply.send(remote);
            }
        }
    }
}

fn run_streaming(
    op: impl FnOnce(&mut dyn EventSink) -> Result<(), GitError>,
    events: mpsc::UnboundedSender<WorkerEvent>,
) {
    let mut sink = |event: ProgressEvent| {
        // A dropped receiver just means the caller went away mid-call.
        let _ = events.send(WorkerEvent::Progress(event));
    };
    let terminal = match op(&mut sink) {
        Ok(()) => WorkerEvent::Completed,
        Err(error) => WorkerEvent::Failed(error),
    };
    let _ = events.send(terminal);
}
