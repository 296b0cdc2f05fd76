// User-facing dialog and external-app seams.
//
// The desktop shell owns the real modal dialogs and app launching; the
// sync service only describes what to show and reacts to the chosen
// button. Both seams are traits so the orchestrator is testable headless.

use std::future::Future;
use std::path::Path;

use tracing::warn;

/// Fallback page when no git GUI app can be launched.
pub const GITHUB_DESKTOP_DOWNLOAD_URL: &str = "https://desktop.github.com/";

/// A blocking modal failure dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDialog {
    pub title: String,
    pub message: String,
    pub buttons: Vec<String>,
    pub default_button: usize,
    pub cancel_button: usize,
}

/// Presents modal dialogs to the user. Returns the index of the chosen
/// button.
pub trait DialogPresenter: Send + Sync + 'static {
    fn present(&self, dialog: FailureDialog) -> impl Future<Output = usize> + Send;
}

/// Opens the wiki folder in an external git GUI application, with a web
/// URL as last resort.
pub trait GitGuiOpener: Send + Sync + 'static {
    /// Try to open the repository in a native git GUI. Returns `false`
    /// when no such app could be launched.
    fn open_repository(&self, path: &Path) -> bool;

    /// Open a URL in the default browser.
    fn open_url(&self, url: &str);
}

/// Launches GitHub Desktop (or whatever handles the folder) through the
/// operating system's opener.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGitGuiOpener;

impl GitGuiOpener for SystemGitGuiOpener {
    fn open_repository(&self, path: &Path) -> bool {
        match open::with(path, git_gui_app_name()) {
            Ok(()) => true,
            Err(error) => {
                warn!(error = %error, path = %path.display(), "failed to open git GUI app");
                false
            }
        }
    }

    fn open_url(&self, url: &str) {
        if let Err(error) = open::that(url) {
            warn!(error = %error, url, "failed to open URL in browser");
        }
    }
}

fn git_gui_app_name() -> &'static str {
    if cfg!(target_os = "macos") {
        "GitHub Desktop"
    } else if cfg!(target_os = "windows") {
        "GitHubDesktop"
    } else {
        "github-desktop"
    }
}
