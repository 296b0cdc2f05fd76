// Core domain types shared across wikivault crates.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Branch used when a credential record never had one set.
pub const DEFAULT_BRANCH: &str = "main";

/// Supported remote hosting services for wiki backup.
///
/// The variant order is the fixed enumeration order used when scanning
/// for a usable credential.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Github,
    Gitlab,
    Gitee,
}

impl StorageProvider {
    pub fn all() -> &'static [StorageProvider] {
        &[StorageProvider::Github, StorageProvider::Gitlab, StorageProvider::Gitee]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageProvider::Github => "github",
            StorageProvider::Gitlab => "gitlab",
            StorageProvider::Gitee => "gitee",
        }
    }
}

/// One stored field of a provider credential record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    UserName,
    Email,
    Token,
    Branch,
}

/// Partial per-provider credential data as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ProviderCredentials {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub token: Option<String>,
    pub branch: Option<String>,
}

impl ProviderCredentials {
    pub fn get(&self, field: CredentialField) -> Option<&str> {
        match field {
            CredentialField::UserName => self.user_name.as_deref(),
            CredentialField::Email => self.email.as_deref(),
            CredentialField::Token => self.token.as_deref(),
            CredentialField::Branch => self.branch.as_deref(),
        }
    }

    pub fn set(&mut self, field: CredentialField, value: Option<String>) {
        match field {
            CredentialField::UserName => self.user_name = value,
            CredentialField::Email => self.email = value,
            CredentialField::Token => self.token = value,
            CredentialField::Branch => self.branch = value,
        }
    }
}

/// The single persisted credential record (settings key `"userInfos"`),
/// holding every provider's fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct UserInfos {
    pub providers: BTreeMap<StorageProvider, ProviderCredentials>,
}

impl UserInfos {
    pub fn get(&self, provider: StorageProvider, field: CredentialField) -> Option<&str> {
        self.providers.get(&provider).and_then(|record| record.get(field))
    }

    pub fn set(&mut self, provider: StorageProvider, field: CredentialField, value: Option<String>) {
        self.providers.entry(provider).or_default().set(field, value);
    }

    /// Fill in defaults that must always be present: every known provider
    /// gets a branch when it never had one. Applied on every read from disk
    /// and every mutation.
    pub fn sanitize(&mut self) {
        for provider in StorageProvider::all() {
            let record = self.providers.entry(*provider).or_default();
            if record.branch.as_deref().map_or(true, str::is_empty) {
                record.branch = Some(DEFAULT_BRANCH.to_string());
            }
        }
    }

    /// Full credential for one provider; `None` unless username and token
    /// are both present and non-empty.
    pub fn credential(&self, provider: StorageProvider) -> Option<GitCredential> {
        let record = self.providers.get(&provider)?;
        let user_name = record.user_name.clone().filter(|v| !v.is_empty())?;
        let access_token = record.token.clone().filter(|v| !v.is_empty())?;
        Some(GitCredential {
            user_name,
            email: record.email.clone().filter(|v| !v.is_empty()),
            access_token,
            branch: record
                .branch
                .clone()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        })
    }
}

/// A complete, usable credential for one provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitCredential {
    pub user_name: String,
    pub email: Option<String>,
    pub access_token: String,
    pub branch: String,
}

/// A wiki workspace managed by the desktop shell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WikiWorkspace {
    pub id: Uuid,
    pub name: String,
    /// Absolute path of the wiki folder on disk.
    pub wiki_folder_location: PathBuf,
    /// Remote backup URL, when the workspace is synced.
    pub git_url: Option<String>,
    /// Whether this is the primary wiki (sub-wikis never sync on their own).
    pub is_main_wiki: bool,
    /// Whether backup/sync is enabled for this workspace.
    pub is_synced_wiki: bool,
}

impl WikiWorkspace {
    pub fn new(name: impl Into<String>, wiki_folder_location: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            wiki_folder_location: wiki_folder_location.into(),
            git_url: None,
            is_main_wiki: true,
            is_synced_wiki: false,
        }
    }
}

/// Per-call configuration for commit-and-sync.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitAndSyncConfig {
    pub remote_url: String,
    pub credential: GitCredential,
    /// Commit message override; the engine supplies a default when absent.
    pub commit_message: Option<String>,
}

/// Kind of change to a file in the working tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileChangeType {
    Added,
    Modified,
    Deleted,
    Renamed,
    Untracked,
}

/// One dirty file reported by the worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModifiedFile {
    /// Absolute path.
    pub file_path: PathBuf,
    /// Path relative to the wiki folder.
    pub file_relative_path: PathBuf,
    pub change_type: FileChangeType,
}
