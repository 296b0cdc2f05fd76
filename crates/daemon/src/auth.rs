// Credential store for remote hosting providers.
//
// Holds the per-provider username/email/token/branch records in memory,
// broadcasts every change to UI observers, and persists through the
// settings store via a coalescing write-back task: mutations update the
// cache synchronously and enqueue a snapshot; snapshots arriving within
// the debounce window collapse into one durable write (last-write-wins).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};
use wikivault_common::types::{
    CredentialField, GitCredential, StorageProvider, UserInfos,
};

use crate::settings::{SettingsError, SettingsStore, USER_INFOS_KEY};

/// Window within which rapid writes coalesce into one flush.
const FLUSH_DEBOUNCE: Duration = Duration::from_millis(10);

pub struct CredentialStore {
    cache: Mutex<UserInfos>,
    store: Arc<dyn SettingsStore>,
    change_tx: watch::Sender<UserInfos>,
    flush_tx: mpsc::UnboundedSender<UserInfos>,
    _flush_task: tokio::task::JoinHandle<()>,
}

impl CredentialStore {
    /// Seed the cache from durable storage and start the write-back task.
    /// Missing or malformed stored data falls back to sanitized defaults.
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        let cache = load_user_infos(store.as_ref());
        let (change_tx, _) = watch::channel(cache.clone());
        let (flush_tx, flush_rx) = mpsc::unbounded_channel();
        let flush_task = tokio::spawn(flush_loop(store.clone(), flush_rx));

        Self { cache: Mutex::new(cache), store, change_tx, flush_tx, _flush_task: flush_task }
    }

    /// Read one field. Missing providers and fields resolve to `None`;
    /// this never fails.
    pub fn get(&self, provider: StorageProvider, field: CredentialField) -> Option<String> {
        self.lock_cache().get(provider, field).map(str::to_string)
    }

    /// Write one field: updates the cache, re-applies sanitation, notifies
    /// subscribers, and enqueues a durable write.
    pub fn set(&self, provider: StorageProvider, field: CredentialField, value: Option<String>) {
        let snapshot = {
            let mut cache = self.lock_cache();
            cache.set(provider, field, value);
            cache.sanitize();
            cache.clone()
        };
        self.publish(snapshot);
    }

    /// Clear durable storage and reinitialize the cache to defaults.
    pub fn reset(&self) -> Result<(), SettingsError> {
        let snapshot = {
            let mut cache = self.lock_cache();
            *cache = UserInfos::default();
            cache.sanitize();
            cache.clone()
        };
        // Storage is cleared before publishing; the publish re-persists
        // the sanitized defaults.
        let result = self.store.clear();
        self.publish(snapshot);
        result
    }

    /// Full credential for one provider, when username and token are set.
    pub fn provider_credential(&self, provider: StorageProvider) -> Option<GitCredential> {
        self.lock_cache().credential(provider)
    }

    /// Scan providers in enumeration order and return the first whose
    /// token, username, and email are all non-empty.
    pub fn find_usable_credential(&self) -> Option<(StorageProvider, GitCredential)> {
        let cache = self.lock_cache();
        StorageProvider::all().iter().find_map(|provider| {
            let credential = cache.credential(*provider)?;
            if credential.email.as_deref().is_some_and(|email| !email.is_empty()) {
                Some((*provider, credential))
            } else {
                None
            }
        })
    }

    /// Observe the full credential snapshot; the receiver holds the
    /// current value immediately.
    pub fn subscribe(&self) -> watch::Receiver<UserInfos> {
        self.change_tx.subscribe()
    }

    pub fn snapshot(&self) -> UserInfos {
        self.lock_cache().clone()
    }

    fn publish(&self, snapshot: UserInfos) {
        // send_replace so publishing works with zero subscribers.
        self.change_tx.send_replace(snapshot.clone());
        if self.flush_tx.send(snapshot).is_err() {
            warn!("credential flush task is gone; writes are no longer persisted");
        }
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, UserInfos> {
        self.cache.lock().expect("credential cache lock poisoned")
    }
}

fn load_user_infos(store: &dyn SettingsStore) -> UserInfos {
    let mut infos = store
        .get(USER_INFOS_KEY)
        .and_then(|value| serde_json::from_value::<UserInfos>(value).ok())
        .unwrap_or_default();
    infos.sanitize();
    infos
}

/// Write-back loop: waits for a snapshot, lets the debounce window pass,
/// drains any newer snapshots, and persists the latest.
async fn flush_loop(
    store: Arc<dyn SettingsStore>,
    mut flush_rx: mpsc::UnboundedReceiver<UserInfos>,
) {
    while let Some(mut latest) = flush_rx.recv().await {
        tokio::time::sleep(FLUSH_DEBOUNCE).await;
        while let Ok(newer) = flush_rx.try_recv() {
            latest = newer;
        }
        match serde_json::to_value(&latest) {
            Ok(value) => {
                if let Err(error) = store.set(USER_INFOS_KEY, value) {
                    warn!(error = %error, "failed to persist credentials");
                } else {
                    debug!("credentials persisted");
                }
            }
            Err(error) => warn!(error = %error, "failed to serialize credentials"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettings;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSettings {
        inner: MemorySettings,
        writes: AtomicUsize,
    }

    impl CountingSettings {
        fn new() -> Self {
            Self { inner: MemorySettings::default(), writes: AtomicUsize::new(0) }
        }
    }

    impl SettingsStore for CountingSettings {
        fn get(&self, key: &str) -> Option<Value> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: Value) -> Result<(), SettingsError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value)
        }

        fn clear(&self) -> Result<(), SettingsError> {
            self.inner.clear()
        }
    }

    fn store_with(settings: Arc<dyn SettingsStore>) -> CredentialStore {
        CredentialStore::new(settings)
    }

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let store = store_with(Arc::new(MemorySettings::default()));
        store.set(StorageProvider::Github, CredentialField::UserName, Some("alice".into()));
        assert_eq!(
            store.get(StorageProvider::Github, CredentialField::UserName),
            Some("alice".to_string())
        );
        assert_eq!(store.get(StorageProvider::Github, CredentialField::Token), None);
    }

    #[tokio::test]
    async fn branch_defaults_to_main_when_never_set() {
        let store = store_with(Arc::new(MemorySettings::default()));
        for provider in StorageProvider::all() {
            assert_eq!(
                store.get(*provider, CredentialField::Branch),
                Some("main".to_string())
            );
        }
    }

    #[tokio::test]
    async fn reset_clears_everything_except_branch_defaults() {
        let store = store_with(Arc::new(MemorySettings::default()));
        store.set(StorageProvider::Gitlab, CredentialField::Token, Some("glpat".into()));
        store.reset().expect("reset should succeed");

        assert_eq!(store.get(StorageProvider::Gitlab, CredentialField::Token), None);
        assert_eq!(
            store.get(StorageProvider::Gitlab, CredentialField::Branch),
            Some("main".to_string())
        );
    }

    #[tokio::test]
    async fn find_usable_credential_requires_all_three_fields() {
        let store = store_with(Arc::new(MemorySettings::default()));
        assert!(store.find_usable_credential().is_none());

        store.set(StorageProvider::Gitlab, CredentialField::UserName, Some("bob".into()));
        store.set(StorageProvider::Gitlab, CredentialField::Token, Some("glpat".into()));
        // Email still missing.
        assert!(store.find_usable_credential().is_none());

        store.set(StorageProvider::Gitlab, CredentialField::Email, Some("bob@example.test".into()));
        let (provider, credential) =
            store.find_usable_credential().expect("gitlab credential is usable");
        assert_eq!(provider, StorageProvider::Gitlab);
        assert_eq!(credential.user_name, "bob");
    }

    #[tokio::test]
    async fn find_usable_credential_prefers_enumeration_order() {
        let store = store_with(Arc::new(MemorySettings::default()));
        for provider in [StorageProvider::Gitee, StorageProvider::Github] {
            store.set(provider, CredentialField::UserName, Some("alice".into()));
            store.set(provider, CredentialField::Email, Some("a@example.test".into()));
            store.set(provider, CredentialField::Token, Some("tok".into()));
        }

        let (provider, _) = store.find_usable_credential().expect("credential found");
        assert_eq!(provider, StorageProvider::Github);
    }

    #[tokio::test]
    async fn mutations_notify_subscribers() {
        let store = store_with(Arc::new(MemorySettings::default()));
        let mut changes = store.subscribe();

        store.set(StorageProvider::Github, CredentialField::UserName, Some("carol".into()));
        changes.changed().await.expect("change notification");
        assert_eq!(
            changes.borrow().get(StorageProvider::Github, CredentialField::UserName),
            Some("carol")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_writes_coalesce_into_one_flush() {
        let settings = Arc::new(CountingSettings::new());
        let store = store_with(settings.clone() as Arc<dyn SettingsStore>);

        store.set(StorageProvider::Github, CredentialField::Token, Some("one".into()));
        store.set(StorageProvider::Github, CredentialField::Token, Some("two".into()));
        store.set(StorageProvider::Github, CredentialField::Token, Some("three".into()));

        // Let the debounce window elapse and the flush task run.
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(settings.writes.load(Ordering::SeqCst), 1);
        let persisted: UserInfos =
            serde_json::from_value(settings.get(USER_INFOS_KEY).expect("persisted record"))
                .expect("valid record");
        assert_eq!(
            persisted.get(StorageProvider::Github, CredentialField::Token),
            Some("three")
        );
    }

    #[tokio::test]
    async fn cache_is_seeded_from_storage() {
        let settings = Arc::new(MemorySettings::default());
        let mut seeded = UserInfos::default();
        seeded.set(StorageProvider::Github, CredentialField::UserName, Some("dave".into()));
        settings
            .set(USER_INFOS_KEY, serde_json::to_value(&seeded).expect("serializes"))
            .expect("seed settings");

        let store = store_with(settings);
        assert_eq!(
            store.get(StorageProvider::Github, CredentialField::UserName),
            Some("dave".to_string())
        );
        // Sanitation applies to seeded data too.
        assert_eq!(
            store.get(StorageProvider::Github, CredentialField::Branch),
            Some("main".to_string())
        );
    }
}
