//! Host strategy selection and concrete store adapters for cache wiring.

use cache_host::{
    MemoryPrefsStore, MemorySnapshotStore, NoopPrefsStore, NoopSnapshotStore, PrefsStore,
    PrefsStoreFuture, Snapshot, SnapshotStore,
};
use cache_host_native::{FilePrefsStore, FileSnapshotStore};
use cache_host_web::{LocalStorageSnapshotStore, WebPrefsStore};

use crate::config::CacheConfig;

/// Subdirectory of [`CacheConfig::data_dir`] holding one `{namespace}.json` per namespace.
pub const SNAPSHOT_DIR_NAME: &str = "cache";
/// Subdirectory of [`CacheConfig::data_dir`] holding the settings record file.
pub const PREFS_DIR_NAME: &str = "prefs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Storage backend chosen for the current build and configuration.
pub enum HostStrategy {
    /// `window.localStorage` on `wasm32`.
    Browser,
    /// Files under [`CacheConfig::data_dir`], snapshots and settings in separate subdirectories.
    Native,
    /// Process memory only; nothing survives a restart.
    Memory,
    /// No-op stores, selected by the `host-stub` feature.
    Stub,
}

/// Returns the host strategy for `config` on the active build.
pub fn selected_host_strategy(config: &CacheConfig) -> HostStrategy {
    if cfg!(feature = "host-stub") {
        HostStrategy::Stub
    } else if cfg!(target_arch = "wasm32") {
        HostStrategy::Browser
    } else if config.data_dir.is_some() {
        HostStrategy::Native
    } else {
        HostStrategy::Memory
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name(strategy: HostStrategy) -> &'static str {
    match strategy {
        HostStrategy::Browser => "browser",
        HostStrategy::Native => "native",
        HostStrategy::Memory => "memory",
        HostStrategy::Stub => "stub",
    }
}

/// Adapter enum that erases the concrete snapshot backend behind [`SnapshotStore`].
#[derive(Debug, Clone)]
pub enum SnapshotStoreAdapter {
    /// Browser localStorage snapshots.
    Browser(LocalStorageSnapshotStore),
    /// One JSON file per namespace.
    Native(FileSnapshotStore),
    /// In-memory snapshots.
    Memory(MemorySnapshotStore),
    /// No-op fallback.
    Stub(NoopSnapshotStore),
}

impl SnapshotStore for SnapshotStoreAdapter {
    fn load_snapshot(&self, namespace: &str) -> Result<Snapshot, String> {
        match self {
            Self::Browser(store) => store.load_snapshot(namespace),
            Self::Native(store) => store.load_snapshot(namespace),
            Self::Memory(store) => store.load_snapshot(namespace),
            Self::Stub(store) => store.load_snapshot(namespace),
        }
    }

    fn persist_snapshot(&self, namespace: &str, snapshot: &Snapshot) -> Result<(), String> {
        match self {
            Self::Browser(store) => store.persist_snapshot(namespace, snapshot),
            Self::Native(store) => store.persist_snapshot(namespace, snapshot),
            Self::Memory(store) => store.persist_snapshot(namespace, snapshot),
            Self::Stub(store) => store.persist_snapshot(namespace, snapshot),
        }
    }

    fn list_namespaces(&self) -> Result<Vec<String>, String> {
        match self {
            Self::Browser(store) => store.list_namespaces(),
            Self::Native(store) => store.list_namespaces(),
            Self::Memory(store) => store.list_namespaces(),
            Self::Stub(store) => store.list_namespaces(),
        }
    }
}

/// Adapter enum that erases the concrete preference backend behind [`PrefsStore`].
#[derive(Debug, Clone)]
pub enum PrefsStoreAdapter {
    /// Browser localStorage preferences.
    Browser(WebPrefsStore),
    /// Shared JSON map file.
    Native(FilePrefsStore),
    /// In-memory preferences.
    Memory(MemoryPrefsStore),
    /// No-op fallback.
    Stub(NoopPrefsStore),
}

impl PrefsStore for PrefsStoreAdapter {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        match self {
            Self::Browser(store) => store.load_pref(key),
            Self::Native(store) => store.load_pref(key),
            Self::Memory(store) => store.load_pref(key),
            Self::Stub(store) => store.load_pref(key),
        }
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.save_pref(key, raw_json),
            Self::Native(store) => store.save_pref(key, raw_json),
            Self::Memory(store) => store.save_pref(key, raw_json),
            Self::Stub(store) => store.save_pref(key, raw_json),
        }
    }
}

/// Builds the snapshot store for `config`.
///
/// # Errors
///
/// Returns an error when the native data directory cannot be created.
pub fn snapshot_store(config: &CacheConfig) -> Result<SnapshotStoreAdapter, String> {
    Ok(match selected_host_strategy(config) {
        HostStrategy::Browser => SnapshotStoreAdapter::Browser(LocalStorageSnapshotStore),
        HostStrategy::Native => match &config.data_dir {
            Some(dir) => SnapshotStoreAdapter::Native(FileSnapshotStore::from_root(
                dir.join(SNAPSHOT_DIR_NAME),
            )?),
            None => SnapshotStoreAdapter::Memory(MemorySnapshotStore::default()),
        },
        HostStrategy::Memory => SnapshotStoreAdapter::Memory(MemorySnapshotStore::default()),
        HostStrategy::Stub => SnapshotStoreAdapter::Stub(NoopSnapshotStore),
    })
}

/// Builds the settings preference store for `config`.
///
/// # Errors
///
/// Returns an error when the native data directory cannot be created.
pub fn prefs_store(config: &CacheConfig) -> Result<PrefsStoreAdapter, String> {
    Ok(match selected_host_strategy(config) {
        HostStrategy::Browser => PrefsStoreAdapter::Browser(WebPrefsStore),
        HostStrategy::Native => match &config.data_dir {
            Some(dir) => {
                PrefsStoreAdapter::Native(FilePrefsStore::from_root(dir.join(PREFS_DIR_NAME))?)
            }
            None => PrefsStoreAdapter::Memory(MemoryPrefsStore::default()),
        },
        HostStrategy::Memory => PrefsStoreAdapter::Memory(MemoryPrefsStore::default()),
        HostStrategy::Stub => PrefsStoreAdapter::Stub(NoopPrefsStore),
    })
}

#[cfg(all(test, not(target_arch = "wasm32"), not(feature = "host-stub")))]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    use futures::executor::block_on;
    use serde_json::json;

    use super::*;

    fn temp_dir_path(label: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "reactive_cache_hosts_{label}_{}_{}",
            process::id(),
            now
        ))
    }

    #[test]
    fn native_build_without_data_dir_uses_memory() {
        let config = CacheConfig::default();
        assert_eq!(selected_host_strategy(&config), HostStrategy::Memory);
        assert!(matches!(
            snapshot_store(&config).expect("store"),
            SnapshotStoreAdapter::Memory(_)
        ));
        assert_eq!(host_strategy_name(HostStrategy::Memory), "memory");
    }

    #[test]
    fn data_dir_selects_file_backed_stores() {
        let root = temp_dir_path("native");
        let config = CacheConfig::default().with_data_dir(root.clone());
        assert_eq!(selected_host_strategy(&config), HostStrategy::Native);

        let store = snapshot_store(&config).expect("snapshot store");
        let mut snapshot = Snapshot::new();
        snapshot.insert("theme".to_string(), json!("dark"));
        store.persist_snapshot("default", &snapshot).expect("persist");
        assert!(root.join(SNAPSHOT_DIR_NAME).join("default.json").exists());

        let prefs = prefs_store(&config).expect("prefs store");
        block_on(prefs.save_pref("settings", "{}")).expect("save pref");
        assert!(root.join(PREFS_DIR_NAME).join("prefs.json").exists());
        assert_eq!(store.list_namespaces().expect("list"), vec!["default".to_string()]);

        let _ = fs::remove_dir_all(root);
    }
}
