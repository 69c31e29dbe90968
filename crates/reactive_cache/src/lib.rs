//! Namespace-scoped key/value cache with typed, write-back handles.
//!
//! [`ReactiveCache`] binds one namespace of a durable [`SnapshotStore`] at a time. Reads go
//! through [`ReactiveCache::get_or_insert_with`], which runs the fallback only when the key is
//! missing and returns a [`CacheHandle`] whose mutations are written back to the snapshot it came
//! from. Namespace switches arrive on a [`NamespaceSignal`] (emitted by [`SettingsStore`]) and are
//! applied before the next cache operation.
//!
//! ```
//! use reactive_cache::{MemorySnapshotStore, ReactiveCache};
//!
//! let cache = ReactiveCache::open(MemorySnapshotStore::default(), "default")?;
//! let theme = cache.get_or_insert_with("theme", || "light".to_string())?;
//! theme.set("dark".to_string())?;
//!
//! cache.switch_namespace("work")?;
//! cache.set("theme", "blue")?;
//!
//! cache.switch_namespace("default")?;
//! assert_eq!(cache.get::<String>("theme")?.get(), "dark");
//! # Ok::<(), reactive_cache::CacheError>(())
//! ```

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod binding;
pub mod cache;
pub mod config;
pub mod error;
pub mod handle;
pub mod host_adapters;
pub mod settings;
pub mod signal;

pub use binding::SnapshotBinding;
pub use cache::ReactiveCache;
pub use cache_host::{
    MemoryPrefsStore, MemorySnapshotStore, NoopPrefsStore, NoopSnapshotStore, PrefsStore,
    Snapshot, SnapshotStore, DEFAULT_NAMESPACE,
};
pub use config::{CacheConfig, WriteBack};
pub use error::CacheError;
pub use handle::{CacheHandle, ObserverId};
pub use host_adapters::{
    host_strategy_name, prefs_store, selected_host_strategy, snapshot_store, HostStrategy,
    PrefsStoreAdapter, SnapshotStoreAdapter, PREFS_DIR_NAME, SNAPSHOT_DIR_NAME,
};
pub use settings::{Settings, SettingsStore, SETTINGS_PREFS_KEY};
pub use signal::{NamespaceSignal, NamespaceSubscription};
