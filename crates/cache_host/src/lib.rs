//! Typed storage contracts shared by the reactive cache and its host adapters.
//!
//! This crate is the API boundary between the cache core and concrete persistence. It exposes
//! the namespace [`SnapshotStore`] contract, the [`PrefsStore`] contract used for the settings
//! record, and in-memory/no-op adapters for tests and unsupported targets. Browser adapters live
//! in `cache_host_web` and native file adapters in `cache_host_native`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod storage;

pub use storage::prefs::{MemoryPrefsStore, NoopPrefsStore, PrefsStore, PrefsStoreFuture};
pub use storage::snapshot::{
    encode_snapshot, namespace_storage_key, normalize_namespace, parse_snapshot,
    MemorySnapshotStore, NoopSnapshotStore, Snapshot, SnapshotStore, CACHE_KEY_PREFIX,
    DEFAULT_NAMESPACE,
};
