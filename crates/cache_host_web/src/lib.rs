//! Browser (`wasm32`) implementations of [`cache_host`] storage contracts.
//!
//! Both stores talk to `window.localStorage` synchronously. On non-wasm targets they compile to
//! inert fallbacks (empty loads, successful writes) so the workspace builds and tests natively.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod storage;

pub use storage::local_prefs::WebPrefsStore;
pub use storage::local_snapshot::LocalStorageSnapshotStore;
