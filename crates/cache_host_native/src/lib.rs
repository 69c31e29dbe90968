//! Native file-backed implementations of [`cache_host`] storage contracts.
//!
//! Snapshots are stored one file per namespace under a root directory; preferences share a
//! single JSON map file. All writes go through a temp file and a rename.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod atomic;
pub mod prefs_file;
pub mod snapshot_file;

pub use prefs_file::FilePrefsStore;
pub use snapshot_file::{validate_namespace, FileSnapshotStore};
