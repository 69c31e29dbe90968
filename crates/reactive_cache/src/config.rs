//! Cache construction settings.

use std::path::PathBuf;

use cache_host::{normalize_namespace, DEFAULT_NAMESPACE};
use serde::{Deserialize, Serialize};

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// When handle mutations and direct sets reach the durable store.
pub enum WriteBack {
    /// Persist the whole namespace snapshot on every mutation.
    #[default]
    Immediate,
    /// Only mark the snapshot dirty; persist on flush, namespace switch, or drop.
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Settings used to build a [`crate::ReactiveCache`].
pub struct CacheConfig {
    /// Namespace bound at construction. Blank resolves to `default`.
    pub namespace: String,
    /// Write-back policy applied to every binding.
    pub write_back: WriteBack,
    /// Root directory for the native file store. Ignored in the browser.
    pub data_dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            write_back: WriteBack::Immediate,
            data_dir: None,
        }
    }
}

impl CacheConfig {
    /// Builds a config bound to the namespace recorded in `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            namespace: normalize_namespace(&settings.namespace),
            ..Self::default()
        }
    }

    /// Sets the write-back policy.
    pub fn with_write_back(mut self, write_back: WriteBack) -> Self {
        self.write_back = write_back;
        self
    }

    /// Sets the native data directory.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }
}
