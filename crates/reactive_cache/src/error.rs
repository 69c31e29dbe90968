//! Error surface of the reactive cache.

use thiserror::Error;

/// Errors returned by [`crate::ReactiveCache`] and [`crate::CacheHandle`] operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The key is absent from the bound snapshot and no fallback was supplied.
    #[error("no cached value for key `{key}` and no fallback to produce one")]
    NotCached {
        /// Key that missed.
        key: String,
    },
    /// Cache keys must be non-empty.
    #[error("cache key must not be empty")]
    EmptyKey,
    /// The durable store failed to load or persist a namespace snapshot.
    ///
    /// In-memory state is left intact; pending writes stay dirty and are retried on the next
    /// persist.
    #[error("snapshot store failed for namespace `{namespace}`: {message}")]
    AdapterFailure {
        /// Namespace whose snapshot was being loaded or persisted.
        namespace: String,
        /// Adapter-provided failure description.
        message: String,
    },
    /// A value could not be converted to JSON.
    #[error("failed to serialize value for key `{key}`")]
    Serialize {
        /// Key being written.
        key: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// A cached JSON value does not match the type requested by the caller.
    #[error("cached value for key `{key}` does not match the requested type")]
    Decode {
        /// Key being read.
        key: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    pub(crate) fn adapter(namespace: &str, message: impl Into<String>) -> Self {
        Self::AdapterFailure {
            namespace: namespace.to_string(),
            message: message.into(),
        }
    }

    /// Returns `true` for [`CacheError::NotCached`].
    pub fn is_not_cached(&self) -> bool {
        matches!(self, Self::NotCached { .. })
    }
}
