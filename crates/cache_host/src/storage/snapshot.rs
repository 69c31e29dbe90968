//! Namespace snapshot persistence contracts and in-memory adapters.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use serde_json::Value;

/// Namespace used when a caller supplies an empty namespace string.
pub const DEFAULT_NAMESPACE: &str = "default";
/// Prefix applied to namespace names when a backend shares one flat key space.
pub const CACHE_KEY_PREFIX: &str = "cache:";

/// Durable contents of one namespace: cache key to arbitrary JSON value.
pub type Snapshot = BTreeMap<String, Value>;

/// Durable store holding one [`Snapshot`] per namespace.
///
/// Calls are synchronous. Adapters that flush to slower media may buffer internally, but
/// `persist_snapshot` returning `Ok` means the adapter has accepted the full replacement.
pub trait SnapshotStore {
    /// Loads the current snapshot for `namespace`, or an empty snapshot when none exists.
    fn load_snapshot(&self, namespace: &str) -> Result<Snapshot, String>;

    /// Replaces the durable snapshot for `namespace` with `snapshot`.
    fn persist_snapshot(&self, namespace: &str, snapshot: &Snapshot) -> Result<(), String>;

    /// Lists namespaces that currently hold a persisted snapshot, sorted.
    fn list_namespaces(&self) -> Result<Vec<String>, String>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Rc<S> {
    fn load_snapshot(&self, namespace: &str) -> Result<Snapshot, String> {
        (**self).load_snapshot(namespace)
    }

    fn persist_snapshot(&self, namespace: &str, snapshot: &Snapshot) -> Result<(), String> {
        (**self).persist_snapshot(namespace, snapshot)
    }

    fn list_namespaces(&self) -> Result<Vec<String>, String> {
        (**self).list_namespaces()
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op snapshot store for unsupported targets. Every load is empty and nothing is kept.
pub struct NoopSnapshotStore;

impl SnapshotStore for NoopSnapshotStore {
    fn load_snapshot(&self, _namespace: &str) -> Result<Snapshot, String> {
        Ok(Snapshot::new())
    }

    fn persist_snapshot(&self, _namespace: &str, _snapshot: &Snapshot) -> Result<(), String> {
        Ok(())
    }

    fn list_namespaces(&self) -> Result<Vec<String>, String> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory snapshot store keyed by namespace. Clones share the same backing map.
pub struct MemorySnapshotStore {
    inner: Rc<RefCell<HashMap<String, Snapshot>>>,
}

impl SnapshotStore for MemorySnapshotStore {
    fn load_snapshot(&self, namespace: &str) -> Result<Snapshot, String> {
        Ok(self
            .inner
            .borrow()
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }

    fn persist_snapshot(&self, namespace: &str, snapshot: &Snapshot) -> Result<(), String> {
        self.inner
            .borrow_mut()
            .insert(namespace.to_string(), snapshot.clone());
        Ok(())
    }

    fn list_namespaces(&self) -> Result<Vec<String>, String> {
        let mut namespaces = self.inner.borrow().keys().cloned().collect::<Vec<_>>();
        namespaces.sort();
        Ok(namespaces)
    }
}

/// Resolves a caller-supplied namespace, mapping blank input to [`DEFAULT_NAMESPACE`].
pub fn normalize_namespace(namespace: &str) -> String {
    let trimmed = namespace.trim();
    if trimmed.is_empty() {
        DEFAULT_NAMESPACE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Builds the flat storage key used for `namespace` (`cache:{namespace}`).
pub fn namespace_storage_key(namespace: &str) -> String {
    format!("{CACHE_KEY_PREFIX}{namespace}")
}

/// Parses a raw JSON object into a [`Snapshot`]. Blank input yields an empty snapshot.
///
/// # Errors
///
/// Returns an error when `raw` is not a JSON object.
pub fn parse_snapshot(raw: &str) -> Result<Snapshot, String> {
    if raw.trim().is_empty() {
        return Ok(Snapshot::new());
    }
    serde_json::from_str(raw).map_err(|e| e.to_string())
}

/// Serializes a [`Snapshot`] into a JSON object string.
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn encode_snapshot(snapshot: &Snapshot) -> Result<String, String> {
    serde_json::to_string(snapshot).map_err(|e| e.to_string())
}
