//! `localStorage`-backed namespace snapshot store.
//!
//! Each namespace lives under its own storage key, `cache:{namespace}`, holding the snapshot as a
//! JSON object. Writes replace the whole object.

use cache_host::{Snapshot, SnapshotStore};
#[cfg(target_arch = "wasm32")]
use cache_host::{encode_snapshot, namespace_storage_key, parse_snapshot, CACHE_KEY_PREFIX};

#[derive(Debug, Clone, Copy, Default)]
/// Browser snapshot store backed by `window.localStorage`.
pub struct LocalStorageSnapshotStore;

impl SnapshotStore for LocalStorageSnapshotStore {
    fn load_snapshot(&self, namespace: &str) -> Result<Snapshot, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let key = namespace_storage_key(namespace);
            let raw = super::local_storage()?
                .get_item(&key)
                .map_err(|e| format!("localStorage get_item failed: {e:?}"))?;
            match raw {
                Some(raw) => parse_snapshot(&raw)
                    .map_err(|err| format!("failed to parse snapshot `{key}`: {err}")),
                None => Ok(Snapshot::new()),
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = namespace;
            Ok(Snapshot::new())
        }
    }

    fn persist_snapshot(&self, namespace: &str, snapshot: &Snapshot) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let raw = encode_snapshot(snapshot)?;
            super::local_storage()?
                .set_item(&namespace_storage_key(namespace), &raw)
                .map_err(|e| format!("localStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (namespace, snapshot);
            Ok(())
        }
    }

    fn list_namespaces(&self) -> Result<Vec<String>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = super::local_storage()?;
            let len = storage
                .length()
                .map_err(|e| format!("localStorage length failed: {e:?}"))?;
            let mut namespaces = Vec::new();
            for index in 0..len {
                let key = storage
                    .key(index)
                    .map_err(|e| format!("localStorage key failed: {e:?}"))?;
                if let Some(namespace) = key
                    .as_deref()
                    .and_then(|key| key.strip_prefix(CACHE_KEY_PREFIX))
                {
                    namespaces.push(namespace.to_string());
                }
            }
            namespaces.sort();
            Ok(namespaces)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Ok(Vec::new())
        }
    }
}
