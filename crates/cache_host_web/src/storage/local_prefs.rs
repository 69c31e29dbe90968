//! `localStorage`-backed record store for the persisted settings record.
//!
//! Records sit under their bare key (`settings`), outside the `cache:` prefix that snapshots use,
//! so [`crate::LocalStorageSnapshotStore::list_namespaces`] never reports them.

use cache_host::{PrefsStore, PrefsStoreFuture};

#[derive(Debug, Clone, Copy, Default)]
/// Browser record store backed by `window.localStorage`.
pub struct WebPrefsStore;

impl WebPrefsStore {
    fn read(self, key: &str) -> Result<Option<String>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            super::local_storage()?
                .get_item(key)
                .map_err(|e| format!("localStorage get_item `{key}` failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(None)
        }
    }

    fn write(self, key: &str, raw_json: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            super::local_storage()?
                .set_item(key, raw_json)
                .map_err(|e| format!("localStorage set_item `{key}` failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, raw_json);
            Ok(())
        }
    }
}

impl PrefsStore for WebPrefsStore {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        let record = self.read(key);
        Box::pin(async move { record })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        let written = self.write(key, raw_json);
        Box::pin(async move { written })
    }
}
