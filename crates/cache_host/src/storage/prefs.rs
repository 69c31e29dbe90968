//! Record store contract for the small, raw-JSON settings records kept next to the cache.
//!
//! Settings are read on startup and written when the user changes them, so the contract is
//! async to match hosts whose preference APIs are. Encoding lives with the caller; adapters only
//! move raw JSON text.

use std::{cell::RefCell, collections::BTreeMap, future::Future, pin::Pin, rc::Rc};

/// Boxed future returned by [`PrefsStore`] methods.
pub type PrefsStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Keyed store of raw JSON records.
pub trait PrefsStore {
    /// Reads the record stored under `key`, or `None` when nothing was saved yet.
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>>;

    /// Replaces the record stored under `key`.
    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Record store that keeps nothing. Loads always miss.
pub struct NoopPrefsStore;

impl PrefsStore for NoopPrefsStore {
    fn load_pref<'a>(
        &'a self,
        _key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_pref<'a>(
        &'a self,
        _key: &'a str,
        _raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// Process-local record store. Clones share the same records.
pub struct MemoryPrefsStore {
    records: Rc<RefCell<BTreeMap<String, String>>>,
}

impl PrefsStore for MemoryPrefsStore {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        let record = self.records.borrow().get(key).cloned();
        Box::pin(async move { Ok(record) })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        self.records
            .borrow_mut()
            .insert(key.to_string(), raw_json.to_string());
        Box::pin(async { Ok(()) })
    }
}
