//! Shared in-memory view of one namespace snapshot, written back to a [`SnapshotStore`].

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use cache_host::{Snapshot, SnapshotStore};
use leptos::logging;
use serde_json::Value;

use crate::error::CacheError;

struct BindingState {
    namespace: String,
    entries: Snapshot,
    dirty: bool,
    store: Rc<dyn SnapshotStore>,
}

impl Drop for BindingState {
    fn drop(&mut self) {
        if !self.dirty {
            return;
        }
        if let Err(err) = self.store.persist_snapshot(&self.namespace, &self.entries) {
            logging::warn!(
                "cache flush for namespace `{}` failed on release: {err}",
                self.namespace
            );
        }
    }
}

/// Live binding of one namespace: the loaded snapshot plus the store it persists to.
///
/// Clones share state. The last clone to drop persists any writes still pending.
#[derive(Clone)]
pub struct SnapshotBinding {
    inner: Rc<RefCell<BindingState>>,
}

impl fmt::Debug for SnapshotBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("SnapshotBinding")
            .field("namespace", &state.namespace)
            .field("entries", &state.entries.len())
            .field("dirty", &state.dirty)
            .finish()
    }
}

impl SnapshotBinding {
    /// Loads `namespace` from `store` into a fresh binding.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::AdapterFailure`] when the store cannot load the snapshot.
    pub fn bind(store: Rc<dyn SnapshotStore>, namespace: &str) -> Result<Self, CacheError> {
        let entries = store
            .load_snapshot(namespace)
            .map_err(|err| CacheError::adapter(namespace, err))?;
        Ok(Self {
            inner: Rc::new(RefCell::new(BindingState {
                namespace: namespace.to_string(),
                entries,
                dirty: false,
                store,
            })),
        })
    }

    /// Namespace this binding reads from and writes to.
    pub fn namespace(&self) -> String {
        self.inner.borrow().namespace.clone()
    }

    /// Returns the stored value for `key`, if present. A stored `null` is `Some(Value::Null)`.
    pub fn read(&self, key: &str) -> Option<Value> {
        self.inner.borrow().entries.get(key).cloned()
    }

    /// Returns `true` if `key` has a stored value.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.borrow().entries.contains_key(key)
    }

    /// Sorted keys currently held by the snapshot.
    pub fn keys(&self) -> Vec<String> {
        self.inner.borrow().entries.keys().cloned().collect()
    }

    /// Copy of the in-memory snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.borrow().entries.clone()
    }

    /// Stores `value` under `key` in memory and marks the snapshot dirty.
    pub fn write_back(&self, key: &str, value: Value) {
        let mut state = self.inner.borrow_mut();
        state.entries.insert(key.to_string(), value);
        state.dirty = true;
    }

    /// Returns `true` when in-memory writes have not reached the store yet.
    pub fn is_dirty(&self) -> bool {
        self.inner.borrow().dirty
    }

    /// Persists the snapshot if dirty.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::AdapterFailure`] when the store rejects the write. The binding stays
    /// dirty so a later persist retries.
    pub fn persist(&self) -> Result<(), CacheError> {
        let result = {
            let state = self.inner.borrow();
            if !state.dirty {
                return Ok(());
            }
            state
                .store
                .persist_snapshot(&state.namespace, &state.entries)
                .map_err(|err| CacheError::adapter(&state.namespace, err))
        };
        if result.is_ok() {
            self.inner.borrow_mut().dirty = false;
        }
        result
    }

    /// Returns `true` when both values refer to the same binding.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> WeakSnapshotBinding {
        WeakSnapshotBinding {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Non-owning reference to a [`SnapshotBinding`], used to reuse live bindings on rebind.
#[derive(Clone)]
pub(crate) struct WeakSnapshotBinding {
    inner: Weak<RefCell<BindingState>>,
}

impl WeakSnapshotBinding {
    pub(crate) fn upgrade(&self) -> Option<SnapshotBinding> {
        self.inner.upgrade().map(|inner| SnapshotBinding { inner })
    }
}
