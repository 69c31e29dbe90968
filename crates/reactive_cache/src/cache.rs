//! The reactive cache service: compute-on-miss reads, direct writes, and namespace rebinding.

use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use cache_host::{normalize_namespace, SnapshotStore};
use leptos::logging;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    binding::{SnapshotBinding, WeakSnapshotBinding},
    config::{CacheConfig, WriteBack},
    error::CacheError,
    handle::CacheHandle,
    host_adapters,
    signal::NamespaceSubscription,
};

struct CacheState {
    store: Rc<dyn SnapshotStore>,
    write_back: WriteBack,
    current: SnapshotBinding,
    /// Live bindings by namespace, so a namespace is never loaded twice while handles hold it.
    bindings: HashMap<String, WeakSnapshotBinding>,
    /// Bindings left behind by a switch whose flush failed; retried by `flush`.
    unflushed: Vec<SnapshotBinding>,
    signal: Option<NamespaceSubscription>,
    pending_namespace: Option<String>,
}

impl CacheState {
    fn bind(&mut self, namespace: &str) -> Result<SnapshotBinding, CacheError> {
        if let Some(live) = self.bindings.get(namespace).and_then(|weak| weak.upgrade()) {
            return Ok(live);
        }
        let binding = SnapshotBinding::bind(Rc::clone(&self.store), namespace)?;
        self.bindings.retain(|_, weak| weak.upgrade().is_some());
        self.bindings
            .insert(namespace.to_string(), binding.downgrade());
        Ok(binding)
    }
}

/// Namespace-scoped key/value cache handing out typed, write-back [`CacheHandle`]s.
///
/// Construct one per process and pass it by reference (or clone it; clones share state). All
/// operations run synchronously on the calling thread.
#[derive(Clone)]
pub struct ReactiveCache {
    state: Rc<RefCell<CacheState>>,
}

impl fmt::Debug for ReactiveCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ReactiveCache")
            .field("current", &state.current)
            .field("write_back", &state.write_back)
            .field("pending_namespace", &state.pending_namespace)
            .finish()
    }
}

impl ReactiveCache {
    /// Binds `config.namespace` on `store`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::AdapterFailure`] when the initial snapshot cannot be loaded.
    pub fn new(store: Rc<dyn SnapshotStore>, config: &CacheConfig) -> Result<Self, CacheError> {
        let namespace = normalize_namespace(&config.namespace);
        let current = SnapshotBinding::bind(Rc::clone(&store), &namespace)?;
        let mut bindings = HashMap::new();
        bindings.insert(namespace, current.downgrade());
        Ok(Self {
            state: Rc::new(RefCell::new(CacheState {
                store,
                write_back: config.write_back,
                current,
                bindings,
                unflushed: Vec::new(),
                signal: None,
                pending_namespace: None,
            })),
        })
    }

    /// Binds `namespace` on `store` with immediate write-back.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::AdapterFailure`] when the initial snapshot cannot be loaded.
    pub fn open(store: impl SnapshotStore + 'static, namespace: &str) -> Result<Self, CacheError> {
        let config = CacheConfig {
            namespace: namespace.to_string(),
            ..CacheConfig::default()
        };
        Self::new(Rc::new(store), &config)
    }

    /// Builds the host-selected store for `config` and binds its namespace.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::AdapterFailure`] when the store cannot be created or loaded.
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        let store = host_adapters::snapshot_store(config)
            .map_err(|err| CacheError::adapter(&normalize_namespace(&config.namespace), err))?;
        Self::new(Rc::new(store), config)
    }

    /// Follows namespace switches published on `subscription`.
    ///
    /// Pending switches are applied at the start of every cache operation, or on demand through
    /// [`ReactiveCache::sync_namespace`].
    pub fn attach_signal(&self, subscription: NamespaceSubscription) {
        self.state.borrow_mut().signal = Some(subscription);
    }

    /// Namespace currently bound. Does not apply pending signals.
    pub fn namespace(&self) -> String {
        self.state.borrow().current.namespace()
    }

    /// Write-back policy applied to new handles and direct sets.
    pub fn write_back(&self) -> WriteBack {
        self.state.borrow().write_back
    }

    /// Applies the most recent pending namespace signal, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::AdapterFailure`] when the new namespace cannot be loaded. The cache
    /// stays on its current namespace and retries the switch on the next operation.
    pub fn sync_namespace(&self) -> Result<(), CacheError> {
        let pending = {
            let mut state = self.state.borrow_mut();
            if let Some(latest) = state.signal.as_mut().and_then(NamespaceSubscription::latest) {
                state.pending_namespace = Some(latest);
            }
            state.pending_namespace.clone()
        };
        let Some(namespace) = pending else {
            return Ok(());
        };
        self.switch_namespace(&namespace).map_err(|err| {
            logging::warn!("cache rebind to namespace `{namespace}` failed: {err}");
            err
        })
    }

    /// Rebinds the cache to `namespace`.
    ///
    /// Later `get`/`set` calls use the new namespace; handles created earlier keep writing to
    /// the namespace they came from. Data is never copied between namespaces. Switching to the
    /// namespace already bound is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::AdapterFailure`] when the new snapshot cannot be loaded; the cache
    /// stays bound to the previous namespace.
    pub fn switch_namespace(&self, namespace: &str) -> Result<(), CacheError> {
        let namespace = normalize_namespace(namespace);
        let mut state = self.state.borrow_mut();
        if state.current.namespace() == namespace {
            state.pending_namespace = None;
            return Ok(());
        }

        let next = state.bind(&namespace)?;
        let previous = std::mem::replace(&mut state.current, next);
        state.pending_namespace = None;
        if let Err(err) = previous.persist() {
            logging::warn!("cache flush on namespace switch failed: {err}");
            state.unflushed.push(previous);
        }
        logging::log!("cache bound to namespace `{namespace}`");
        Ok(())
    }

    /// Returns a handle for the value cached under `key`.
    ///
    /// The stored JSON is decoded into `T`; no fallback is run.
    ///
    /// # Errors
    ///
    /// [`CacheError::NotCached`] when `key` is absent (the snapshot is not touched),
    /// [`CacheError::Decode`] when the stored value does not fit `T`, plus the errors of
    /// [`ReactiveCache::sync_namespace`].
    pub fn get<T>(&self, key: &str) -> Result<CacheHandle<T>, CacheError>
    where
        T: Clone + Serialize + DeserializeOwned,
    {
        self.fetch(key, None::<fn() -> T>)
    }

    /// Returns a handle for `key`, seeding a missing entry from `fallback`.
    ///
    /// `fallback` runs at most once, and only when `key` is absent. Its result is stored and
    /// persisted according to the write-back policy before the handle is returned.
    ///
    /// # Errors
    ///
    /// [`CacheError::Serialize`] when the fallback value cannot be encoded,
    /// [`CacheError::AdapterFailure`] when immediate persistence fails (the value stays cached
    /// in memory and is retried later), plus the errors of [`ReactiveCache::get`].
    pub fn get_or_insert_with<T, F>(
        &self,
        key: &str,
        fallback: F,
    ) -> Result<CacheHandle<T>, CacheError>
    where
        T: Clone + Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        self.fetch(key, Some(fallback))
    }

    /// Type-erased [`ReactiveCache::get`].
    ///
    /// # Errors
    ///
    /// Same as [`ReactiveCache::get`], without decode failures.
    pub fn get_value(&self, key: &str) -> Result<CacheHandle<Value>, CacheError> {
        self.get(key)
    }

    /// Type-erased [`ReactiveCache::get_or_insert_with`].
    ///
    /// # Errors
    ///
    /// Same as [`ReactiveCache::get_or_insert_with`].
    pub fn get_value_or_insert_with(
        &self,
        key: &str,
        fallback: impl FnOnce() -> Value,
    ) -> Result<CacheHandle<Value>, CacheError> {
        self.get_or_insert_with(key, fallback)
    }

    /// Overwrites `key` in the bound namespace without creating a handle.
    ///
    /// Existing handles for `key` are not notified and may overwrite this value with their next
    /// mutation.
    ///
    /// # Errors
    ///
    /// [`CacheError::EmptyKey`], [`CacheError::Serialize`], or [`CacheError::AdapterFailure`]
    /// when immediate persistence fails (the value stays cached in memory).
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        validate_key(key)?;
        self.sync_namespace()?;
        let json = serde_json::to_value(value).map_err(|source| CacheError::Serialize {
            key: key.to_string(),
            source,
        })?;
        let (binding, write_back) = self.current();
        binding.write_back(key, json);
        match write_back {
            WriteBack::Immediate => binding.persist(),
            WriteBack::Deferred => Ok(()),
        }
    }

    /// Returns `true` when `key` is cached in the bound namespace. A cached `null` counts.
    ///
    /// # Errors
    ///
    /// Same as [`ReactiveCache::sync_namespace`].
    pub fn contains(&self, key: &str) -> Result<bool, CacheError> {
        self.sync_namespace()?;
        Ok(self.current().0.contains(key))
    }

    /// Sorted keys cached in the bound namespace.
    ///
    /// # Errors
    ///
    /// Same as [`ReactiveCache::sync_namespace`].
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.sync_namespace()?;
        Ok(self.current().0.keys())
    }

    /// Namespaces that have a persisted snapshot in the store.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::AdapterFailure`] when the store cannot list namespaces.
    pub fn namespaces(&self) -> Result<Vec<String>, CacheError> {
        let state = self.state.borrow();
        state
            .store
            .list_namespaces()
            .map_err(|err| CacheError::adapter(&state.current.namespace(), err))
    }

    /// Persists every binding with unflushed writes: the current one, plus any left behind by a
    /// namespace switch whose flush failed.
    ///
    /// # Errors
    ///
    /// Returns the first [`CacheError::AdapterFailure`]; bindings that failed stay queued.
    pub fn flush(&self) -> Result<(), CacheError> {
        let (current, unflushed) = {
            let mut state = self.state.borrow_mut();
            (state.current.clone(), std::mem::take(&mut state.unflushed))
        };

        let mut first_err = current.persist().err();
        let mut retained = Vec::new();
        for binding in unflushed {
            if let Err(err) = binding.persist() {
                first_err.get_or_insert(err);
                retained.push(binding);
            }
        }
        self.state.borrow_mut().unflushed.extend(retained);

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn current(&self) -> (SnapshotBinding, WriteBack) {
        let state = self.state.borrow();
        (state.current.clone(), state.write_back)
    }

    fn fetch<T, F>(&self, key: &str, fallback: Option<F>) -> Result<CacheHandle<T>, CacheError>
    where
        T: Clone + Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        validate_key(key)?;
        self.sync_namespace()?;
        let (binding, write_back) = self.current();

        if let Some(stored) = binding.read(key) {
            let value = serde_json::from_value(stored).map_err(|source| CacheError::Decode {
                key: key.to_string(),
                source,
            })?;
            return Ok(CacheHandle::new(key, value, binding, write_back));
        }

        let Some(fallback) = fallback else {
            return Err(CacheError::NotCached {
                key: key.to_string(),
            });
        };
        let value = fallback();
        let json = serde_json::to_value(&value).map_err(|source| CacheError::Serialize {
            key: key.to_string(),
            source,
        })?;
        binding.write_back(key, json);
        if write_back == WriteBack::Immediate {
            binding.persist()?;
        }
        Ok(CacheHandle::new(key, value, binding, write_back))
    }
}

fn validate_key(key: &str) -> Result<(), CacheError> {
    if key.is_empty() {
        Err(CacheError::EmptyKey)
    } else {
        Ok(())
    }
}
