//! Observable, write-back handles over single cache entries.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use serde::Serialize;

use crate::{binding::SnapshotBinding, config::WriteBack, error::CacheError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Identifier returned by [`CacheHandle::subscribe`].
pub struct ObserverId(u64);

type Observer<T> = Rc<dyn Fn(&T)>;

struct HandleCell<T> {
    key: String,
    value: RefCell<T>,
    binding: SnapshotBinding,
    write_back: WriteBack,
    observers: RefCell<Vec<(ObserverId, Observer<T>)>>,
    next_observer: Cell<u64>,
}

/// Mutable, observable cell wrapping one cached value.
///
/// Every local mutation is written back under the handle's key into the namespace binding that
/// was active when the handle was created, even if the cache has since switched namespaces.
/// Handles returned by separate `get` calls are independent: they are not told about each
/// other's writes or about direct [`crate::ReactiveCache::set`] calls, and the last write wins.
/// Clones of one handle share the same cell and observers.
pub struct CacheHandle<T> {
    cell: Rc<HandleCell<T>>,
}

impl<T> Clone for CacheHandle<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for CacheHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheHandle")
            .field("key", &self.cell.key)
            .field("value", &*self.cell.value.borrow())
            .field("binding", &self.cell.binding)
            .finish()
    }
}

impl<T> CacheHandle<T> {
    pub(crate) fn new(
        key: &str,
        value: T,
        binding: SnapshotBinding,
        write_back: WriteBack,
    ) -> Self {
        Self {
            cell: Rc::new(HandleCell {
                key: key.to_string(),
                value: RefCell::new(value),
                binding,
                write_back,
                observers: RefCell::new(Vec::new()),
                next_observer: Cell::new(0),
            }),
        }
    }

    /// Cache key this handle writes to.
    pub fn key(&self) -> &str {
        &self.cell.key
    }

    /// Namespace this handle writes to.
    pub fn namespace(&self) -> String {
        self.cell.binding.namespace()
    }

    /// Runs `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.value.borrow())
    }

    /// Registers `observer` to run after every local mutation of this handle.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> ObserverId {
        let id = ObserverId(self.cell.next_observer.get());
        self.cell.next_observer.set(id.0 + 1);
        self.cell
            .observers
            .borrow_mut()
            .push((id, Rc::new(observer)));
        id
    }

    /// Removes an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.cell.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    /// Persists the handle's namespace snapshot if it has unflushed writes.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::AdapterFailure`] when the store rejects the write.
    pub fn flush(&self) -> Result<(), CacheError> {
        self.cell.binding.persist()
    }
}

impl<T: Clone> CacheHandle<T> {
    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.cell.value.borrow().clone()
    }
}

impl<T: Clone + Serialize> CacheHandle<T> {
    /// Replaces the value, writes it back, and notifies observers.
    ///
    /// # Errors
    ///
    /// [`CacheError::Serialize`] leaves the handle untouched. [`CacheError::AdapterFailure`] is
    /// returned after the in-memory write and observer notification have happened; the pending
    /// write stays queued on the binding.
    pub fn set(&self, value: T) -> Result<(), CacheError> {
        let json = self.encode(&value)?;
        *self.cell.value.borrow_mut() = value;
        self.commit(json)
    }

    /// Applies `f` to a copy of the value, then stores it like [`CacheHandle::set`].
    ///
    /// `f` may read this handle or its clones; they still see the previous value.
    ///
    /// # Errors
    ///
    /// Same as [`CacheHandle::set`].
    pub fn update(&self, f: impl FnOnce(&mut T)) -> Result<(), CacheError> {
        let mut next = self.get();
        f(&mut next);
        self.set(next)
    }

    fn encode(&self, value: &T) -> Result<serde_json::Value, CacheError> {
        serde_json::to_value(value).map_err(|source| CacheError::Serialize {
            key: self.cell.key.clone(),
            source,
        })
    }

    fn commit(&self, json: serde_json::Value) -> Result<(), CacheError> {
        self.cell.binding.write_back(&self.cell.key, json);
        self.notify();
        match self.cell.write_back {
            WriteBack::Immediate => self.cell.binding.persist(),
            WriteBack::Deferred => Ok(()),
        }
    }

    fn notify(&self) {
        let observers = self
            .cell
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect::<Vec<_>>();
        if observers.is_empty() {
            return;
        }
        let current = self.get();
        for observer in observers {
            observer(&current);
        }
    }
}
