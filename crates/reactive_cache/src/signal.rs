//! Namespace switch signal: an in-order broadcast of "namespace changed" events.

use std::{cell::RefCell, rc::Rc};

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};

/// Emitter side of the namespace switch signal. Clones share the same subscriber list.
#[derive(Debug, Clone, Default)]
pub struct NamespaceSignal {
    subscribers: Rc<RefCell<Vec<UnboundedSender<String>>>>,
}

impl NamespaceSignal {
    /// Creates a signal with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber that receives every later emission, in order.
    pub fn subscribe(&self) -> NamespaceSubscription {
        let (tx, rx) = unbounded();
        self.subscribers.borrow_mut().push(tx);
        NamespaceSubscription { rx }
    }

    /// Broadcasts `namespace` to every live subscriber. Dropped subscribers are pruned.
    pub fn emit(&self, namespace: &str) {
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.unbounded_send(namespace.to_string()).is_ok());
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }
}

/// Receiving side of a [`NamespaceSignal`].
#[derive(Debug)]
pub struct NamespaceSubscription {
    rx: UnboundedReceiver<String>,
}

impl NamespaceSubscription {
    /// Drains every pending emission and returns the most recent one.
    pub fn latest(&mut self) -> Option<String> {
        let mut latest = None;
        while let Ok(namespace) = self.rx.try_recv() {
            latest = Some(namespace);
        }
        latest
    }
}
