//! Subscription registry: event kind → ordered handler list, plus the two
//! connection-level lifecycle slots.
//!
//! The receive loop reads the registry while the owning application may keep
//! registering; dispatch snapshots the handler list under the read lock and
//! invokes outside it, so a registration racing a frame can neither lose nor
//! duplicate a notification for that frame.

use robot_event::{Envelope, EventKind};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Per-kind subscriber callback. Invoked synchronously on the receive loop.
pub type Handler = Arc<dyn Fn(&Envelope) + Send + Sync>;

/// Connection lifecycle callback (connected / disconnected).
pub type LifecycleHandler = Arc<dyn Fn() + Send + Sync>;

/// Opaque handle returned by [`SubscriptionRegistry::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct SubscriptionRegistry {
    next_id: AtomicU64,
    handlers: RwLock<HashMap<EventKind, Vec<(SubscriptionId, Handler)>>>,
    on_connected: RwLock<Vec<LifecycleHandler>>,
    on_disconnected: RwLock<Vec<LifecycleHandler>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a subscriber for `kind`. Never displaces an existing one;
    /// all subscribers of a kind are invoked in registration order.
    pub fn subscribe(&self, kind: EventKind, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .expect("registry lock poisoned")
            .entry(kind)
            .or_default()
            .push((id, handler));
        id
    }

    /// Removes one subscriber by handle. Returns false if already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut map = self.handlers.write().expect("registry lock poisoned");
        for list in map.values_mut() {
            if let Some(pos) = list.iter().position(|(sid, _)| *sid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn on_connected(&self, handler: LifecycleHandler) {
        self.on_connected
            .write()
            .expect("registry lock poisoned")
            .push(handler);
    }

    pub fn on_disconnected(&self, handler: LifecycleHandler) {
        self.on_disconnected
            .write()
            .expect("registry lock poisoned")
            .push(handler);
    }

    /// Invokes every subscriber registered for `kind`, in registration order.
    ///
    /// Unknown frames match no entry; the caller drops them after logging.
    /// The snapshot is one `Vec` of `Arc` clones per frame, bounded by the
    /// subscriber count (status is the per-tick hot path).
    pub fn dispatch(&self, kind: EventKind, envelope: &Envelope) {
        if kind == EventKind::Unknown {
            return;
        }
        let snapshot: Vec<Handler> = {
            let map = self.handlers.read().expect("registry lock poisoned");
            match map.get(&kind) {
                Some(list) => list.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => return,
            }
        };
        for handler in snapshot {
            handler(envelope);
        }
    }

    pub fn notify_connected(&self) {
        let snapshot: Vec<LifecycleHandler> = self
            .on_connected
            .read()
            .expect("registry lock poisoned")
            .iter()
            .map(Arc::clone)
            .collect();
        for handler in snapshot {
            handler();
        }
    }

    pub fn notify_disconnected(&self) {
        let snapshot: Vec<LifecycleHandler> = self
            .on_disconnected
            .read()
            .expect("registry lock poisoned")
            .iter()
            .map(Arc::clone)
            .collect();
        for handler in snapshot {
            handler();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn status_envelope() -> Envelope {
        Envelope::decode(r#"{"type":"status"}"#).unwrap()
    }

    #[test]
    fn dispatch_invokes_subscribers_in_registration_order() {
        let registry = SubscriptionRegistry::new();
        let seen: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        registry.subscribe(
            EventKind::Status,
            Arc::new(move |_| first.lock().unwrap().push("first")),
        );
        let second = Arc::clone(&seen);
        registry.subscribe(
            EventKind::Status,
            Arc::new(move |_| second.lock().unwrap().push("second")),
        );

        registry.dispatch(EventKind::Status, &status_envelope());
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn dispatch_only_reaches_matching_kind() {
        let registry = SubscriptionRegistry::new();
        let status_hits = Arc::new(Mutex::new(0));
        let error_hits = Arc::new(Mutex::new(0));

        let s = Arc::clone(&status_hits);
        registry.subscribe(EventKind::Status, Arc::new(move |_| *s.lock().unwrap() += 1));
        let e = Arc::clone(&error_hits);
        registry.subscribe(EventKind::Error, Arc::new(move |_| *e.lock().unwrap() += 1));

        registry.dispatch(EventKind::Status, &status_envelope());
        assert_eq!(*status_hits.lock().unwrap(), 1);
        assert_eq!(*error_hits.lock().unwrap(), 0);
    }

    #[test]
    fn unknown_kind_is_never_dispatched() {
        let registry = SubscriptionRegistry::new();
        let hits = Arc::new(Mutex::new(0));
        let h = Arc::clone(&hits);
        registry.subscribe(EventKind::Unknown, Arc::new(move |_| *h.lock().unwrap() += 1));

        registry.dispatch(EventKind::Unknown, &status_envelope());
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[test]
    fn unsubscribe_removes_only_the_given_handle() {
        let registry = SubscriptionRegistry::new();
        let hits = Arc::new(Mutex::new(0));

        let a = Arc::clone(&hits);
        let id = registry.subscribe(EventKind::Status, Arc::new(move |_| *a.lock().unwrap() += 1));
        let b = Arc::clone(&hits);
        registry.subscribe(EventKind::Status, Arc::new(move |_| *b.lock().unwrap() += 10));

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));

        registry.dispatch(EventKind::Status, &status_envelope());
        assert_eq!(*hits.lock().unwrap(), 10);
    }

    #[test]
    fn lifecycle_slots_invoke_all_handlers() {
        let registry = SubscriptionRegistry::new();
        let count = Arc::new(Mutex::new(0));

        let a = Arc::clone(&count);
        registry.on_connected(Arc::new(move || *a.lock().unwrap() += 1));
        let b = Arc::clone(&count);
        registry.on_connected(Arc::new(move || *b.lock().unwrap() += 1));

        registry.notify_connected();
        assert_eq!(*count.lock().unwrap(), 2);
    }
}
