//! # Live query subscription
//!
//! [`LiveQuery`] owns one ordered live query. Every snapshot the platform emits
//! replaces the materialized list wholesale; nothing is patched incrementally,
//! so the list is exactly as ordered as the platform delivered it.
//!
//! ## Lifecycle
//!
//! - [`start`](LiveQuery::start) registers the query. Starting an active query
//!   is a no-op, so one activation holds one listener.
//! - [`cancel`](LiveQuery::cancel) marks the query inactive and removes the
//!   platform listener. It is idempotent; the removal runs exactly once per
//!   activation. No `on_update` call happens after `cancel` returns, even for
//!   a snapshot already in flight.
//! - Dropping the query cancels it.
//!
//! `on_update` runs while the materialized list is locked; it must not call
//! back into the same query.

use std::sync::{Arc, Mutex};

use backend::{Document, DocumentStore, ListenerRegistration, OrderedQuery};

use crate::lock;

/// Mapping from a platform document to a summary.
pub trait FromDocument: Sized {
    fn from_document(document: &Document) -> Self;
}

struct LiveState<T> {
    items: Vec<T>,
    active: bool,
    emissions: usize,
}

pub struct LiveQuery<T> {
    store: Arc<dyn DocumentStore>,
    query: OrderedQuery,
    state: Arc<Mutex<LiveState<T>>>,
    registration: Mutex<Option<ListenerRegistration>>,
}

impl<T> LiveQuery<T> {
    pub fn new(store: Arc<dyn DocumentStore>, query: OrderedQuery) -> Self {
        Self {
            store,
            query,
            state: Arc::new(Mutex::new(LiveState {
                items: Vec::new(),
                active: false,
                emissions: 0,
            })),
            registration: Mutex::new(None),
        }
    }

    pub fn query(&self) -> &OrderedQuery {
        &self.query
    }

    pub fn cancel(&self) {
        lock(&self.state).active = false;
        let registration = lock(&self.registration).take();
        if let Some(registration) = registration {
            registration.remove();
            tracing::debug!(collection = %self.query.collection, "live query cancelled");
        }
    }

    pub fn is_active(&self) -> bool {
        lock(&self.state).active
    }

    /// Snapshots applied since construction.
    pub fn emissions(&self) -> usize {
        lock(&self.state).emissions
    }
}

impl<T> LiveQuery<T>
where
    T: FromDocument + Clone + Send + 'static,
{
    pub fn start(&self, on_update: impl Fn(&[T]) + Send + Sync + 'static) {
        let mut registration = lock(&self.registration);
        if registration.is_some() {
            return;
        }
        lock(&self.state).active = true;

        let state = self.state.clone();
        let listener = move |documents: Vec<Document>| {
            let items: Vec<T> = documents.iter().map(T::from_document).collect();
            let mut state = lock(&state);
            if !state.active {
                return;
            }
            state.items = items;
            state.emissions += 1;
            on_update(&state.items);
        };

        tracing::debug!(collection = %self.query.collection, "live query started");
        *registration = Some(
            self.store
                .subscribe_ordered_query(self.query.clone(), Box::new(listener)),
        );
    }

    /// The materialized list as of the latest snapshot.
    pub fn items(&self) -> Vec<T> {
        lock(&self.state).items.clone()
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{post_document, ScriptedStore};
    use backend::CollectionPath;

    #[derive(Clone, Debug, PartialEq)]
    struct Id(String);

    impl FromDocument for Id {
        fn from_document(document: &Document) -> Self {
            Id(document.id.as_str().to_string())
        }
    }

    fn ids(items: &[Id]) -> Vec<&str> {
        items.iter().map(|id| id.0.as_str()).collect()
    }

    fn query() -> OrderedQuery {
        OrderedQuery::descending(CollectionPath::new("posts"), "timestamp")
    }

    #[test]
    fn test_snapshots_replace_the_list() {
        let store = Arc::new(ScriptedStore::default());
        let live: LiveQuery<Id> = LiveQuery::new(store.clone(), query());
        live.start(|_| {});

        store.emit(vec![post_document("a", 2), post_document("b", 1)]);
        assert_eq!(ids(&live.items()), vec!["a", "b"]);

        store.emit(vec![post_document("c", 3)]);
        assert_eq!(ids(&live.items()), vec!["c"]);
        assert_eq!(live.emissions(), 2);
    }

    #[test]
    fn test_start_is_idempotent() {
        let store = Arc::new(ScriptedStore::default());
        let live: LiveQuery<Id> = LiveQuery::new(store.clone(), query());
        live.start(|_| {});
        live.start(|_| {});
        assert_eq!(store.subscriptions(), 1);
        assert!(live.is_active());
    }

    #[test]
    fn test_cancel_once_and_no_updates_after() {
        let store = Arc::new(ScriptedStore::default());
        let live: LiveQuery<Id> = LiveQuery::new(store.clone(), query());
        let updates = Arc::new(Mutex::new(0usize));
        let counter = updates.clone();
        live.start(move |_| *counter.lock().unwrap() += 1);

        store.emit(vec![post_document("a", 1)]);
        live.cancel();
        live.cancel();
        store.emit(vec![post_document("b", 2)]);

        assert_eq!(store.cancellations(), 1);
        assert_eq!(*updates.lock().unwrap(), 1);
        assert_eq!(ids(&live.items()), vec!["a"]);
        assert!(!live.is_active());
    }

    #[test]
    fn test_in_flight_snapshot_after_cancel_is_ignored() {
        let store = Arc::new(ScriptedStore::retaining());
        let live: LiveQuery<Id> = LiveQuery::new(store.clone(), query());
        let updates = Arc::new(Mutex::new(0usize));
        let counter = updates.clone();
        live.start(move |_| *counter.lock().unwrap() += 1);

        live.cancel();
        store.emit(vec![post_document("late", 9)]);

        assert_eq!(store.cancellations(), 1);
        assert_eq!(*updates.lock().unwrap(), 0);
        assert!(live.items().is_empty());
        assert_eq!(live.emissions(), 0);
    }

    #[test]
    fn test_drop_cancels() {
        let store = Arc::new(ScriptedStore::default());
        {
            let live: LiveQuery<Id> = LiveQuery::new(store.clone(), query());
            live.start(|_| {});
        }
        assert_eq!(store.cancellations(), 1);
        assert!(store.queries().is_empty());
    }

    #[test]
    fn test_restart_after_cancel() {
        let store = Arc::new(ScriptedStore::default());
        let live: LiveQuery<Id> = LiveQuery::new(store.clone(), query());
        live.start(|_| {});
        live.cancel();
        live.start(|_| {});

        store.emit(vec![post_document("a", 1)]);
        assert_eq!(ids(&live.items()), vec!["a"]);
        assert_eq!(store.subscriptions(), 2);
        assert_eq!(store.cancellations(), 1);
    }
}
