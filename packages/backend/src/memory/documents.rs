use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};

use async_trait::async_trait;

use super::delivery::Mailbox;
use super::{lock, Inner, MemoryBackend};
use crate::error::BackendError;
use crate::models::{
    CollectionPath, Direction, Document, DocumentId, FieldValue, Fields, OrderedQuery, Timestamp,
};
use crate::registration::ListenerRegistration;
use crate::service::{DocumentStore, SnapshotListener};

#[derive(Default)]
pub(super) struct DocumentState {
    collections: HashMap<CollectionPath, BTreeMap<DocumentId, Fields>>,
    listeners: HashMap<u64, QueryListener>,
    /// Last value handed out by the server clock.
    last_timestamp: Option<Timestamp>,
    /// Stamps snapshots in the order they were taken.
    sequence: u64,
}

struct QueryListener {
    query: OrderedQuery,
    mailbox: Arc<Mailbox<Vec<Document>>>,
}

type Delivery = (Arc<Mailbox<Vec<Document>>>, u64, Vec<Document>);

impl DocumentState {
    /// Strictly increasing server clock.
    fn tick(&mut self) -> Timestamp {
        let now = Timestamp::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last.next_after(),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    fn resolve_server_timestamps(&mut self, fields: &mut Fields) {
        if !fields
            .values()
            .any(|value| matches!(value, FieldValue::ServerTimestamp))
        {
            return;
        }
        let ts = self.tick();
        for value in fields.values_mut() {
            if matches!(value, FieldValue::ServerTimestamp) {
                *value = FieldValue::Timestamp(ts);
            }
        }
    }

    fn snapshot(&self, query: &OrderedQuery) -> Vec<Document> {
        let mut documents: Vec<Document> = self
            .collections
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        documents.sort_by(|a, b| {
            let ordering = sort_key(a, &query.order_by)
                .cmp(&sort_key(b, &query.order_by))
                .then_with(|| a.id.cmp(&b.id));
            match query.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
        documents
    }

    fn next_seq(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    fn deliveries(&mut self, collection: &CollectionPath) -> Vec<Delivery> {
        let seq = self.next_seq();
        self.listeners
            .values()
            .filter(|listener| &listener.query.collection == collection)
            .map(|listener| (listener.mailbox.clone(), seq, self.snapshot(&listener.query)))
            .collect()
    }
}

/// Ordering of one field value; pending server timestamps sort as the newest.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum SortKey<'a> {
    Missing,
    Text(&'a str),
    Time(Timestamp),
    Pending,
}

fn sort_key<'a>(document: &'a Document, field: &str) -> SortKey<'a> {
    match document.fields.get(field) {
        None | Some(FieldValue::Null) => SortKey::Missing,
        Some(FieldValue::String(s)) => SortKey::Text(s),
        Some(FieldValue::Timestamp(ts)) => SortKey::Time(*ts),
        Some(FieldValue::ServerTimestamp) => SortKey::Pending,
    }
}

impl MemoryBackend {
    /// Write a document with a known id, bypassing the application path.
    ///
    /// Server timestamps in `fields` are resolved immediately.
    pub fn put_document(&self, collection: &CollectionPath, id: DocumentId, mut fields: Fields) {
        {
            let mut state = lock(&self.inner.documents);
            state.resolve_server_timestamps(&mut fields);
            state
                .collections
                .entry(collection.clone())
                .or_default()
                .insert(id, fields);
        }
        self.notify(collection);
    }

    /// Administrative delete; returns whether the document existed.
    pub fn delete_document(&self, collection: &CollectionPath, id: &DocumentId) -> bool {
        let removed = lock(&self.inner.documents)
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            self.notify(collection);
        }
        removed
    }

    /// Stored fields of one document.
    pub fn get_document(&self, collection: &CollectionPath, id: &DocumentId) -> Option<Fields> {
        lock(&self.inner.documents)
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    /// Current ordered result of `query`, as a listener would receive it.
    pub fn query(&self, query: &OrderedQuery) -> Vec<Document> {
        lock(&self.inner.documents).snapshot(query)
    }

    /// Number of live queries attached to `collection`.
    pub fn listener_count(&self, collection: &CollectionPath) -> usize {
        lock(&self.inner.documents)
            .listeners
            .values()
            .filter(|listener| &listener.query.collection == collection)
            .count()
    }

    fn notify(&self, collection: &CollectionPath) {
        let deliveries = lock(&self.inner.documents).deliveries(collection);
        for (mailbox, seq, documents) in deliveries {
            mailbox.post(seq, documents);
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn add_document(
        &self,
        collection: &CollectionPath,
        mut fields: Fields,
    ) -> Result<DocumentId, BackendError> {
        let id = DocumentId::generate();
        let pending = fields
            .values()
            .any(|value| matches!(value, FieldValue::ServerTimestamp));

        if pending && self.inner.config.documents.latency_compensation {
            lock(&self.inner.documents)
                .collections
                .entry(collection.clone())
                .or_default()
                .insert(id.clone(), fields);
            self.notify(collection);

            let mut state = lock(&self.inner.documents);
            let ts = state.tick();
            if let Some(stored) = state
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(&id))
            {
                for value in stored.values_mut() {
                    if matches!(value, FieldValue::ServerTimestamp) {
                        *value = FieldValue::Timestamp(ts);
                    }
                }
            }
        } else {
            let mut state = lock(&self.inner.documents);
            state.resolve_server_timestamps(&mut fields);
            state
                .collections
                .entry(collection.clone())
                .or_default()
                .insert(id.clone(), fields);
        }
        self.notify(collection);

        tracing::debug!(collection = %collection, id = %id, "document added");
        Ok(id)
    }

    fn subscribe_ordered_query(
        &self,
        query: OrderedQuery,
        on_snapshot: SnapshotListener,
    ) -> ListenerRegistration {
        let id = self.next_listener_id();
        let mailbox: Arc<Mailbox<Vec<Document>>> = Mailbox::new(Arc::from(on_snapshot));
        let (seq, initial) = {
            let mut state = lock(&self.inner.documents);
            let seq = state.next_seq();
            let initial = state.snapshot(&query);
            tracing::debug!(collection = %query.collection, listener = id, "live query attached");
            state.listeners.insert(
                id,
                QueryListener {
                    query,
                    mailbox: mailbox.clone(),
                },
            );
            (seq, initial)
        };
        mailbox.post(seq, initial);

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        ListenerRegistration::new(move || {
            if let Some(inner) = weak.upgrade() {
                if lock(&inner.documents).listeners.remove(&id).is_some() {
                    tracing::debug!(listener = id, "live query detached");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use std::sync::Mutex;

    fn is_descending(documents: &[Document], field: &str) -> bool {
        documents.windows(2).all(|pair| {
            match (pair[0].get_timestamp(field), pair[1].get_timestamp(field)) {
                (Some(a), Some(b)) => a >= b,
                _ => true,
            }
        })
    }

    fn posts() -> CollectionPath {
        CollectionPath::new("posts")
    }

    fn fields_at(text: &str, millis: i64) -> Fields {
        let mut fields = Fields::new();
        fields.insert("text".into(), text.into());
        fields.insert("timestamp".into(), Timestamp::from_millis(millis).into());
        fields
    }

    fn pending(text: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("text".into(), text.into());
        fields.insert("timestamp".into(), FieldValue::ServerTimestamp);
        fields
    }

    fn recorder() -> (Arc<Mutex<Vec<Vec<Document>>>>, SnapshotListener) {
        let snapshots = Arc::new(Mutex::new(Vec::new()));
        let sink = snapshots.clone();
        let listener: SnapshotListener = Box::new(move |docs| sink.lock().unwrap().push(docs));
        (snapshots, listener)
    }

    #[tokio::test]
    async fn test_subscription_emits_initial_snapshot() {
        let backend = MemoryBackend::new();
        backend.put_document(&posts(), DocumentId::new("a"), fields_at("a", 100));

        let (snapshots, listener) = recorder();
        let _registration =
            backend.subscribe_ordered_query(OrderedQuery::descending(posts(), "timestamp"), listener);

        let snapshots = snapshots.lock().unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0][0].id, DocumentId::new("a"));
    }

    #[tokio::test]
    async fn test_descending_order() {
        let backend = MemoryBackend::new();
        backend.put_document(&posts(), DocumentId::new("b"), fields_at("b", 200));
        backend.put_document(&posts(), DocumentId::new("a"), fields_at("a", 100));
        backend.put_document(&posts(), DocumentId::new("c"), fields_at("c", 300));

        let docs = backend.query(&OrderedQuery::descending(posts(), "timestamp"));
        let order: Vec<&str> = docs.iter().map(|d| d.get_str("text")).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
        assert!(is_descending(&docs, "timestamp"));
    }

    #[tokio::test]
    async fn test_add_emits_pending_then_resolved() {
        let backend = MemoryBackend::new();
        backend.put_document(&posts(), DocumentId::new("old"), fields_at("old", 100));
        let (snapshots, listener) = recorder();
        let _registration =
            backend.subscribe_ordered_query(OrderedQuery::descending(posts(), "timestamp"), listener);

        let id = backend.add_document(&posts(), pending("new")).await.unwrap();

        let snapshots = snapshots.lock().unwrap();
        assert_eq!(snapshots.len(), 3);
        let pending_view = &snapshots[1];
        assert_eq!(pending_view[0].id, id);
        assert!(pending_view[0].get_timestamp("timestamp").is_none());

        let resolved = &snapshots[2];
        assert_eq!(resolved[0].id, id);
        assert!(resolved[0].get_timestamp("timestamp").is_some());
        assert!(is_descending(resolved, "timestamp"));
    }

    #[tokio::test]
    async fn test_add_without_latency_compensation_emits_once() {
        let backend =
            MemoryBackend::with_config(BackendConfig::default().with_latency_compensation(false));
        let (snapshots, listener) = recorder();
        let _registration =
            backend.subscribe_ordered_query(OrderedQuery::descending(posts(), "timestamp"), listener);

        backend.add_document(&posts(), pending("x")).await.unwrap();

        let snapshots = snapshots.lock().unwrap();
        assert_eq!(snapshots.len(), 2);
        assert!(!snapshots[1][0].has_pending_writes());
    }

    #[tokio::test]
    async fn test_server_clock_is_strictly_increasing() {
        let backend = MemoryBackend::new();
        let first = backend.add_document(&posts(), pending("1")).await.unwrap();
        let second = backend.add_document(&posts(), pending("2")).await.unwrap();

        let ts = |id: &DocumentId| match backend.get_document(&posts(), id).unwrap()["timestamp"] {
            FieldValue::Timestamp(ts) => ts,
            _ => panic!("timestamp not resolved"),
        };
        assert!(ts(&second) > ts(&first));
    }

    #[tokio::test]
    async fn test_removed_listener_gets_nothing() {
        let backend = MemoryBackend::new();
        let (snapshots, listener) = recorder();
        let registration =
            backend.subscribe_ordered_query(OrderedQuery::descending(posts(), "timestamp"), listener);
        assert_eq!(backend.listener_count(&posts()), 1);

        registration.remove();
        assert_eq!(backend.listener_count(&posts()), 0);

        backend.add_document(&posts(), pending("late")).await.unwrap();
        assert_eq!(snapshots.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sub_collections_are_isolated() {
        let backend = MemoryBackend::new();
        let comments = posts().child(&DocumentId::new("p1"), "comments");
        let other = posts().child(&DocumentId::new("p2"), "comments");
        let (snapshots, listener) = recorder();
        let _registration =
            backend.subscribe_ordered_query(OrderedQuery::descending(comments.clone(), "timestamp"), listener);

        backend.add_document(&other, pending("elsewhere")).await.unwrap();
        assert_eq!(snapshots.lock().unwrap().len(), 1);

        backend.add_document(&comments, pending("here")).await.unwrap();
        let snapshots = snapshots.lock().unwrap();
        assert_eq!(snapshots.last().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_document_notifies() {
        let backend = MemoryBackend::new();
        backend.put_document(&posts(), DocumentId::new("a"), fields_at("a", 100));
        let (snapshots, listener) = recorder();
        let _registration =
            backend.subscribe_ordered_query(OrderedQuery::descending(posts(), "timestamp"), listener);

        assert!(backend.delete_document(&posts(), &DocumentId::new("a")));
        assert!(!backend.delete_document(&posts(), &DocumentId::new("a")));
        let snapshots = snapshots.lock().unwrap();
        assert_eq!(snapshots.len(), 2);
        assert!(snapshots[1].is_empty());
    }

    #[test]
    fn test_concurrent_writers_deliver_in_order() {
        use std::sync::mpsc;
        use std::thread;

        let backend = MemoryBackend::new();
        let (reached_tx, reached_rx) = mpsc::channel::<()>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let reached_tx = Mutex::new(reached_tx);
        let release_rx = Mutex::new(release_rx);
        let sizes = Arc::new(Mutex::new(Vec::new()));
        let sink = sizes.clone();

        // Stall the one-document snapshot until the second write has happened.
        let listener: SnapshotListener = Box::new(move |docs: Vec<Document>| {
            if docs.len() == 1 {
                reached_tx.lock().unwrap().send(()).unwrap();
                release_rx.lock().unwrap().recv().unwrap();
            }
            sink.lock().unwrap().push(docs.len());
        });
        let _registration =
            backend.subscribe_ordered_query(OrderedQuery::descending(posts(), "timestamp"), listener);

        let writer = {
            let backend = backend.clone();
            thread::spawn(move || {
                backend.put_document(&posts(), DocumentId::new("a"), fields_at("a", 100));
            })
        };
        reached_rx.recv().unwrap();
        backend.put_document(&posts(), DocumentId::new("b"), fields_at("b", 200));
        release_tx.send(()).unwrap();
        writer.join().unwrap();

        assert_eq!(*sizes.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(backend.query(&OrderedQuery::descending(posts(), "timestamp")).len(), 2);
    }

    #[test]
    fn test_listener_may_write_back() {
        let backend = MemoryBackend::new();
        let sizes = Arc::new(Mutex::new(Vec::new()));
        let sink = sizes.clone();
        let writer = backend.clone();

        let listener: SnapshotListener = Box::new(move |docs: Vec<Document>| {
            sink.lock().unwrap().push(docs.len());
            if docs.len() == 1 {
                writer.put_document(&posts(), DocumentId::new("echo"), fields_at("echo", 200));
            }
        });
        let registration =
            backend.subscribe_ordered_query(OrderedQuery::descending(posts(), "timestamp"), listener);

        backend.put_document(&posts(), DocumentId::new("a"), fields_at("a", 100));
        assert_eq!(*sizes.lock().unwrap(), vec![0, 1, 2]);
        registration.remove();
    }
}
