//! Scripted platform fakes: tests decide exactly when events arrive and count
//! every subscribe and cancel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use backend::{
    AuthService, AuthStateListener, AuthUser, BackendError, CollectionPath, Document, DocumentId,
    DocumentStore, FederatedProvider, FieldValue, Fields, ListenerRegistration, OrderedQuery,
    SnapshotListener, Timestamp,
};

type SharedAuthListener = Arc<dyn Fn(Option<AuthUser>) + Send + Sync>;
type SharedSnapshotListener = Arc<dyn Fn(Vec<Document>) + Send + Sync>;

#[derive(Default)]
struct AuthScript {
    listeners: HashMap<u64, SharedAuthListener>,
    next_id: u64,
    subscriptions: usize,
    cancellations: usize,
    current: Option<AuthUser>,
    /// Keep delivering to cancelled listeners, like events already queued.
    retain_cancelled: bool,
}

#[derive(Default)]
pub(crate) struct ScriptedAuth {
    script: Arc<Mutex<AuthScript>>,
}

impl ScriptedAuth {
    /// An auth stream that still delivers to listeners after their removal.
    pub(crate) fn retaining() -> Self {
        let auth = Self::default();
        auth.script.lock().unwrap().retain_cancelled = true;
        auth
    }

    pub(crate) fn emit(&self, user: Option<AuthUser>) {
        let listeners: Vec<SharedAuthListener> = {
            let mut script = self.script.lock().unwrap();
            script.current = user.clone();
            script.listeners.values().cloned().collect()
        };
        for listener in listeners {
            listener(user.clone());
        }
    }

    pub(crate) fn subscriptions(&self) -> usize {
        self.script.lock().unwrap().subscriptions
    }

    pub(crate) fn cancellations(&self) -> usize {
        self.script.lock().unwrap().cancellations
    }

    pub(crate) fn active_listeners(&self) -> usize {
        self.script.lock().unwrap().listeners.len()
    }
}

fn unscripted<T>() -> Result<T, BackendError> {
    Err(BackendError::Unavailable("not scripted".into()))
}

#[async_trait]
impl AuthService for ScriptedAuth {
    async fn sign_in_with_password(&self, _: &str, _: &str) -> Result<AuthUser, BackendError> {
        unscripted()
    }

    async fn register_with_password(&self, _: &str, _: &str) -> Result<AuthUser, BackendError> {
        unscripted()
    }

    async fn sign_in_with_federated_popup(
        &self,
        _: FederatedProvider,
    ) -> Result<AuthUser, BackendError> {
        unscripted()
    }

    async fn send_password_reset(&self, _: &str) -> Result<(), BackendError> {
        unscripted()
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.emit(None);
        Ok(())
    }

    async fn update_profile(&self, _: &str, _: &str) -> Result<AuthUser, BackendError> {
        unscripted()
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.script.lock().unwrap().current.clone()
    }

    fn on_auth_state_changed(&self, listener: AuthStateListener) -> ListenerRegistration {
        let listener: SharedAuthListener = Arc::from(listener);
        let (id, current) = {
            let mut script = self.script.lock().unwrap();
            let id = script.next_id;
            script.next_id += 1;
            script.subscriptions += 1;
            script.listeners.insert(id, listener.clone());
            (id, script.current.clone())
        };
        listener(current);

        let script = self.script.clone();
        ListenerRegistration::new(move || {
            let mut script = script.lock().unwrap();
            if !script.retain_cancelled {
                script.listeners.remove(&id);
            }
            script.cancellations += 1;
        })
    }
}

#[derive(Default)]
struct StoreScript {
    listeners: HashMap<u64, (OrderedQuery, SharedSnapshotListener)>,
    next_id: u64,
    subscriptions: usize,
    cancellations: usize,
    added: Vec<(CollectionPath, Fields)>,
    /// Keep delivering to cancelled listeners, like events already queued.
    retain_cancelled: bool,
}

/// Document store whose snapshots are emitted by the test, never by writes.
#[derive(Default)]
pub(crate) struct ScriptedStore {
    script: Arc<Mutex<StoreScript>>,
}

impl ScriptedStore {
    /// A store that still delivers to listeners after their removal.
    pub(crate) fn retaining() -> Self {
        let store = Self::default();
        store.script.lock().unwrap().retain_cancelled = true;
        store
    }

    /// Deliver `documents` to every live query.
    pub(crate) fn emit(&self, documents: Vec<Document>) {
        let listeners: Vec<SharedSnapshotListener> = self
            .script
            .lock()
            .unwrap()
            .listeners
            .values()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(documents.clone());
        }
    }

    pub(crate) fn subscriptions(&self) -> usize {
        self.script.lock().unwrap().subscriptions
    }

    pub(crate) fn cancellations(&self) -> usize {
        self.script.lock().unwrap().cancellations
    }

    pub(crate) fn queries(&self) -> Vec<OrderedQuery> {
        self.script
            .lock()
            .unwrap()
            .listeners
            .values()
            .map(|(query, _)| query.clone())
            .collect()
    }

    pub(crate) fn added(&self) -> Vec<(CollectionPath, Fields)> {
        self.script.lock().unwrap().added.clone()
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn add_document(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> Result<DocumentId, BackendError> {
        self.script
            .lock()
            .unwrap()
            .added
            .push((collection.clone(), fields));
        Ok(DocumentId::generate())
    }

    fn subscribe_ordered_query(
        &self,
        query: OrderedQuery,
        on_snapshot: SnapshotListener,
    ) -> ListenerRegistration {
        let id = {
            let mut script = self.script.lock().unwrap();
            let id = script.next_id;
            script.next_id += 1;
            script.subscriptions += 1;
            script
                .listeners
                .insert(id, (query, Arc::from(on_snapshot)));
            id
        };

        let script = self.script.clone();
        ListenerRegistration::new(move || {
            let mut script = script.lock().unwrap();
            if !script.retain_cancelled {
                script.listeners.remove(&id);
            }
            script.cancellations += 1;
        })
    }
}

/// A post document with a resolved timestamp.
pub(crate) fn post_document(id: &str, millis: i64) -> Document {
    let mut fields = Fields::new();
    fields.insert("avatar".into(), "a.png".into());
    fields.insert("image".into(), "".into());
    fields.insert("text".into(), format!("post {id}").into());
    fields.insert("timestamp".into(), Timestamp::from_millis(millis).into());
    fields.insert("username".into(), "Alice".into());
    Document {
        id: DocumentId::new(id),
        fields,
    }
}

/// String value of a recorded field.
pub(crate) fn text_field<'a>(fields: &'a Fields, name: &str) -> &'a str {
    match fields.get(name) {
        Some(FieldValue::String(s)) => s,
        _ => panic!("field {name} is not a string"),
    }
}
