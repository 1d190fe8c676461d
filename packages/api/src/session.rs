//! # Session state store
//!
//! [`SessionStore`] is the only shared mutable state of the client. It is
//! constructed explicitly (initially holding the empty identity), lives for the
//! whole process and is handed to every consumer by clone. Writers are the
//! [`AuthBridge`](crate::AuthBridge) and the profile-update path of
//! registration; everything else only reads.
//!
//! Every dispatch notifies the watchers registered with [`SessionStore::watch`],
//! which is how the view router re-evaluates its branch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use backend::ListenerRegistration;

use crate::identity::Identity;
use crate::lock;

type Watcher = Arc<dyn Fn(&Identity) + Send + Sync>;

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

#[derive(Default)]
struct SessionInner {
    identity: Mutex<Identity>,
    watchers: Mutex<HashMap<u64, Watcher>>,
    next_watcher_id: AtomicU64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_identity(&self) -> Identity {
        lock(&self.inner.identity).clone()
    }

    /// Replace the identity unconditionally.
    pub fn set_identity(&self, identity: Identity) {
        self.dispatch(|current| *current = identity);
    }

    /// Reset to the empty identity.
    pub fn clear_identity(&self) {
        self.dispatch(|current| *current = Identity::empty());
    }

    /// Profile-update path: replace name and avatar, keep the uid.
    pub fn update_profile(&self, display_name: &str, photo_url: &str) {
        self.dispatch(|current| {
            current.display_name = display_name.to_string();
            current.photo_url = photo_url.to_string();
        });
    }

    /// Call `watcher` with the new identity after every dispatch.
    pub fn watch(&self, watcher: impl Fn(&Identity) + Send + Sync + 'static) -> ListenerRegistration {
        let id = self.inner.next_watcher_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.watchers).insert(id, Arc::new(watcher));

        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);
        ListenerRegistration::new(move || {
            if let Some(inner) = weak.upgrade() {
                lock(&inner.watchers).remove(&id);
            }
        })
    }

    fn dispatch(&self, update: impl FnOnce(&mut Identity)) {
        let identity = {
            let mut current = lock(&self.inner.identity);
            update(&mut current);
            current.clone()
        };
        let watchers: Vec<Watcher> = lock(&self.inner.watchers).values().cloned().collect();
        for watcher in watchers {
            watcher(&identity);
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("identity", &self.select_identity())
            .finish()
    }
}
