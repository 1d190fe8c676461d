//! [`Services`]: the platform handles, the session store and the configured
//! paths, bundled so the UI can receive them through one context.

use std::sync::Arc;

use backend::{AuthService, DocumentId, DocumentStore, MemoryBackend, ObjectStorage};

use crate::accounts::Accounts;
use crate::auth_bridge::AuthBridge;
use crate::comments::CommentSubscription;
use crate::composer::Composer;
use crate::config::{AppConfig, FeedPaths};
use crate::feed::FeedSubscription;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub documents: Arc<dyn DocumentStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub session: SessionStore,
    pub paths: FeedPaths,
}

impl Services {
    pub fn new(
        auth: Arc<dyn AuthService>,
        documents: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
        paths: FeedPaths,
    ) -> Self {
        Self {
            auth,
            documents,
            storage,
            session: SessionStore::new(),
            paths,
        }
    }

    /// Services backed by a fresh in-memory emulator, which is returned too
    /// so the caller can seed it.
    pub fn in_memory(config: &AppConfig) -> (Self, MemoryBackend) {
        let backend = MemoryBackend::with_config(config.backend.clone());
        let shared = Arc::new(backend.clone());
        let services = Self::new(
            shared.clone(),
            shared.clone(),
            shared,
            config.feed.clone(),
        );
        (services, backend)
    }

    pub fn auth_bridge(&self) -> AuthBridge {
        AuthBridge::new(self.auth.clone(), self.session.clone())
    }

    pub fn feed(&self) -> FeedSubscription {
        FeedSubscription::feed(self.documents.clone(), &self.paths)
    }

    pub fn comments(&self, post_id: &DocumentId) -> CommentSubscription {
        CommentSubscription::new(
            self.documents.clone(),
            self.session.clone(),
            &self.paths,
            post_id,
        )
    }

    pub fn composer(&self) -> Composer {
        Composer::new(
            self.documents.clone(),
            self.storage.clone(),
            self.session.clone(),
            self.paths.clone(),
        )
    }

    pub fn accounts(&self) -> Accounts {
        Accounts::new(
            self.auth.clone(),
            self.storage.clone(),
            self.session.clone(),
            self.paths.clone(),
        )
    }
}
