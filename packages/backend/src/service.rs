//! # Capability traits
//!
//! The application talks to the platform only through these three traits. All
//! of them are object safe so the UI can hold `Arc<dyn …>` handles in context,
//! and `Send + Sync` so listeners may be invoked from whatever task delivers
//! the platform's events.
//!
//! | Trait | Operations |
//! |-------|------------|
//! | [`AuthService`] | password sign-in and registration, federated popup, password reset, sign-out, profile update, auth-state stream |
//! | [`DocumentStore`] | append a document, subscribe to an ordered live query |
//! | [`ObjectStorage`] | resumable upload with progress, public URL lookup |

use async_trait::async_trait;

use crate::error::BackendError;
use crate::models::{
    AuthUser, CollectionPath, Document, DocumentId, FederatedProvider, Fields, ObjectPath,
    OrderedQuery, UploadProgress,
};
use crate::registration::ListenerRegistration;

/// Receives the signed-in user, or `None` after sign-out.
pub type AuthStateListener = Box<dyn Fn(Option<AuthUser>) + Send + Sync>;

/// Receives the complete, ordered result set of a live query.
pub type SnapshotListener = Box<dyn Fn(Vec<Document>) + Send + Sync>;

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, BackendError>;

    async fn register_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, BackendError>;

    async fn sign_in_with_federated_popup(
        &self,
        provider: FederatedProvider,
    ) -> Result<AuthUser, BackendError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Update the signed-in user's profile. Does not emit on the auth-state stream.
    async fn update_profile(
        &self,
        display_name: &str,
        photo_url: &str,
    ) -> Result<AuthUser, BackendError>;

    fn current_user(&self) -> Option<AuthUser>;

    /// Emits the current state immediately, then on every sign-in and sign-out.
    fn on_auth_state_changed(&self, listener: AuthStateListener) -> ListenerRegistration;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append a document; the platform assigns the id and resolves server timestamps.
    async fn add_document(
        &self,
        collection: &CollectionPath,
        fields: Fields,
    ) -> Result<DocumentId, BackendError>;

    /// Emits the current result set immediately, then after every change to the collection.
    fn subscribe_ordered_query(
        &self,
        query: OrderedQuery,
        on_snapshot: SnapshotListener,
    ) -> ListenerRegistration;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload `bytes` to `path`, reporting progress per transferred chunk.
    async fn upload_file(
        &self,
        path: &ObjectPath,
        bytes: Vec<u8>,
        on_progress: &(dyn Fn(UploadProgress) + Send + Sync),
    ) -> Result<(), BackendError>;

    async fn get_public_url(&self, path: &ObjectPath) -> Result<String, BackendError>;
}
