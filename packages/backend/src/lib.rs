//! # Backend crate: client contract for the hosted platform
//!
//! Persistence, authentication and file storage are delegated to a
//! backend-as-a-service platform. This crate describes what the application
//! consumes from that platform and nothing more.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`service`] | The three capability traits: [`AuthService`], [`DocumentStore`], [`ObjectStorage`] |
//! | [`models`] | Documents, field values, server timestamps, collection and object paths, auth users |
//! | [`registration`] | [`ListenerRegistration`], the cancellation handle returned by every live listener |
//! | [`error`] | [`BackendError`] and the platform error codes |
//! | [`config`] | [`BackendConfig`], the `[backend]` table of the application config |
//! | [`memory`] | [`MemoryBackend`], an in-process emulator implementing all three traits |

pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod registration;
pub mod service;

pub use config::BackendConfig;
pub use error::BackendError;
pub use memory::MemoryBackend;
pub use models::{
    AuthUser, CollectionPath, Direction, Document, DocumentId, FederatedProvider, FieldValue,
    Fields, ObjectPath, OrderedQuery, Timestamp, UploadProgress,
};
pub use registration::ListenerRegistration;
pub use service::{AuthService, AuthStateListener, DocumentStore, ObjectStorage, SnapshotListener};
