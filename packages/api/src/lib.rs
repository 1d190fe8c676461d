//! # API crate: session, subscriptions and writes for the social feed
//!
//! Everything the views need, expressed against the `backend` capability traits
//! so the same logic runs on the hosted platform or the in-memory emulator.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`identity`] | [`Identity`], the signed-in user as the views see it |
//! | [`session`] | [`SessionStore`], the injectable holder of the current identity |
//! | [`auth_bridge`] | [`AuthBridge`], mirrors the platform's auth-state stream into the session store |
//! | [`live_query`] | [`LiveQuery`], snapshot-replace subscription with idempotent cancel |
//! | [`feed`] | [`Post`] summaries and the feed subscription |
//! | [`comments`] | [`Comment`] summaries and [`CommentSubscription`] with `submit_comment` |
//! | [`composer`] | [`Composer`] and [`PostDraft`]: optional image upload, then append |
//! | [`uploads`] | collision-free object names and the shared upload path |
//! | [`accounts`] | [`Accounts`]: sign-in, registration, federated popup, password reset, sign-out |
//! | [`router`] | [`View`] and [`route`], the identity → view decision |
//! | [`config`] | [`AppConfig`] and [`FeedPaths`] |
//! | [`services`] | [`Services`], the bundle of handles provided to the UI |
//! | [`error`] | [`ApiError`] |

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod accounts;
pub mod auth_bridge;
pub mod comments;
pub mod composer;
pub mod config;
pub mod error;
pub mod feed;
pub mod identity;
pub mod live_query;
pub mod router;
pub mod services;
pub mod session;
pub mod uploads;

#[cfg(test)]
mod testing;

pub use accounts::{Accounts, AuthMode, CredentialsForm, MIN_PASSWORD_LEN};
pub use auth_bridge::AuthBridge;
pub use comments::{Comment, CommentSubscription};
pub use composer::{Composer, ImageFile, PostDraft};
pub use config::{AppConfig, ConfigError, FeedPaths};
pub use error::ApiError;
pub use feed::{FeedSubscription, Post};
pub use identity::Identity;
pub use live_query::{FromDocument, LiveQuery};
pub use router::{route, View};
pub use services::Services;
pub use session::SessionStore;

pub use backend::{DocumentId, FederatedProvider, Timestamp, UploadProgress};

/// Lock a mutex, recovering the data if a listener panicked while it was held.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
