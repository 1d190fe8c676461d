//! # In-process platform emulator
//!
//! [`MemoryBackend`] implements [`AuthService`](crate::AuthService),
//! [`DocumentStore`](crate::DocumentStore) and [`ObjectStorage`](crate::ObjectStorage)
//! entirely in memory. It backs the test suites and is the desktop fallback when
//! no hosted project is configured.
//!
//! Cloning is cheap; every clone shares the same state. Listeners are always
//! invoked after the internal lock is released, so a listener may call back into
//! the backend. Each listener receives its events one at a time and in the order
//! the state changed, even when writes race on several threads.
//!
//! | Submodule | Emulates |
//! |-----------|----------|
//! | `auth` | accounts (Argon2id password hashes), federated popup, reset outbox, auth-state stream |
//! | `documents` | collections, live ordered queries, server timestamps, latency compensation |
//! | `storage` | chunked uploads with progress, download URLs |

mod auth;
mod delivery;
mod documents;
mod storage;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::BackendConfig;

use auth::AuthState;
use documents::DocumentState;
use storage::StorageState;

/// In-memory implementation of the three platform capabilities.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    config: BackendConfig,
    auth: Mutex<AuthState>,
    documents: Mutex<DocumentState>,
    storage: Mutex<StorageState>,
    next_listener_id: AtomicU64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BackendConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                ..Inner::default()
            }),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    fn next_listener_id(&self) -> u64 {
        self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Lock a mutex, recovering the data if a listener panicked while it was held.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
