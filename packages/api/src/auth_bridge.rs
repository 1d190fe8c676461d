//! # Authentication bridge
//!
//! Subscribes to the platform's auth-state stream and dispatches into the
//! [`SessionStore`]: a user record becomes [`SessionStore::set_identity`], no
//! user becomes [`SessionStore::clear_identity`].
//!
//! One mount cycle holds exactly one subscription. [`AuthBridge::mount`] is a
//! no-op while mounted; [`AuthBridge::unmount`] cancels unconditionally and is
//! idempotent; dropping the bridge unmounts it. Once `unmount` returns, the
//! session sees no further dispatch from that mount cycle, even for an event
//! the platform had already started delivering. Session watchers run inside
//! that dispatch and must not unmount the bridge themselves.

use std::sync::{Arc, Mutex};

use backend::{AuthService, AuthUser, ListenerRegistration};

use crate::identity::Identity;
use crate::lock;
use crate::session::SessionStore;

pub struct AuthBridge {
    auth: Arc<dyn AuthService>,
    session: SessionStore,
    mounted: Mutex<Option<Mounted>>,
}

struct Mounted {
    registration: ListenerRegistration,
    /// Cleared on unmount; held while an event is dispatched.
    live: Arc<Mutex<bool>>,
}

impl AuthBridge {
    pub fn new(auth: Arc<dyn AuthService>, session: SessionStore) -> Self {
        Self {
            auth,
            session,
            mounted: Mutex::new(None),
        }
    }

    pub fn mount(&self) {
        let mut mounted = lock(&self.mounted);
        if mounted.is_some() {
            tracing::debug!("auth bridge already mounted");
            return;
        }

        let live = Arc::new(Mutex::new(true));
        let session = self.session.clone();
        let listener_live = live.clone();
        let registration = self.auth.on_auth_state_changed(Box::new(
            move |user: Option<AuthUser>| {
                let live = lock(&listener_live);
                if !*live {
                    tracing::debug!("auth event after unmount ignored");
                    return;
                }
                match user {
                    Some(user) => {
                        tracing::info!(uid = %user.uid, "session signed in");
                        session.set_identity(Identity::from(&user));
                    }
                    None => {
                        tracing::info!("session cleared");
                        session.clear_identity();
                    }
                }
            },
        ));
        *mounted = Some(Mounted { registration, live });
        tracing::debug!("auth bridge mounted");
    }

    pub fn unmount(&self) {
        let mounted = lock(&self.mounted).take();
        if let Some(Mounted { registration, live }) = mounted {
            *lock(&live) = false;
            registration.remove();
            tracing::debug!("auth bridge unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        lock(&self.mounted).is_some()
    }
}

impl Drop for AuthBridge {
    fn drop(&mut self) {
        self.unmount();
    }
}
