use std::collections::HashMap;
use std::sync::{Arc, Weak};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;

use super::delivery::Mailbox;
use super::{lock, Inner, MemoryBackend};
use crate::error::BackendError;
use crate::models::{AuthUser, FederatedProvider};
use crate::registration::ListenerRegistration;
use crate::service::{AuthService, AuthStateListener};

const UID_LEN: usize = 28;

type AuthMailbox = Arc<Mailbox<Option<AuthUser>>>;

#[derive(Default)]
pub(super) struct AuthState {
    /// Password accounts keyed by normalised email.
    accounts: HashMap<String, Account>,
    federated: HashMap<FederatedProvider, AuthUser>,
    current: Option<AuthUser>,
    listeners: HashMap<u64, AuthMailbox>,
    reset_outbox: Vec<String>,
    /// Stamps auth-state events in the order they happened.
    sequence: u64,
}

struct Account {
    user: AuthUser,
    password_hash: String,
}

impl AuthState {
    fn next_seq(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Apply a profile change to whichever record owns `uid`.
    fn update_stored_profile(&mut self, updated: &AuthUser) {
        if let Some(account) = self
            .accounts
            .values_mut()
            .find(|account| account.user.uid == updated.uid)
        {
            account.user = updated.clone();
        }
        if let Some(user) = self
            .federated
            .values_mut()
            .find(|user| user.uid == updated.uid)
        {
            *user = updated.clone();
        }
    }
}

fn normalize_email(email: &str) -> Result<String, BackendError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(BackendError::InvalidEmail),
    }
}

fn generate_uid() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(UID_LEN)
        .map(char::from)
        .collect()
}

/// Hash a password using Argon2id. Returns a PHC-format string.
fn hash_password(password: &str) -> Result<String, BackendError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BackendError::Unavailable(format!("failed to hash password: {e}")))
}

/// Verify a password against a PHC-format hash string.
fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

impl MemoryBackend {
    /// Register the account the sign-in popup of `provider` will return.
    pub fn register_federated_account(
        &self,
        provider: FederatedProvider,
        email: &str,
        display_name: &str,
        photo_url: &str,
    ) -> AuthUser {
        let user = AuthUser {
            uid: generate_uid(),
            email: Some(email.to_string()),
            display_name: Some(display_name.to_string()),
            photo_url: Some(photo_url.to_string()),
        };
        lock(&self.inner.auth).federated.insert(provider, user.clone());
        user
    }

    /// Emails that password resets were sent to, oldest first.
    pub fn sent_password_resets(&self) -> Vec<String> {
        lock(&self.inner.auth).reset_outbox.clone()
    }

    /// Number of attached auth-state listeners.
    pub fn auth_listener_count(&self) -> usize {
        lock(&self.inner.auth).listeners.len()
    }

    fn set_current_user(&self, user: Option<AuthUser>) {
        let (listeners, seq) = {
            let mut auth = lock(&self.inner.auth);
            auth.current = user.clone();
            let listeners: Vec<AuthMailbox> = auth.listeners.values().cloned().collect();
            (listeners, auth.next_seq())
        };
        for listener in listeners {
            listener.post(seq, user.clone());
        }
    }
}

#[async_trait]
impl AuthService for MemoryBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, BackendError> {
        let email = normalize_email(email)?;
        let user = {
            let auth = lock(&self.inner.auth);
            let account = auth
                .accounts
                .get(&email)
                .ok_or(BackendError::InvalidCredential)?;
            if !verify_password(password, &account.password_hash) {
                return Err(BackendError::InvalidCredential);
            }
            account.user.clone()
        };

        tracing::info!(uid = %user.uid, "password sign-in");
        self.set_current_user(Some(user.clone()));
        Ok(user)
    }

    async fn register_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, BackendError> {
        let email = normalize_email(email)?;
        let min_len = self.inner.config.auth.min_password_len;
        if password.chars().count() < min_len {
            return Err(BackendError::WeakPassword { min_len });
        }
        if lock(&self.inner.auth).accounts.contains_key(&email) {
            return Err(BackendError::EmailAlreadyInUse);
        }

        let password_hash = hash_password(password)?;
        let user = AuthUser {
            uid: generate_uid(),
            email: Some(email.clone()),
            display_name: None,
            photo_url: None,
        };
        {
            let mut auth = lock(&self.inner.auth);
            if auth.accounts.contains_key(&email) {
                return Err(BackendError::EmailAlreadyInUse);
            }
            auth.accounts.insert(
                email,
                Account {
                    user: user.clone(),
                    password_hash,
                },
            );
        }

        tracing::info!(uid = %user.uid, "account registered");
        self.set_current_user(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_with_federated_popup(
        &self,
        provider: FederatedProvider,
    ) -> Result<AuthUser, BackendError> {
        let user = lock(&self.inner.auth)
            .federated
            .get(&provider)
            .cloned()
            .ok_or(BackendError::PopupClosed)?;

        tracing::info!(uid = %user.uid, provider = provider.id(), "federated sign-in");
        self.set_current_user(Some(user.clone()));
        Ok(user)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError> {
        let email = normalize_email(email)?;
        let mut auth = lock(&self.inner.auth);
        if !auth.accounts.contains_key(&email) {
            return Err(BackendError::UserNotFound);
        }
        tracing::info!("password reset sent");
        auth.reset_outbox.push(email);
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        tracing::info!("signed out");
        self.set_current_user(None);
        Ok(())
    }

    async fn update_profile(
        &self,
        display_name: &str,
        photo_url: &str,
    ) -> Result<AuthUser, BackendError> {
        let mut auth = lock(&self.inner.auth);
        let mut user = auth.current.clone().ok_or(BackendError::NoCurrentUser)?;
        user.display_name = Some(display_name.to_string());
        user.photo_url = Some(photo_url.to_string());
        auth.current = Some(user.clone());
        auth.update_stored_profile(&user);
        Ok(user)
    }

    fn current_user(&self) -> Option<AuthUser> {
        lock(&self.inner.auth).current.clone()
    }

    fn on_auth_state_changed(&self, listener: AuthStateListener) -> ListenerRegistration {
        let id = self.next_listener_id();
        let mailbox: AuthMailbox = Mailbox::new(Arc::from(listener));
        let (seq, current) = {
            let mut auth = lock(&self.inner.auth);
            auth.listeners.insert(id, mailbox.clone());
            (auth.next_seq(), auth.current.clone())
        };
        mailbox.post(seq, current);

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        ListenerRegistration::new(move || {
            if let Some(inner) = weak.upgrade() {
                lock(&inner.auth).listeners.remove(&id);
            }
        })
    }
}
