//! # Accounts
//!
//! The sign-in screen's actions. None of them write the session directly:
//! the platform's auth-state stream does that through the
//! [`AuthBridge`](crate::AuthBridge). The one exception is registration,
//! whose profile update the stream does not report, so it is dispatched to
//! the [`SessionStore`] explicitly.

use std::sync::Arc;

use backend::{AuthService, FederatedProvider, ObjectStorage};
use serde::{Deserialize, Serialize};

use crate::composer::ImageFile;
use crate::config::FeedPaths;
use crate::error::ApiError;
use crate::session::SessionStore;
use crate::uploads::upload_with_unique_name;

/// Shortest password the sign-in form accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

/// Contents of the sign-in / registration form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialsForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub username: String,
    pub avatar: Option<ImageFile>,
}

impl CredentialsForm {
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
    }

    pub fn can_submit(&self) -> bool {
        let credentials =
            !self.email.is_empty() && self.password.chars().count() >= MIN_PASSWORD_LEN;
        match self.mode {
            AuthMode::Login => credentials,
            AuthMode::Register => {
                credentials && !self.username.is_empty() && self.avatar.is_some()
            }
        }
    }
}

#[derive(Clone)]
pub struct Accounts {
    auth: Arc<dyn AuthService>,
    storage: Arc<dyn ObjectStorage>,
    session: SessionStore,
    paths: FeedPaths,
}

impl Accounts {
    pub fn new(
        auth: Arc<dyn AuthService>,
        storage: Arc<dyn ObjectStorage>,
        session: SessionStore,
        paths: FeedPaths,
    ) -> Self {
        Self {
            auth,
            storage,
            session,
            paths,
        }
    }

    /// Sign in or register, depending on the form's mode.
    pub async fn submit(&self, form: &CredentialsForm) -> Result<(), ApiError> {
        if !form.can_submit() {
            return Err(ApiError::IncompleteForm);
        }
        match form.mode {
            AuthMode::Login => self.sign_in(&form.email, &form.password).await,
            AuthMode::Register => self.register(form).await,
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), ApiError> {
        self.auth.sign_in_with_password(email, password).await?;
        Ok(())
    }

    /// Create the account, upload the avatar, then set the profile.
    ///
    /// The account stays created if a later step fails.
    pub async fn register(&self, form: &CredentialsForm) -> Result<(), ApiError> {
        let avatar = form.avatar.clone().ok_or(ApiError::IncompleteForm)?;
        if form.username.is_empty() {
            return Err(ApiError::IncompleteForm);
        }

        let user = self
            .auth
            .register_with_password(&form.email, &form.password)
            .await?;
        let photo_url = upload_with_unique_name(
            self.storage.as_ref(),
            &self.paths.avatars_prefix,
            &avatar.name,
            avatar.bytes,
            &|_| {},
        )
        .await?;
        self.auth.update_profile(&form.username, &photo_url).await?;
        self.session.update_profile(&form.username, &photo_url);

        tracing::info!(uid = %user.uid, username = %form.username, "registration complete");
        Ok(())
    }

    pub async fn sign_in_with_provider(&self, provider: FederatedProvider) -> Result<(), ApiError> {
        self.auth.sign_in_with_federated_popup(provider).await?;
        Ok(())
    }

    /// Request a reset email. The field is cleared whatever the outcome.
    pub async fn send_password_reset(&self, email: &mut String) -> Result<(), ApiError> {
        let email = std::mem::take(email);
        self.auth.send_password_reset(&email).await?;
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), ApiError> {
        self.auth.sign_out().await?;
        Ok(())
    }
}
