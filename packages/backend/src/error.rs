//! Errors reported by the platform.
//!
//! Every variant carries the platform's stable error code (see
//! [`BackendError::code`]); the `Display` text is what the user sees in the
//! blocking notice.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("The email address is badly formatted.")]
    InvalidEmail,
    #[error("Password should be at least {min_len} characters.")]
    WeakPassword { min_len: usize },
    #[error("The email address is already in use by another account.")]
    EmailAlreadyInUse,
    #[error("The supplied credentials are incorrect.")]
    InvalidCredential,
    #[error("There is no user record corresponding to this email.")]
    UserNotFound,
    #[error("The popup has been closed by the user before finalizing the operation.")]
    PopupClosed,
    #[error("No user is currently signed in.")]
    NoCurrentUser,
    #[error("Object '{0}' does not exist.")]
    ObjectNotFound(String),
    #[error("Upload of '{path}' failed: {reason}")]
    UploadFailed { path: String, reason: String },
    #[error("The service is currently unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    /// Platform error code, e.g. `auth/invalid-credential`.
    pub fn code(&self) -> &'static str {
        match self {
            BackendError::InvalidEmail => "auth/invalid-email",
            BackendError::WeakPassword { .. } => "auth/weak-password",
            BackendError::EmailAlreadyInUse => "auth/email-already-in-use",
            BackendError::InvalidCredential => "auth/invalid-credential",
            BackendError::UserNotFound => "auth/user-not-found",
            BackendError::PopupClosed => "auth/popup-closed-by-user",
            BackendError::NoCurrentUser => "auth/no-current-user",
            BackendError::ObjectNotFound(_) => "storage/object-not-found",
            BackendError::UploadFailed { .. } => "storage/upload-failed",
            BackendError::Unavailable(_) => "unavailable",
        }
    }
}
