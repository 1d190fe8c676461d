use backend::AuthUser;
use serde::{Deserialize, Serialize};

/// The signed-in user as held by the [`SessionStore`](crate::SessionStore).
///
/// The empty identity (all fields `""`) means nobody is signed in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub display_name: String,
    pub photo_url: String,
}

impl Identity {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_signed_in(&self) -> bool {
        !self.uid.is_empty()
    }
}

impl From<&AuthUser> for Identity {
    fn from(user: &AuthUser) -> Self {
        Self {
            uid: user.uid.clone(),
            display_name: user.display_name.clone().unwrap_or_default(),
            photo_url: user.photo_url.clone().unwrap_or_default(),
        }
    }
}
