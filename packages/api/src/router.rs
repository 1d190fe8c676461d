//! Which top-level view to render.

use crate::identity::Identity;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    /// Sign-in / registration.
    SignIn,
    /// Composer and live feed.
    Feed,
}

/// Pure function of the identity: a non-empty uid means signed in.
pub fn route(identity: &Identity) -> View {
    if identity.is_signed_in() {
        View::Feed
    } else {
        View::SignIn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_follows_uid() {
        assert_eq!(route(&Identity::empty()), View::SignIn);

        let named_without_uid = Identity {
            uid: String::new(),
            display_name: "Alice".into(),
            photo_url: "a.png".into(),
        };
        assert_eq!(route(&named_without_uid), View::SignIn);

        let signed_in = Identity {
            uid: "u1".into(),
            ..Identity::default()
        };
        assert_eq!(route(&signed_in), View::Feed);
    }
}
