use api::{route, View};
use dioxus::prelude::*;

use super::{AuthView, FeedView};
use crate::session::use_session;

/// Shows the sign-in screen or the feed, re-evaluated on every session change.
#[component]
pub fn ViewRouter() -> Element {
    let identity = use_session();
    let view = route(&identity.read());
    tracing::trace!(?view, "routing");

    match view {
        View::SignIn => rsx! { AuthView {} },
        View::Feed => rsx! { FeedView {} },
    }
}
