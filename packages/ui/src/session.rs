//! Session context for the UI.

use std::rc::Rc;

use api::{AuthBridge, Identity};
use backend::ListenerRegistration;
use dioxus::prelude::*;

use crate::hooks::use_channel_signal;
use crate::services::use_services;

/// The current identity. Updates on every sign-in, sign-out and profile change.
pub fn use_session() -> Signal<Identity> {
    use_context::<Signal<Identity>>()
}

struct SessionMount {
    bridge: AuthBridge,
    _watch: ListenerRegistration,
}

/// Mounts the auth bridge for the lifetime of its subtree and exposes the
/// session store as a `Signal<Identity>`.
#[component]
pub fn SessionProvider(children: Element) -> Element {
    let services = use_services();
    let initial = services.session.select_identity();
    let (identity, sender) = use_channel_signal(move || initial);

    let mount = use_hook(|| {
        let _watch = services
            .session
            .watch(move |identity: &Identity| {
                let _ = sender.unbounded_send(identity.clone());
            });
        let bridge = services.auth_bridge();
        bridge.mount();
        Rc::new(SessionMount { bridge, _watch })
    });
    use_drop(move || mount.bridge.unmount());

    use_context_provider(|| identity);

    rsx! {
        {children}
    }
}
