use api::Services;
use dioxus::prelude::*;

/// The service handles provided at the root of the app.
pub fn use_services() -> Services {
    use_context::<Services>()
}
