use dioxus::prelude::*;

/// Full-screen overlay that centers its children in a card, with an optional
/// heading. Clicking outside the card triggers `on_close`.
#[component]
pub fn ModalOverlay(
    on_close: EventHandler<()>,
    #[props(default)] title: Option<String>,
    children: Element,
) -> Element {
    rsx! {
        div {
            class: "overlay",
            onclick: move |_| on_close.call(()),
            div {
                class: "overlay-card",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),
                if let Some(title) = title {
                    h2 { class: "overlay-title", "{title}" }
                }
                {children}
            }
        }
    }
}
