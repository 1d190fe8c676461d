use dioxus::prelude::*;

use crate::views::ModalOverlay;

/// Handle to the blocking notice shown over the whole app.
#[derive(Clone, Copy, PartialEq)]
pub struct Notice(Signal<Option<String>>);

impl Notice {
    pub fn show(self, message: impl Into<String>) {
        let mut message_signal = self.0;
        message_signal.set(Some(message.into()));
    }

    pub fn dismiss(self) {
        let mut message_signal = self.0;
        message_signal.set(None);
    }
}

pub fn use_notice() -> Notice {
    use_context::<Notice>()
}

/// Provides [`Notice`] to its children and renders the notice while one is set.
/// Only the OK button dismisses it.
#[component]
pub fn NoticeProvider(children: Element) -> Element {
    let message = use_signal(|| Option::<String>::None);
    let notice = use_context_provider(|| Notice(message));

    rsx! {
        {children}
        if let Some(text) = message() {
            ModalOverlay {
                on_close: move |_| {},
                div {
                    class: "notice",
                    role: "alertdialog",
                    p { class: "notice-text", "{text}" }
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| notice.dismiss(),
                        "OK"
                    }
                }
            }
        }
    }
}
