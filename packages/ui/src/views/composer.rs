use api::{PostDraft, UploadProgress};
use dioxus::prelude::*;

use super::read_picked_file;
use crate::hooks::use_channel_signal;
use crate::notice::use_notice;
use crate::services::use_services;
use crate::session::use_session;

/// New-post form. Clicking the avatar signs out.
#[component]
pub fn ComposerView() -> Element {
    let services = use_services();
    let composer = use_hook(|| services.composer());
    let accounts = use_hook(|| services.accounts());
    let identity = use_session();
    let notice = use_notice();
    let mut draft = use_signal(PostDraft::default);
    let mut busy = use_signal(|| false);
    let (upload, progress_sender) = use_channel_signal(|| Option::<f64>::None);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if !draft.read().can_submit() {
            return;
        }
        let composer = composer.clone();
        let progress_sender = progress_sender.clone();
        spawn(async move {
            busy.set(true);
            let mut submission = std::mem::take(&mut *draft.write());
            let reporter = progress_sender.clone();
            let on_progress = move |progress: UploadProgress| {
                let _ = reporter.unbounded_send(Some(progress.fraction()));
            };
            if let Err(err) = composer.submit_post(&mut submission, &on_progress).await {
                tracing::warn!(error = %err, "post failed");
                notice.show(err.user_message());
            }
            let _ = progress_sender.unbounded_send(None);
            busy.set(false);
        });
    };

    let handle_sign_out = move |_| {
        let accounts = accounts.clone();
        spawn(async move {
            if let Err(err) = accounts.sign_out().await {
                notice.show(err.user_message());
            }
        });
    };

    let current = identity();
    let image_name = draft.read().image.as_ref().map(|image| image.name.clone());

    rsx! {
        form {
            class: "composer",
            onsubmit: handle_submit,
            img {
                class: "avatar",
                src: "{current.photo_url}",
                alt: "{current.display_name}",
                title: "Sign out",
                onclick: handle_sign_out,
            }
            input {
                class: "input composer-text",
                r#type: "text",
                placeholder: "What's on your mind, {current.display_name}?",
                value: draft.read().text.clone(),
                oninput: move |evt: FormEvent| draft.write().text = evt.value(),
            }
            label {
                class: "file-picker",
                if let Some(name) = image_name {
                    "{name}"
                } else {
                    "Add image"
                }
                input {
                    r#type: "file",
                    accept: "image/*",
                    onchange: move |evt: FormEvent| async move {
                        if let Some(file) = read_picked_file(&evt).await {
                            draft.write().image = Some(file);
                        }
                    },
                }
            }
            button {
                class: "btn btn-primary",
                r#type: "submit",
                disabled: !draft.read().can_submit() || busy(),
                "Send"
            }
            if let Some(fraction) = upload() {
                progress { class: "upload-progress", max: "1", value: "{fraction}" }
            }
        }
    }
}
