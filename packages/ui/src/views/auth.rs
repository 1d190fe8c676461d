//! Sign-in and registration screen, with the password-reset dialog.

use api::{AuthMode, CredentialsForm, FederatedProvider, MIN_PASSWORD_LEN};
use dioxus::prelude::*;

use super::{read_picked_file, ModalOverlay};
use crate::notice::use_notice;
use crate::services::use_services;

#[component]
pub fn AuthView() -> Element {
    let services = use_services();
    let accounts = use_hook(|| services.accounts());
    let notice = use_notice();
    let mut form = use_signal(CredentialsForm::default);
    let mut busy = use_signal(|| false);
    let mut reset_open = use_signal(|| false);

    let submit_accounts = accounts.clone();
    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let accounts = submit_accounts.clone();
        spawn(async move {
            busy.set(true);
            let credentials = form();
            if let Err(err) = accounts.submit(&credentials).await {
                tracing::warn!(error = %err, mode = ?credentials.mode, "authentication failed");
                notice.show(err.user_message());
            }
            busy.set(false);
        });
    };

    let handle_google = move |_| {
        let accounts = accounts.clone();
        spawn(async move {
            if let Err(err) = accounts
                .sign_in_with_provider(FederatedProvider::Google)
                .await
            {
                tracing::warn!(error = %err, "federated sign-in failed");
                notice.show(err.user_message());
            }
        });
    };

    let registering = form.read().mode == AuthMode::Register;
    let can_submit = form.read().can_submit() && !busy();
    let avatar_name = form
        .read()
        .avatar
        .as_ref()
        .map(|avatar| avatar.name.clone());

    rsx! {
        div {
            class: "auth-screen",
            h1 { class: "auth-title", "Social Feed" }
            p {
                class: "auth-subtitle",
                if registering { "Create an account" } else { "Sign in to your account" }
            }

            form {
                class: "auth-form",
                onsubmit: handle_submit,

                if registering {
                    input {
                        class: "input",
                        r#type: "text",
                        placeholder: "Username",
                        value: form.read().username.clone(),
                        oninput: move |evt: FormEvent| form.write().username = evt.value(),
                    }
                    label {
                        class: "file-picker",
                        if let Some(name) = avatar_name {
                            "Avatar: {name}"
                        } else {
                            "Choose an avatar"
                        }
                        input {
                            r#type: "file",
                            accept: "image/*",
                            onchange: move |evt: FormEvent| async move {
                                if let Some(file) = read_picked_file(&evt).await {
                                    form.write().avatar = Some(file);
                                }
                            },
                        }
                    }
                }

                input {
                    class: "input",
                    r#type: "email",
                    placeholder: "Email",
                    value: form.read().email.clone(),
                    oninput: move |evt: FormEvent| form.write().email = evt.value(),
                }
                input {
                    class: "input",
                    r#type: "password",
                    placeholder: "Password (min {MIN_PASSWORD_LEN} characters)",
                    value: form.read().password.clone(),
                    oninput: move |evt: FormEvent| form.write().password = evt.value(),
                }

                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: !can_submit,
                    if registering { "Sign up" } else { "Sign in" }
                }
            }

            div {
                class: "divider",
                span { "or" }
            }

            button {
                class: "btn btn-google",
                r#type: "button",
                onclick: handle_google,
                "Continue with Google"
            }

            div {
                class: "auth-links",
                button {
                    class: "link",
                    r#type: "button",
                    onclick: move |_| form.write().toggle_mode(),
                    if registering { "Already have an account? Sign in" } else { "No account? Sign up" }
                }
                button {
                    class: "link",
                    r#type: "button",
                    onclick: move |_| reset_open.set(true),
                    "Forgot password?"
                }
            }

            if reset_open() {
                ResetPasswordDialog { on_close: move |_| reset_open.set(false) }
            }
        }
    }
}

#[component]
fn ResetPasswordDialog(on_close: EventHandler<()>) -> Element {
    let services = use_services();
    let accounts = use_hook(|| services.accounts());
    let notice = use_notice();
    let mut email = use_signal(String::new);

    let handle_send = move |evt: FormEvent| {
        evt.prevent_default();
        let accounts = accounts.clone();
        spawn(async move {
            let mut field = email();
            let result = accounts.send_password_reset(&mut field).await;
            email.set(field);
            match result {
                Ok(()) => notice.show("Password reset email sent. Check your inbox."),
                Err(err) => {
                    tracing::warn!(error = %err, "password reset failed");
                    notice.show(err.user_message());
                }
            }
            on_close.call(());
        });
    };

    rsx! {
        ModalOverlay {
            on_close: move |_| on_close.call(()),
            title: "Reset password".to_string(),
            form {
                class: "reset-form",
                onsubmit: handle_send,
                input {
                    class: "input",
                    r#type: "email",
                    placeholder: "Email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }
                div {
                    class: "dialog-actions",
                    button { class: "btn btn-primary", r#type: "submit", "Send" }
                    button {
                        class: "btn btn-outline",
                        r#type: "button",
                        onclick: move |_| on_close.call(()),
                        "Cancel"
                    }
                }
            }
        }
    }
}
