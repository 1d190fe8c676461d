use std::rc::Rc;

use api::{Comment, Post};
use dioxus::prelude::*;

use crate::hooks::use_channel_signal;
use crate::notice::use_notice;
use crate::services::use_services;

fn posted_at(timestamp: Option<api::Timestamp>) -> String {
    timestamp
        .map(|ts| ts.to_local_string())
        .unwrap_or_else(|| "just now".to_string())
}

/// One post with its comment thread. The thread is subscribed as soon as the
/// card renders; the toggle only shows or hides it.
#[component]
pub fn PostCard(post: Post) -> Element {
    let services = use_services();
    let notice = use_notice();
    let (comments, sender) = use_channel_signal(Vec::<Comment>::new);

    let post_id = post.id.clone();
    let thread = use_hook(|| {
        let thread = Rc::new(services.comments(&post_id));
        thread.start(move |items: &[Comment]| {
            let _ = sender.unbounded_send(items.to_vec());
        });
        thread
    });
    let cancel_thread = thread.clone();
    use_drop(move || cancel_thread.cancel());

    let mut show_comments = use_signal(|| false);
    let mut input = use_signal(String::new);

    let handle_comment = move |evt: FormEvent| {
        evt.prevent_default();
        let thread = thread.clone();
        spawn(async move {
            let mut text = std::mem::take(&mut *input.write());
            if let Err(err) = thread.submit_comment(&mut text).await {
                tracing::warn!(error = %err, "comment failed");
                notice.show(err.user_message());
            }
        });
    };

    let count = comments.read().len();
    let toggle_label = if show_comments() {
        "Hide comments".to_string()
    } else {
        format!("Comments ({count})")
    };

    rsx! {
        article {
            class: "post",
            header {
                class: "post-header",
                img { class: "avatar", src: "{post.avatar}", alt: "" }
                div {
                    span { class: "post-author", "{post.username}" }
                    span { class: "post-time", "{posted_at(post.timestamp)}" }
                }
            }
            p { class: "post-text", "{post.text}" }
            if !post.image.is_empty() {
                img { class: "post-image", src: "{post.image}", alt: "" }
            }

            button {
                class: "link",
                onclick: move |_| show_comments.set(!show_comments()),
                "{toggle_label}"
            }

            if show_comments() {
                section {
                    class: "comments",
                    for comment in comments() {
                        div {
                            key: "{comment.id}",
                            class: "comment",
                            img { class: "avatar avatar-small", src: "{comment.avatar}", alt: "" }
                            div {
                                span { class: "post-author", "{comment.username}" }
                                span { class: "post-time", "{posted_at(comment.timestamp)}" }
                                p { class: "comment-text", "{comment.text}" }
                            }
                        }
                    }
                    form {
                        class: "comment-form",
                        onsubmit: handle_comment,
                        input {
                            class: "input",
                            r#type: "text",
                            placeholder: "Write a comment",
                            value: input(),
                            oninput: move |evt: FormEvent| input.set(evt.value()),
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "submit",
                            disabled: input.read().is_empty(),
                            "Send"
                        }
                    }
                }
            }
        }
    }
}
