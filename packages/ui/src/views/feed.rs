use std::rc::Rc;

use api::Post;
use dioxus::prelude::*;

use super::{ComposerView, PostCard};
use crate::hooks::use_channel_signal;
use crate::services::use_services;

/// The composer above every post, newest first. The feed query runs while
/// this view is mounted.
#[component]
pub fn FeedView() -> Element {
    let services = use_services();
    let (posts, sender) = use_channel_signal(Vec::<Post>::new);

    let feed = use_hook(|| {
        let feed = Rc::new(services.feed());
        feed.start(move |items: &[Post]| {
            let _ = sender.unbounded_send(items.to_vec());
        });
        feed
    });
    use_drop(move || feed.cancel());

    rsx! {
        main {
            class: "feed",
            ComposerView {}
            if posts.read().is_empty() {
                p { class: "feed-empty", "No posts yet." }
            }
            for post in posts() {
                PostCard { key: "{post.id}", post }
            }
        }
    }
}
