//! This crate contains all shared UI for the social feed.
//!
//! Components read their handles from the [`Services`](api::Services) context
//! and mirror platform callbacks into signals; they never call the platform
//! directly.

use dioxus::prelude::*;

mod hooks;

mod services;
pub use services::use_services;

mod session;
pub use session::{use_session, SessionProvider};

mod notice;
pub use notice::{use_notice, Notice, NoticeProvider};

pub mod views;
pub use views::{AuthView, ComposerView, FeedView, ModalOverlay, PostCard, ViewRouter};

pub const MAIN_CSS: Asset = asset!("/assets/main.css");
