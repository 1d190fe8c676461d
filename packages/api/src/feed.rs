//! # Feed
//!
//! [`Post`] summaries and the live feed: every post, newest first. Each
//! snapshot replaces the whole list; there is no pagination or filtering.
//! A post whose server timestamp is still pending carries `timestamp: None`.

use std::sync::Arc;

use backend::{Document, DocumentId, DocumentStore, FieldValue, Fields, Timestamp};
use serde::{Deserialize, Serialize};

use crate::config::FeedPaths;
use crate::identity::Identity;
use crate::live_query::{FromDocument, LiveQuery};

pub(crate) const AVATAR: &str = "avatar";
pub(crate) const IMAGE: &str = "image";
pub(crate) const TEXT: &str = "text";
pub(crate) const TIMESTAMP: &str = "timestamp";
pub(crate) const USERNAME: &str = "username";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: DocumentId,
    pub avatar: String,
    /// Download URL of the attached image, `""` when there is none.
    pub image: String,
    pub text: String,
    pub timestamp: Option<Timestamp>,
    pub username: String,
}

impl FromDocument for Post {
    fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            avatar: document.get_str(AVATAR).to_string(),
            image: document.get_str(IMAGE).to_string(),
            text: document.get_str(TEXT).to_string(),
            timestamp: document.get_timestamp(TIMESTAMP),
            username: document.get_str(USERNAME).to_string(),
        }
    }
}

/// Fields of a new post written by `identity`.
pub(crate) fn post_fields(identity: &Identity, image: String, text: String) -> Fields {
    let mut fields = Fields::new();
    fields.insert(AVATAR.into(), identity.photo_url.clone().into());
    fields.insert(IMAGE.into(), image.into());
    fields.insert(TEXT.into(), text.into());
    fields.insert(TIMESTAMP.into(), FieldValue::ServerTimestamp);
    fields.insert(USERNAME.into(), identity.display_name.clone().into());
    fields
}

pub type FeedSubscription = LiveQuery<Post>;

impl LiveQuery<Post> {
    /// The feed query over the posts collection, newest first. Not started.
    pub fn feed(store: Arc<dyn DocumentStore>, paths: &FeedPaths) -> Self {
        LiveQuery::new(store, paths.feed_query())
    }
}
