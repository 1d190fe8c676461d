//! # Comments
//!
//! Each rendered post owns a [`CommentSubscription`] over its comments
//! subcollection, newest first. The subscription is started when the post
//! renders; showing or hiding the list never touches it.

use std::sync::Arc;

use backend::{CollectionPath, Document, DocumentId, DocumentStore, FieldValue, Fields, Timestamp};
use serde::{Deserialize, Serialize};

use crate::config::FeedPaths;
use crate::error::ApiError;
use crate::feed::{AVATAR, TEXT, TIMESTAMP, USERNAME};
use crate::live_query::{FromDocument, LiveQuery};
use crate::session::SessionStore;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: DocumentId,
    pub avatar: String,
    pub text: String,
    pub timestamp: Option<Timestamp>,
    pub username: String,
}

impl FromDocument for Comment {
    fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            avatar: document.get_str(AVATAR).to_string(),
            text: document.get_str(TEXT).to_string(),
            timestamp: document.get_timestamp(TIMESTAMP),
            username: document.get_str(USERNAME).to_string(),
        }
    }
}

/// Live comments of one post, plus the write path for new ones.
pub struct CommentSubscription {
    live: LiveQuery<Comment>,
    collection: CollectionPath,
    store: Arc<dyn DocumentStore>,
    session: SessionStore,
}

impl CommentSubscription {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        session: SessionStore,
        paths: &FeedPaths,
        post_id: &DocumentId,
    ) -> Self {
        Self {
            live: LiveQuery::new(store.clone(), paths.comments_query(post_id)),
            collection: paths.comments_collection(post_id),
            store,
            session,
        }
    }

    pub fn start(&self, on_update: impl Fn(&[Comment]) + Send + Sync + 'static) {
        self.live.start(on_update);
    }

    pub fn cancel(&self) {
        self.live.cancel();
    }

    pub fn is_active(&self) -> bool {
        self.live.is_active()
    }

    pub fn items(&self) -> Vec<Comment> {
        self.live.items()
    }

    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    /// Append a comment authored by the current identity.
    ///
    /// The input buffer is taken before the request is issued, so it is empty
    /// afterwards whatever the outcome. Empty input is rejected without a write.
    pub async fn submit_comment(&self, input: &mut String) -> Result<DocumentId, ApiError> {
        if input.is_empty() {
            return Err(ApiError::EmptyComment);
        }
        let text = std::mem::take(input);
        let identity = self.session.select_identity();

        let mut fields = Fields::new();
        fields.insert(AVATAR.into(), identity.photo_url.into());
        fields.insert(TEXT.into(), text.into());
        fields.insert(TIMESTAMP.into(), FieldValue::ServerTimestamp);
        fields.insert(USERNAME.into(), identity.display_name.into());

        let id = self.store.add_document(&self.collection, fields).await?;
        tracing::debug!(collection = %self.collection, %id, "comment added");
        Ok(id)
    }
}
