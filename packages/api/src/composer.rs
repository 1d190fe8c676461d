//! # Composer
//!
//! Creating a post: optionally upload the attached image under a unique name,
//! then append the post document with a server-assigned timestamp. The draft
//! is taken as soon as the submission starts, so the form is cleared whether
//! or not the write succeeds.

use std::sync::Arc;

use backend::{DocumentId, DocumentStore, ObjectStorage, UploadProgress};

use crate::config::FeedPaths;
use crate::error::ApiError;
use crate::feed::post_fields;
use crate::session::SessionStore;
use crate::uploads::upload_with_unique_name;

/// A file picked by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Composer form contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub text: String,
    pub image: Option<ImageFile>,
}

impl PostDraft {
    /// The send control is enabled only when there is text.
    pub fn can_submit(&self) -> bool {
        !self.text.is_empty()
    }
}

#[derive(Clone)]
pub struct Composer {
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn ObjectStorage>,
    session: SessionStore,
    paths: FeedPaths,
}

impl Composer {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
        session: SessionStore,
        paths: FeedPaths,
    ) -> Self {
        Self {
            store,
            storage,
            session,
            paths,
        }
    }

    /// Publish `draft` as the current identity.
    ///
    /// An empty draft is rejected and left untouched. Otherwise the draft is
    /// reset before any request; a failed upload means no post is appended.
    pub async fn submit_post(
        &self,
        draft: &mut PostDraft,
        on_progress: &(dyn Fn(UploadProgress) + Send + Sync),
    ) -> Result<DocumentId, ApiError> {
        if !draft.can_submit() {
            return Err(ApiError::EmptyPost);
        }
        let PostDraft { text, image } = std::mem::take(draft);
        let identity = self.session.select_identity();

        let image_url = match image {
            Some(file) => {
                upload_with_unique_name(
                    self.storage.as_ref(),
                    &self.paths.images_prefix,
                    &file.name,
                    file.bytes,
                    on_progress,
                )
                .await?
            }
            None => String::new(),
        };

        let collection = self.paths.posts_collection();
        let id = self
            .store
            .add_document(&collection, post_fields(&identity, image_url, text))
            .await?;
        tracing::info!(%id, username = %identity.display_name, "post published");
        Ok(id)
    }
}
