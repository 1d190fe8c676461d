mod auth;
pub use auth::AuthView;

mod composer;
pub use composer::ComposerView;

mod feed;
pub use feed::FeedView;

mod modal_overlay;
pub use modal_overlay::ModalOverlay;

mod post_card;
pub use post_card::PostCard;

mod router;
pub use router::ViewRouter;

use std::path::Path;

use api::ImageFile;
use dioxus::prelude::*;

/// The first file picked in a file input, named by its base name.
pub(crate) async fn read_picked_file(evt: &FormEvent) -> Option<ImageFile> {
    let engine = evt.files()?;
    let picked = engine.files().into_iter().next()?;
    let bytes = engine.read_file(&picked).await?;
    let name = Path::new(&picked)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or(picked);
    Some(ImageFile { name, bytes })
}
