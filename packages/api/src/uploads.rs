//! Object naming and the upload-then-resolve path shared by post images and
//! registration avatars.

use backend::{BackendError, ObjectPath, ObjectStorage, UploadProgress};
use rand::distributions::Alphanumeric;
use rand::Rng;

const PREFIX_LEN: usize = 16;

/// `name` behind a random 16-character alphanumeric prefix and `_`, so two
/// uploads of the same file never share an object.
pub fn unique_file_name(name: &str) -> String {
    let prefix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PREFIX_LEN)
        .map(char::from)
        .collect();
    format!("{prefix}_{name}")
}

/// Upload `bytes` under `prefix` with a unique name and return the public
/// download URL.
pub async fn upload_with_unique_name(
    storage: &dyn ObjectStorage,
    prefix: &str,
    file_name: &str,
    bytes: Vec<u8>,
    on_progress: &(dyn Fn(UploadProgress) + Send + Sync),
) -> Result<String, BackendError> {
    let path = ObjectPath::new(prefix, &unique_file_name(file_name));
    storage.upload_file(&path, bytes, on_progress).await?;
    let url = storage.get_public_url(&path).await?;
    tracing::debug!(%path, "object uploaded");
    Ok(url)
}
