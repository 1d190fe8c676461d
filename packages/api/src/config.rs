//! # Application configuration: `social-feed.toml`
//!
//! ```toml
//! [backend.storage]
//! bucket = "social-feed.appspot.com"
//!
//! [feed]
//! posts = "posts"            # top-level collection of posts
//! comments = "comments"      # sub-collection under each post
//! order_field = "timestamp"  # server timestamp both live queries sort on
//! images_prefix = "images"   # storage prefix for post images
//! avatars_prefix = "avatars" # storage prefix for registration avatars
//! ```
//!
//! A missing file is equivalent to the default configuration.

use std::path::Path;

use backend::{BackendConfig, CollectionPath, DocumentId, OrderedQuery};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub feed: FeedPaths,
}

impl AppConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "social-feed.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

/// Collection names and storage prefixes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedPaths {
    #[serde(default = "default_posts")]
    pub posts: String,
    #[serde(default = "default_comments")]
    pub comments: String,
    #[serde(default = "default_order_field")]
    pub order_field: String,
    #[serde(default = "default_images_prefix")]
    pub images_prefix: String,
    #[serde(default = "default_avatars_prefix")]
    pub avatars_prefix: String,
}

fn default_posts() -> String {
    "posts".to_string()
}

fn default_comments() -> String {
    "comments".to_string()
}

fn default_order_field() -> String {
    "timestamp".to_string()
}

fn default_images_prefix() -> String {
    "images".to_string()
}

fn default_avatars_prefix() -> String {
    "avatars".to_string()
}

impl Default for FeedPaths {
    fn default() -> Self {
        Self {
            posts: default_posts(),
            comments: default_comments(),
            order_field: default_order_field(),
            images_prefix: default_images_prefix(),
            avatars_prefix: default_avatars_prefix(),
        }
    }
}

impl FeedPaths {
    pub fn posts_collection(&self) -> CollectionPath {
        CollectionPath::new(self.posts.as_str())
    }

    pub fn comments_collection(&self, post_id: &DocumentId) -> CollectionPath {
        self.posts_collection().child(post_id, self.comments.as_str())
    }

    /// Newest post first.
    pub fn feed_query(&self) -> OrderedQuery {
        OrderedQuery::descending(self.posts_collection(), self.order_field.as_str())
    }

    /// Newest comment first.
    pub fn comments_query(&self, post_id: &DocumentId) -> OrderedQuery {
        OrderedQuery::descending(self.comments_collection(post_id), self.order_field.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::Direction;

    #[test]
    fn test_default_paths() {
        let paths = FeedPaths::default();
        let query = paths.comments_query(&DocumentId::new("p1"));
        assert_eq!(query.collection.to_string(), "posts/p1/comments");
        assert_eq!(query.order_by, "timestamp");
        assert_eq!(query.direction, Direction::Descending);
        assert_eq!(paths.feed_query().collection.to_string(), "posts");
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::from_toml(
            "[feed]\nposts = \"tweets\"\n\n[backend.auth]\nmin_password_len = 8\n",
        )
        .unwrap();
        assert_eq!(config.feed.posts, "tweets");
        assert_eq!(config.feed.comments, "comments");
        assert_eq!(config.backend.auth.min_password_len, 8);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join(AppConfig::filename())).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(AppConfig::filename());
        std::fs::write(&path, "[feed\n").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}
