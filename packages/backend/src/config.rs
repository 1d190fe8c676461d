//! # Platform configuration: `[backend]` table
//!
//! ```toml
//! [backend.auth]
//! min_password_len = 6
//!
//! [backend.documents]
//! latency_compensation = true     # emit pending snapshots before the server clock resolves
//!
//! [backend.storage]
//! base_url = "http://localhost:9199"
//! bucket = "social-feed.appspot.com"
//! upload_chunk_bytes = 262144
//! ```
//!
//! Every section derives `Default`, so a missing or empty table equals the
//! default configuration.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shortest password the platform accepts at registration.
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

fn default_min_password_len() -> usize {
    6
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_len: default_min_password_len(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default = "default_latency_compensation")]
    pub latency_compensation: bool,
}

fn default_latency_compensation() -> bool {
    true
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            latency_compensation: default_latency_compensation(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Bytes per upload chunk; one progress event is emitted per chunk.
    #[serde(default = "default_upload_chunk_bytes")]
    pub upload_chunk_bytes: usize,
}

fn default_base_url() -> String {
    "http://localhost:9199".to_string()
}

fn default_bucket() -> String {
    "social-feed.appspot.com".to_string()
}

fn default_upload_chunk_bytes() -> usize {
    256 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            bucket: default_bucket(),
            upload_chunk_bytes: default_upload_chunk_bytes(),
        }
    }
}

impl BackendConfig {
    /// Builder method to set the upload chunk size.
    pub fn with_upload_chunk_bytes(mut self, bytes: usize) -> Self {
        self.storage.upload_chunk_bytes = bytes;
        self
    }

    /// Builder method to toggle pending snapshots.
    pub fn with_latency_compensation(mut self, enabled: bool) -> Self {
        self.documents.latency_compensation = enabled;
        self
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config = BackendConfig::from_toml("").unwrap();
        assert_eq!(config, BackendConfig::default());
        assert_eq!(config.auth.min_password_len, 6);
        assert!(config.documents.latency_compensation);
    }

    #[test]
    fn test_partial_table_keeps_other_defaults() {
        let config = BackendConfig::from_toml("[storage]\nbucket = \"demo\"\n").unwrap();
        assert_eq!(config.storage.bucket, "demo");
        assert_eq!(config.storage.upload_chunk_bytes, 256 * 1024);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = BackendConfig::default()
            .with_upload_chunk_bytes(4)
            .with_latency_compensation(false);
        let text = config.to_toml().unwrap();
        assert_eq!(BackendConfig::from_toml(&text).unwrap(), config);
    }
}
