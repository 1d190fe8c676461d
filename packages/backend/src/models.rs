//! # Platform data types
//!
//! Everything the document store and the auth service hand back to the client.
//! Documents are plain field maps; the application maps them into its own
//! summaries (see the `api` crate) and never mutates a received snapshot.
//!
//! ## Server timestamps
//!
//! A write may carry [`FieldValue::ServerTimestamp`]. The platform replaces the
//! sentinel with its own clock when the write commits. Until then a snapshot
//! shows the sentinel, which readers treat as "pending":
//! [`Document::get_timestamp`] returns `None` for it.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of generated document ids.
const DOCUMENT_ID_LEN: usize = 20;

/// A point in time assigned by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Build a timestamp from milliseconds since the Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Self(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }

    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// The smallest timestamp strictly after `self`.
    pub fn next_after(&self) -> Self {
        Self::from_millis(self.as_millis() + 1)
    }

    /// Local-time rendering used by post and comment headers.
    pub fn to_local_string(&self) -> String {
        self.0
            .with_timezone(&Local)
            .format("%Y/%m/%d %H:%M:%S")
            .to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// A single field of a stored document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    String(String),
    Timestamp(Timestamp),
    /// Write-time sentinel; resolved by the platform clock on commit.
    ServerTimestamp,
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(value: Timestamp) -> Self {
        FieldValue::Timestamp(value)
    }
}

/// Field name → value, in a stable order.
pub type Fields = BTreeMap<String, FieldValue>;

/// Identifier assigned by the platform when a document is added.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Random auto-id in the platform's format (20 alphanumerics).
    pub fn generate() -> Self {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(DOCUMENT_ID_LEN)
            .map(char::from)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document as delivered in a query snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Fields,
}

impl Document {
    /// String field, or `""` when the field is missing or not a string.
    pub fn get_str(&self, name: &str) -> &str {
        match self.fields.get(name) {
            Some(FieldValue::String(s)) => s,
            _ => "",
        }
    }

    /// Resolved timestamp field; `None` while the server timestamp is pending.
    pub fn get_timestamp(&self, name: &str) -> Option<Timestamp> {
        match self.fields.get(name) {
            Some(FieldValue::Timestamp(ts)) => Some(*ts),
            _ => None,
        }
    }

    /// Whether any field still waits for its server timestamp.
    pub fn has_pending_writes(&self) -> bool {
        self.fields
            .values()
            .any(|value| matches!(value, FieldValue::ServerTimestamp))
    }
}

/// Slash-separated path of a collection: `posts`, `posts/{id}/comments`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionPath(Vec<String>);

impl CollectionPath {
    /// A top-level collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    /// A sub-collection nested under one document of this collection.
    pub fn child(&self, document: &DocumentId, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(document.as_str().to_string());
        segments.push(name.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Location of an object in storage: `images/abc_photo.png`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectPath(String);

impl ObjectPath {
    pub fn new(prefix: &str, file_name: &str) -> Self {
        Self(format!("{}/{}", prefix.trim_end_matches('/'), file_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A live query: every document of one collection, ordered by one field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedQuery {
    pub collection: CollectionPath,
    pub order_by: String,
    pub direction: Direction,
}

impl OrderedQuery {
    pub fn descending(collection: CollectionPath, order_by: impl Into<String>) -> Self {
        Self {
            collection,
            order_by: order_by.into(),
            direction: Direction::Descending,
        }
    }
}

/// The platform's user record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Identity providers available through the sign-in popup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FederatedProvider {
    Google,
}

impl FederatedProvider {
    pub fn id(&self) -> &'static str {
        match self {
            FederatedProvider::Google => "google.com",
        }
    }
}

/// Progress event emitted while an upload is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct UploadProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
}

impl UploadProgress {
    /// Completed share in `0.0..=1.0`; an empty upload counts as complete.
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            1.0
        } else {
            self.bytes_transferred as f64 / self.total_bytes as f64
        }
    }
}
