//! Comment model for storage and display.

use serde::{Deserialize, Serialize};

/// A comment on a gist. Append-only; ordered by `created_at` ascending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    /// Document ID assigned by the store (populated on reads)
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    pub content: String,
    /// UID of the commenting user
    pub author_id: String,
    #[serde(default)]
    pub author_email: Option<String>,
    /// The gist this comment belongs to
    pub gist_id: String,
    /// Client-assigned creation time (RFC 3339)
    pub created_at: String,
}
