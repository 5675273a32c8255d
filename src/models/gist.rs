//! Gist model for storage and display.

use serde::{Deserialize, Serialize};

/// Gist visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GistVisibility {
    Public,
    Private,
}

/// A stored code snippet. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Gist {
    /// Document ID assigned by the store (populated on reads)
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    pub filename: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: GistVisibility,
    /// UID of the authoring user
    pub user_id: String,
    /// Client-assigned creation time (RFC 3339)
    pub created_at: String,
}

/// Input for creating a gist. The document ID and creation time are
/// assigned at write time.
#[derive(Debug, Clone)]
pub struct NewGist {
    pub filename: String,
    pub code: String,
    pub description: Option<String>,
    pub status: GistVisibility,
}
