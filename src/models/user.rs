//! User profile model for storage.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore, one per identity.
///
/// `uid` is the natural key. Username uniqueness is enforced only by the
/// client's pre-write existence check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    /// Document ID assigned by the store (populated on reads)
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    /// Identity UID from the auth provider
    pub uid: String,
    /// Email address registered with the provider
    pub email: String,
    /// Chosen username
    pub username: String,
    /// When the profile was created (RFC 3339)
    pub created_at: String,
}
