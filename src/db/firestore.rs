// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - User profiles (registration, login lookups)
//! - Gists (create, list, fetch)
//! - Comments (append to a gist's thread)
//!
//! The store performs no validation or uniqueness enforcement of its own;
//! this layer is the sole enforcement point.

use crate::db::collections;
use crate::error::{CreateProfileError, StoreError};
use crate::models::{Comment, Gist, Identity, NewGist, UserProfile};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without
        // needing a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Backend(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    pub(crate) fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client
            .as_ref()
            .ok_or_else(|| StoreError::Backend("Database not connected (offline mode)".to_string()))
    }

    // ─── Gist Operations ─────────────────────────────────────────

    /// Create a gist. The store assigns the document ID; the creation
    /// time is the client clock at call time.
    pub async fn create_gist(&self, input: &NewGist, author_uid: &str) -> Result<Gist, StoreError> {
        if input.filename.trim().is_empty() {
            return Err(StoreError::InvalidArgument(
                "gist filename must not be empty".to_string(),
            ));
        }
        if input.code.trim().is_empty() {
            return Err(StoreError::InvalidArgument(
                "gist content must not be empty".to_string(),
            ));
        }

        let gist = Gist {
            id: String::new(),
            filename: input.filename.clone(),
            code: input.code.clone(),
            description: input.description.clone(),
            status: input.status,
            user_id: author_uid.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let created: Gist = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::GISTS)
            .generate_document_id()
            .object(&gist)
            .execute()
            .await
            .map_err(StoreError::from_firestore)?;

        tracing::debug!(gist_id = %created.id, user = author_uid, "Gist created");
        Ok(created)
    }

    /// Get a user's gists, newest first. An empty result is not an error.
    pub async fn list_gists_by_user(&self, uid: &str) -> Result<Vec<Gist>, StoreError> {
        let uid = uid.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::GISTS)
            .filter(move |q| q.field("user_id").eq(uid.clone()))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(StoreError::from_firestore)
    }

    /// Get a gist by ID. `None` is the not-found signal, distinct from a
    /// transport failure.
    pub async fn get_gist(&self, gist_id: &str) -> Result<Option<Gist>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::GISTS)
            .obj()
            .one(gist_id)
            .await
            .map_err(StoreError::from_firestore)
    }

    // ─── User Profile Operations ─────────────────────────────────

    /// Find a profile by registered email.
    pub async fn find_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        let email = email.to_string();
        let matches: Vec<UserProfile> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("email").eq(email.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(StoreError::from_firestore)?;

        Ok(matches.into_iter().next())
    }

    /// Find a profile by username.
    pub async fn find_profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        let username = username.to_string();
        let matches: Vec<UserProfile> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("username").eq(username.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(StoreError::from_firestore)?;

        Ok(matches.into_iter().next())
    }

    /// Resolve a profile by email or username (login lookup).
    pub async fn find_profile_by_email_or_username(
        &self,
        needle: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        if let Some(profile) = self.find_profile_by_email(needle).await? {
            return Ok(Some(profile));
        }
        self.find_profile_by_username(needle).await
    }

    /// Create a user profile after checking both uniqueness preconditions.
    ///
    /// The email check and the username check are separate read queries
    /// before the write; a concurrent registration can still slip a
    /// duplicate through the window between check and write.
    pub async fn create_user_profile(
        &self,
        identity: &Identity,
        username: &str,
    ) -> Result<UserProfile, CreateProfileError> {
        let email = identity.email.clone().ok_or_else(|| {
            CreateProfileError::Store(StoreError::InvalidArgument(
                "identity has no email address".to_string(),
            ))
        })?;

        if self.find_profile_by_email(&email).await?.is_some() {
            return Err(CreateProfileError::EmailTaken);
        }
        if self.find_profile_by_username(username).await?.is_some() {
            return Err(CreateProfileError::UsernameTaken);
        }

        let profile = UserProfile {
            id: String::new(),
            uid: identity.uid.clone(),
            email,
            username: username.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let created: UserProfile = self
            .get_client()
            .map_err(CreateProfileError::Store)?
            .fluent()
            .insert()
            .into(collections::USERS)
            .generate_document_id()
            .object(&profile)
            .execute()
            .await
            .map_err(|e| CreateProfileError::Store(StoreError::from_firestore(e)))?;

        tracing::info!(uid = %created.uid, username = %created.username, "User profile created");
        Ok(created)
    }

    // ─── Comment Operations ──────────────────────────────────────

    /// Append a comment to a gist's thread.
    pub async fn add_comment(
        &self,
        gist_id: &str,
        author: &Identity,
        content: &str,
    ) -> Result<Comment, StoreError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(StoreError::InvalidArgument(
                "comment content must not be empty".to_string(),
            ));
        }

        let comment = Comment {
            id: String::new(),
            content: content.to_string(),
            author_id: author.uid.clone(),
            author_email: author.email.clone(),
            gist_id: gist_id.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let created: Comment = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::COMMENTS)
            .generate_document_id()
            .object(&comment)
            .execute()
            .await
            .map_err(StoreError::from_firestore)?;

        tracing::debug!(comment_id = %created.id, gist_id, "Comment added");
        Ok(created)
    }
}
