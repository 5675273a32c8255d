// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Gistbin client core: session state, route guards, and live data
//! synchronization for a code-snippet sharing app.
//!
//! The crate talks to two hosted services: Firebase Auth (identity) over
//! its REST surface and Cloud Firestore (documents) via the `firestore`
//! crate. Rendering, styling, and the routing engine itself live outside
//! this crate; what lives here is everything with state, ordering, and
//! consistency concerns.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod guards;
pub mod live;
pub mod models;
pub mod session;
pub mod subscription;

use auth::AuthClient;
use config::Config;
use db::FirestoreDb;
use session::SessionStore;

/// Shared application context, constructed once at startup and passed by
/// reference through the component tree.
pub struct App {
    pub config: Config,
    pub auth: AuthClient,
    pub db: FirestoreDb,
    pub session: SessionStore,
}

impl App {
    /// Wire up the client: connect Firestore, build the auth client,
    /// attach the session store to the provider's status stream, and kick
    /// off initial status resolution.
    pub async fn bootstrap(config: Config) -> anyhow::Result<Self> {
        let db = FirestoreDb::new(&config.firebase_project_id).await?;
        let auth = AuthClient::new(&config)?;

        let session = SessionStore::new();
        session.attach(&auth);
        auth.resolve_initial_status();

        Ok(Self {
            config,
            auth,
            db,
            session,
        })
    }

    /// Sign out. The session is cleared optimistically even when the
    /// provider call does not confirm.
    pub async fn sign_out(&self) {
        if let Err(err) = self.auth.sign_out().await {
            tracing::warn!(error = %err, "Provider sign-out failed; clearing session anyway");
        }
        self.session.logout();
    }
}
