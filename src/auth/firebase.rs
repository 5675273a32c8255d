// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Auth REST client.
//!
//! Handles:
//! - Email/password sign-up and sign-in (Identity Toolkit v1)
//! - Restoring a previously saved session token
//! - Publishing status events to the session store
//!
//! Error codes returned by the service are a stable taxonomy; unknown
//! codes degrade to a generic service error rather than failing hard.

use crate::auth::{AuthStatus, StatusCallback, StatusSource};
use crate::config::Config;
use crate::error::AuthError;
use crate::models::Identity;
use crate::subscription::Subscription;
use anyhow::Context;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const PROD_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Firebase Auth client.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    saved_id_token: Option<String>,
    hub: Arc<StatusHub>,
}

/// Fan-out of status events to subscribers, with replay of the latest
/// status for late subscribers.
struct StatusHub {
    listeners: DashMap<u64, StatusCallback>,
    next_id: AtomicU64,
    last: Mutex<Option<AuthStatus>>,
}

impl StatusHub {
    fn new() -> Self {
        Self {
            listeners: DashMap::new(),
            next_id: AtomicU64::new(0),
            last: Mutex::new(None),
        }
    }

    fn emit(&self, status: AuthStatus) {
        *self.last.lock().unwrap() = Some(status.clone());

        // Snapshot the callbacks before invoking so a subscriber may
        // re-enter the registry without holding any shard lock.
        let callbacks: Vec<StatusCallback> =
            self.listeners.iter().map(|entry| entry.value().clone()).collect();
        for callback in callbacks {
            callback(status.clone());
        }
    }
}

impl AuthClient {
    /// Create a new auth client.
    ///
    /// For local development with the Auth emulator, set
    /// FIREBASE_AUTH_EMULATOR_HOST.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building auth HTTP client")?;

        let base_url = match &config.auth_emulator_host {
            Some(host) => {
                tracing::info!(host = %host, "Using Firebase Auth emulator");
                format!("http://{}/identitytoolkit.googleapis.com/v1", host)
            }
            None => PROD_BASE_URL.to_string(),
        };

        Ok(Self {
            http,
            base_url,
            api_key: config.firebase_api_key.clone(),
            saved_id_token: config.saved_id_token.clone(),
            hub: Arc::new(StatusHub::new()),
        })
    }

    /// Resolve the initial authentication status in the background.
    ///
    /// With a saved token, the provider is asked to verify it; without
    /// one, the stream resolves to anonymous immediately. If the provider
    /// cannot be reached, no event is emitted and consumers keep showing
    /// their loading state until an event eventually arrives.
    pub fn resolve_initial_status(&self) {
        let client = self.clone();
        tokio::spawn(async move {
            let Some(token) = client.saved_id_token.clone() else {
                client.hub.emit(None);
                return;
            };

            match client.lookup(&token).await {
                Ok(Some(identity)) => client.hub.emit(Some(Arc::new(identity))),
                Ok(None) => client.hub.emit(None),
                Err(AuthError::Network(err)) => {
                    tracing::warn!(
                        error = %err,
                        "Initial auth status check unreachable; session stays unresolved"
                    );
                }
                Err(err) => {
                    tracing::debug!(error = %err, "Saved session token rejected");
                    client.hub.emit(None);
                }
            }
        });
    }

    /// Exchange credentials for a new account.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Arc<Identity>, AuthError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let credentials: CredentialResponse = self.post("accounts:signUp", &body).await?;
        let identity = Arc::new(Identity {
            uid: credentials.local_id,
            email: credentials.email.or_else(|| Some(email.to_string())),
            display_name: credentials.display_name,
        });

        tracing::info!(uid = %identity.uid, "Signed up");
        self.hub.emit(Some(identity.clone()));
        Ok(identity)
    }

    /// Exchange credentials for an existing account's identity.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Arc<Identity>, AuthError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let credentials: CredentialResponse =
            self.post("accounts:signInWithPassword", &body).await?;
        let identity = Arc::new(Identity {
            uid: credentials.local_id,
            email: credentials.email.or_else(|| Some(email.to_string())),
            display_name: credentials.display_name,
        });

        tracing::info!(uid = %identity.uid, "Signed in");
        self.hub.emit(Some(identity.clone()));
        Ok(identity)
    }

    /// Sign out.
    ///
    /// The hosted provider keeps no server-side session for this flow;
    /// discarding the credentials locally and pushing an anonymous status
    /// is the whole operation.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        tracing::info!("Signed out");
        self.hub.emit(None);
        Ok(())
    }

    /// Verify a saved session token and return its identity, or `None`
    /// if the provider no longer knows the account.
    async fn lookup(&self, id_token: &str) -> Result<Option<Identity>, AuthError> {
        let body = serde_json::json!({ "idToken": id_token });
        let response: LookupResponse = self.post("accounts:lookup", &body).await?;

        Ok(response.users.unwrap_or_default().into_iter().next().map(|user| Identity {
            uid: user.local_id,
            email: user.email,
            display_name: user.display_name,
        }))
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<T, AuthError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| AuthError::Service(format!("invalid auth response: {e}")));
        }

        let error_body: ApiErrorBody = response.json().await.unwrap_or_default();
        let code = error_body
            .error
            .map(|detail| detail.message)
            .unwrap_or_else(|| format!("HTTP {status}"));

        Err(map_provider_code(&code))
    }
}

impl StatusSource for AuthClient {
    fn subscribe_status(&self, callback: StatusCallback) -> Subscription {
        let id = self.hub.next_id.fetch_add(1, Ordering::SeqCst);

        // Replay the latest status so a late subscriber resolves
        // immediately instead of waiting for the next event.
        let replay = self.hub.last.lock().unwrap().clone();
        if let Some(status) = replay {
            callback(status);
        }

        self.hub.listeners.insert(id, callback);

        let hub = self.hub.clone();
        Subscription::new(move || {
            hub.listeners.remove(&id);
        })
    }
}

/// Map a provider error code to the taxonomy.
///
/// Codes sometimes carry a human-readable suffix
/// ("WEAK_PASSWORD : Password should be ..."); only the leading token is
/// significant.
pub fn map_provider_code(code: &str) -> AuthError {
    let token = code.split([' ', ':']).next().unwrap_or(code);
    match token {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
        | "INVALID_EMAIL" => AuthError::InvalidCredentials,
        "EMAIL_EXISTS" => AuthError::EmailInUse,
        "USER_DISABLED" => AuthError::AccountDisabled,
        "WEAK_PASSWORD" => AuthError::WeakPassword,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::RateLimited,
        "OPERATION_NOT_ALLOWED" => AuthError::OperationNotAllowed,
        _ => AuthError::Service(code.to_string()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Option<Vec<LookupUser>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
