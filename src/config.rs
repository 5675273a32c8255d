//! Application configuration loaded from environment variables.
//!
//! The Firebase web API key is a public identifier, not a secret; access
//! control lives in the backend's security rules.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase web API key (public)
    pub firebase_api_key: String,
    /// Firebase / GCP project ID
    pub firebase_project_id: String,
    /// Identity Toolkit emulator host (e.g. "localhost:9099"), if set
    pub auth_emulator_host: Option<String>,
    /// Previously persisted session token to restore, if any
    pub saved_id_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            firebase_api_key: env::var("FIREBASE_API_KEY")
                .map_err(|_| ConfigError::Missing("FIREBASE_API_KEY"))?,
            firebase_project_id: env::var("FIREBASE_PROJECT_ID")
                .unwrap_or_else(|_| "local-dev".to_string()),
            auth_emulator_host: env::var("FIREBASE_AUTH_EMULATOR_HOST").ok(),
            saved_id_token: env::var("FIREBASE_SAVED_ID_TOKEN").ok(),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            firebase_api_key: "test-api-key".to_string(),
            firebase_project_id: "test-project".to_string(),
            auth_emulator_host: None,
            saved_id_token: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("FIREBASE_API_KEY", "test_key");
        env::set_var("FIREBASE_PROJECT_ID", "gistbin-test");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.firebase_api_key, "test_key");
        assert_eq!(config.firebase_project_id, "gistbin-test");
    }
}
