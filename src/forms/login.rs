// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login: resolve the account's email from the profile collection, then
//! exchange credentials with the identity provider.

use crate::auth::AuthClient;
use crate::db::FirestoreDb;
use crate::error::AuthError;
use crate::forms::{store_error_message, FormFeedback, SubmitGuard, SubmitResult};
use crate::models::Identity;
use crate::session::SessionStore;
use std::sync::Arc;
use validator::Validate;

/// Login form values. The first field accepts an email address or a
/// username.
#[derive(Debug, Clone, Validate)]
pub struct LoginForm {
    pub email_or_username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl LoginForm {
    pub fn validate_all(&self) -> Result<(), FormFeedback> {
        let mut feedback = match self.validate() {
            Ok(()) => FormFeedback::default(),
            Err(errors) => FormFeedback::from_validation(&errors),
        };

        let needle = self.email_or_username.trim();
        if needle.is_empty() {
            feedback.set_field("email_or_username", "Email or username is required");
        } else if needle.contains('@') {
            if !is_email_shaped(needle) {
                feedback.set_field(
                    "email_or_username",
                    "Please enter a valid email address or username (at least 3 characters)",
                );
            }
        } else if needle.chars().count() < 3 {
            feedback.set_field(
                "email_or_username",
                "Please enter a valid email address or username (at least 3 characters)",
            );
        }

        if feedback.is_empty() {
            Ok(())
        } else {
            Err(feedback)
        }
    }
}

/// Loose email shape check: local@domain.tld, no whitespace.
fn is_email_shaped(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.split('.').count() >= 2
                && domain.split('.').all(|segment| !segment.is_empty())
        }
        _ => false,
    }
}

/// Orchestrates the login flow.
pub struct LoginController {
    auth: AuthClient,
    db: FirestoreDb,
    session: SessionStore,
    guard: SubmitGuard,
}

impl LoginController {
    pub fn new(auth: AuthClient, db: FirestoreDb, session: SessionStore) -> Self {
        Self {
            auth,
            db,
            session,
            guard: SubmitGuard::default(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_submitting()
    }

    pub async fn submit(&self, form: &LoginForm) -> SubmitResult<Arc<Identity>> {
        if !self.guard.begin() {
            return SubmitResult::AlreadySubmitting;
        }
        let result = self.run(form).await;
        self.guard.finish();
        result
    }

    async fn run(&self, form: &LoginForm) -> SubmitResult<Arc<Identity>> {
        if let Err(feedback) = form.validate_all() {
            return SubmitResult::Failure(feedback);
        }

        let needle = form.email_or_username.trim();
        let profile = match self.db.find_profile_by_email_or_username(needle).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                return SubmitResult::Failure(FormFeedback::form(
                    "Invalid credentials. Please check your email/username and password.",
                ));
            }
            Err(err) => {
                return SubmitResult::Failure(FormFeedback::form(store_error_message(&err)));
            }
        };

        // Authenticate with the email on record, whichever way the
        // account was looked up.
        match self.auth.sign_in(&profile.email, &form.password).await {
            Ok(identity) => {
                self.session.login(identity.clone());
                SubmitResult::Success(identity)
            }
            Err(err) => SubmitResult::Failure(feedback_for_auth_error(&err)),
        }
    }
}

/// Login-specific mapping of provider errors to messages. Credential
/// failures stay form-level so the response never reveals which half was
/// wrong.
fn feedback_for_auth_error(err: &AuthError) -> FormFeedback {
    match err {
        AuthError::InvalidCredentials => FormFeedback::form(
            "Invalid credentials. Please check your email/username and password.",
        ),
        AuthError::AccountDisabled => {
            FormFeedback::form("This account has been disabled. Please contact support.")
        }
        AuthError::RateLimited => {
            FormFeedback::form("Too many failed attempts. Please try again later.")
        }
        AuthError::Network(_) => FormFeedback::form(
            "Network error. Please check your internet connection and try again.",
        ),
        _ => FormFeedback::form("An unexpected error occurred. Please try again."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_email_shaped("user@example.com"));
        assert!(is_email_shaped("a.b@sub.example.org"));
        assert!(!is_email_shaped("user@example"));
        assert!(!is_email_shaped("@example.com"));
        assert!(!is_email_shaped("user@"));
        assert!(!is_email_shaped("us er@example.com"));
        assert!(!is_email_shaped("a@b@c.com"));
    }

    #[test]
    fn username_needs_three_chars() {
        let form = LoginForm {
            email_or_username: "ab".to_string(),
            password: "secret123".to_string(),
        };
        let feedback = form.validate_all().unwrap_err();
        assert!(feedback.field_errors.contains_key("email_or_username"));
    }

    #[test]
    fn email_input_must_be_email_shaped() {
        let form = LoginForm {
            email_or_username: "broken@nodomain".to_string(),
            password: "secret123".to_string(),
        };
        assert!(form.validate_all().is_err());
    }

    #[test]
    fn short_password_is_rejected() {
        let form = LoginForm {
            email_or_username: "someone".to_string(),
            password: "short".to_string(),
        };
        let feedback = form.validate_all().unwrap_err();
        assert!(feedback.field_errors.contains_key("password"));
    }

    #[test]
    fn valid_inputs_pass() {
        for needle in ["user@example.com", "username"] {
            let form = LoginForm {
                email_or_username: needle.to_string(),
                password: "secret123".to_string(),
            };
            assert!(form.validate_all().is_ok(), "{needle} should validate");
        }
    }

    #[test]
    fn credential_failures_stay_form_level() {
        let feedback = feedback_for_auth_error(&AuthError::InvalidCredentials);
        assert!(feedback.field_errors.is_empty());
        assert!(feedback.form_error.unwrap().contains("Invalid credentials"));
    }
}
