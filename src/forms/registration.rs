// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration: new credentials with the identity provider, then a user
//! profile document, then an optimistic login.

use crate::auth::AuthClient;
use crate::db::FirestoreDb;
use crate::error::{AuthError, CreateProfileError};
use crate::forms::{store_error_message, FormFeedback, SubmitGuard, SubmitResult};
use crate::models::Identity;
use crate::session::SessionStore;
use std::sync::Arc;
use validator::Validate;

/// Registration form values.
#[derive(Debug, Clone, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Declared rules plus the checks the derive cannot express
    /// (username charset, password character classes, confirmation).
    pub fn validate_all(&self) -> Result<(), FormFeedback> {
        let mut feedback = match self.validate() {
            Ok(()) => FormFeedback::default(),
            Err(errors) => FormFeedback::from_validation(&errors),
        };

        if !self.username.is_empty()
            && !self
                .username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            feedback.set_field(
                "username",
                "Username can only contain letters, numbers, hyphens, and underscores",
            );
        }

        let has_lower = self.password.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = self.password.chars().any(|c| c.is_ascii_uppercase());
        let has_digit = self.password.chars().any(|c| c.is_ascii_digit());
        if !self.password.is_empty() && !(has_lower && has_upper && has_digit) {
            feedback.set_field(
                "password",
                "Password must contain at least one uppercase letter, one lowercase letter, and one number",
            );
        }

        if self.confirm_password.is_empty() {
            feedback.set_field("confirm_password", "Please confirm your password");
        } else if self.confirm_password != self.password {
            feedback.set_field("confirm_password", "Passwords do not match");
        }

        if feedback.is_empty() {
            Ok(())
        } else {
            Err(feedback)
        }
    }
}

/// Orchestrates the registration flow.
pub struct RegistrationController {
    auth: AuthClient,
    db: FirestoreDb,
    session: SessionStore,
    guard: SubmitGuard,
}

impl RegistrationController {
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

    pub async fn submit(&self, form: &RegistrationForm) -> SubmitResult<Arc<Identity>> {
        if !self.guard.begin() {
            return SubmitResult::AlreadySubmitting;
        }
        let result = self.run(form).await;
        self.guard.finish();
        result
    }

    async fn run(&self, form: &RegistrationForm) -> SubmitResult<Arc<Identity>> {
        if let Err(feedback) = form.validate_all() {
            return SubmitResult::Failure(feedback);
        }

        let identity = match self.auth.sign_up(&form.email, &form.password).await {
            Ok(identity) => identity,
            Err(err) => return SubmitResult::Failure(feedback_for_auth_error(&err)),
        };

        match self.db.create_user_profile(&identity, &form.username).await {
            Ok(_) => {
                self.session.login(identity.clone());
                SubmitResult::Success(identity)
            }
            Err(CreateProfileError::EmailTaken) => SubmitResult::Failure(FormFeedback::field(
                "email",
                "An account with this email address already exists.",
            )),
            Err(CreateProfileError::UsernameTaken) => SubmitResult::Failure(FormFeedback::field(
                "username",
                "This username is already taken. Please choose a different one.",
            )),
            Err(CreateProfileError::Store(err)) => {
                SubmitResult::Failure(FormFeedback::form(store_error_message(&err)))
            }
        }
    }
}

/// Registration-specific mapping of provider errors to messages.
fn feedback_for_auth_error(err: &AuthError) -> FormFeedback {
    match err {
        AuthError::EmailInUse => FormFeedback::field(
            "email",
            "An account with this email address already exists. Please use a different email or try signing in.",
        ),
        AuthError::InvalidCredentials => {
            FormFeedback::field("email", "Please enter a valid email address.")
        }
        AuthError::WeakPassword => FormFeedback::field(
            "password",
            "Password is too weak. Please choose a stronger password with at least 8 characters.",
        ),
        AuthError::OperationNotAllowed => FormFeedback::form(
            "Email/password accounts are not enabled. Please contact support.",
        ),
        AuthError::RateLimited => {
            FormFeedback::form("Too many failed attempts. Please try again later.")
        }
        AuthError::AccountDisabled => {
            FormFeedback::form("This account has been disabled. Please contact support.")
        }
        AuthError::Network(_) => FormFeedback::form(
            "Network error. Please check your internet connection and try again.",
        ),
        AuthError::Service(_) => {
            FormFeedback::form("An unexpected error occurred. Please try again.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> RegistrationForm {
        RegistrationForm {
            username: "code_fan-1".to_string(),
            email: "fan@example.com".to_string(),
            password: "Sup3rSecret".to_string(),
            confirm_password: "Sup3rSecret".to_string(),
        }
    }

    #[test]
    fn valid_form_passes() {
        assert!(valid_form().validate_all().is_ok());
    }

    #[test]
    fn short_username_is_rejected() {
        let mut form = valid_form();
        form.username = "ab".to_string();
        let feedback = form.validate_all().unwrap_err();
        assert!(feedback.field_errors.contains_key("username"));
    }

    #[test]
    fn username_charset_is_enforced() {
        let mut form = valid_form();
        form.username = "bad name!".to_string();
        let feedback = form.validate_all().unwrap_err();
        assert!(feedback.field_errors["username"].contains("letters, numbers"));
    }

    #[test]
    fn invalid_email_is_rejected() {
        let mut form = valid_form();
        form.email = "not-an-email".to_string();
        let feedback = form.validate_all().unwrap_err();
        assert!(feedback.field_errors.contains_key("email"));
    }

    #[test]
    fn password_needs_all_character_classes() {
        let mut form = valid_form();
        form.password = "alllowercase1".to_string();
        form.confirm_password = form.password.clone();
        let feedback = form.validate_all().unwrap_err();
        assert!(feedback.field_errors["password"].contains("uppercase"));
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let mut form = valid_form();
        form.confirm_password = "Different1".to_string();
        let feedback = form.validate_all().unwrap_err();
        assert_eq!(
            feedback.field_errors["confirm_password"],
            "Passwords do not match"
        );
    }

    #[test]
    fn provider_errors_map_to_fields() {
        let feedback = feedback_for_auth_error(&AuthError::EmailInUse);
        assert!(feedback.field_errors.contains_key("email"));

        let feedback = feedback_for_auth_error(&AuthError::WeakPassword);
        assert!(feedback.field_errors.contains_key("password"));

        let feedback = feedback_for_auth_error(&AuthError::RateLimited);
        assert!(feedback.form_error.is_some());
    }
}
