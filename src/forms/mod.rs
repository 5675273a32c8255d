// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Form controllers: validated writes with field-level error mapping.
//!
//! Each controller validates its input against declared rules, drives
//! the query layer and/or the identity provider, and converts every known
//! backend failure into field-level or form-level text. Nothing here
//! propagates a backend failure upward; the worst outcome is a retryable
//! message.

pub mod comment;
pub mod gist;
pub mod login;
pub mod registration;

pub use comment::{CommentController, CommentForm};
pub use gist::{CreateGistController, GistForm};
pub use login::{LoginController, LoginForm};
pub use registration::{RegistrationController, RegistrationForm};

use crate::error::StoreError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Field-level and form-level messages for one failed submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFeedback {
    pub field_errors: HashMap<String, String>,
    pub form_error: Option<String>,
}

impl FormFeedback {
    pub fn field(name: &str, message: impl Into<String>) -> Self {
        let mut feedback = Self::default();
        feedback
            .field_errors
            .insert(name.to_string(), message.into());
        feedback
    }

    pub fn form(message: impl Into<String>) -> Self {
        Self {
            field_errors: HashMap::new(),
            form_error: Some(message.into()),
        }
    }

    /// Record a field message unless the field already has one (earlier
    /// rules win).
    pub fn set_field(&mut self, name: &str, message: impl Into<String>) {
        self.field_errors
            .entry(name.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty() && self.form_error.is_none()
    }

    /// First declared message per field from derive-checked rules.
    pub(crate) fn from_validation(errors: &validator::ValidationErrors) -> Self {
        let mut feedback = Self::default();
        for (field, field_errors) in errors.field_errors() {
            if let Some(first) = field_errors.first() {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                feedback.field_errors.insert(field.to_string(), message);
            }
        }
        feedback
    }
}

/// One submission attempt's outcome.
#[derive(Debug)]
pub enum SubmitResult<T> {
    Success(T),
    Failure(FormFeedback),
    /// A submission from this controller instance is already in flight.
    AlreadySubmitting,
}

/// Guards one controller instance against duplicate concurrent
/// submission.
#[derive(Debug, Default)]
pub(crate) struct SubmitGuard {
    in_flight: AtomicBool,
}

impl SubmitGuard {
    pub(crate) fn begin(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub(crate) fn finish(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }

    pub(crate) fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Map a store failure to the user-facing message for a form.
pub(crate) fn store_error_message(err: &StoreError) -> String {
    match err {
        StoreError::PermissionDenied => "Permission denied. Please contact support.".to_string(),
        StoreError::Unavailable => {
            "Database service is temporarily unavailable. Please try again later.".to_string()
        }
        StoreError::DeadlineExceeded => {
            "Request timed out. Please check your connection and try again.".to_string()
        }
        StoreError::InvalidArgument(message) => message.clone(),
        StoreError::Backend(_) => "An unexpected error occurred. Please try again.".to_string(),
    }
}
