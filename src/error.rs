// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error taxonomies for the two hosted backends.
//!
//! Identity-provider failures and document-store failures are distinct
//! enumerations; controllers map both to user-facing text and nothing in
//! this crate treats either as fatal to the process.

/// Identity provider failures, mapped from the auth service's stable
/// error-code taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Account disabled")]
    AccountDisabled,

    #[error("Password too weak")]
    WeakPassword,

    #[error("Too many attempts")]
    RateLimited,

    #[error("Operation not allowed")]
    OperationNotAllowed,

    #[error("Auth service unreachable: {0}")]
    Network(String),

    #[error("Auth service error: {0}")]
    Service(String),
}

/// Document store failures.
///
/// Recognized gRPC status classes get their own variants; everything else
/// collapses into `Backend`. Not-found is not an error here — reads
/// return `Option`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Store temporarily unavailable")]
    Unavailable,

    #[error("Store deadline exceeded")]
    DeadlineExceeded,

    #[error("Invalid input: {0}")]
    InvalidArgument(String),

    #[error("Store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Classify a `firestore` crate error into the taxonomy above.
    pub(crate) fn from_firestore(err: firestore::errors::FirestoreError) -> Self {
        use firestore::errors::FirestoreError;

        match &err {
            FirestoreError::DatabaseError(db_err) => match db_err.public.code.as_str() {
                "PermissionDenied" => StoreError::PermissionDenied,
                "Unavailable" => StoreError::Unavailable,
                "DeadlineExceeded" => StoreError::DeadlineExceeded,
                _ => StoreError::Backend(err.to_string()),
            },
            FirestoreError::NetworkError(_) => StoreError::Unavailable,
            FirestoreError::InvalidParametersError(_) => {
                StoreError::InvalidArgument(err.to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// Outcome of the check-then-act profile creation.
///
/// The two uniqueness checks are separate read queries before the write;
/// a concurrent registration can slip a duplicate through that window and
/// the store itself enforces no uniqueness constraint, so these variants
/// are best-effort precondition results, not guarantees.
#[derive(Debug, thiserror::Error)]
pub enum CreateProfileError {
    #[error("An account with this email address already exists")]
    EmailTaken,

    #[error("This username is already taken")]
    UsernameTaken,

    #[error(transparent)]
    Store(#[from] StoreError),
}
