// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider client.

pub mod firebase;

pub use firebase::AuthClient;

use crate::models::Identity;
use crate::subscription::Subscription;
use std::sync::Arc;

/// One authentication status event: `Some` while signed in, `None` when
/// signed out.
pub type AuthStatus = Option<Arc<Identity>>;

/// Callback invoked on every authentication status event.
pub type StatusCallback = Arc<dyn Fn(AuthStatus) + Send + Sync>;

/// A source of authentication status events.
///
/// The first delivered event resolves the session. Implementations replay
/// the latest status to subscribers that register after one exists, so a
/// late-attached consumer is never stuck unresolved behind an event it
/// missed.
pub trait StatusSource {
    fn subscribe_status(&self, callback: StatusCallback) -> Subscription;
}
