// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod comment;
pub mod gist;
pub mod identity;
pub mod user;

pub use comment::Comment;
pub use gist::{Gist, GistVisibility, NewGist};
pub use identity::Identity;
pub use user::UserProfile;
