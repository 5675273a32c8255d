// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Commenting on a gist.

use crate::db::FirestoreDb;
use crate::forms::{store_error_message, FormFeedback, SubmitGuard, SubmitResult};
use crate::models::Comment;
use crate::session::SessionStore;

/// Comment form values.
#[derive(Debug, Clone)]
pub struct CommentForm {
    pub content: String,
}

impl CommentForm {
    pub fn validate_all(&self) -> Result<(), FormFeedback> {
        if self.content.trim().is_empty() {
            Err(FormFeedback::field("content", "Comment cannot be empty"))
        } else {
            Ok(())
        }
    }
}

/// Orchestrates comment submission for the signed-in user.
pub struct CommentController {
    db: FirestoreDb,
    session: SessionStore,
    guard: SubmitGuard,
}

impl CommentController {
    pub fn new(db: FirestoreDb, session: SessionStore) -> Self {
        Self {
            db,
            session,
            guard: SubmitGuard::default(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_submitting()
    }

    pub async fn submit(&self, gist_id: &str, form: &CommentForm) -> SubmitResult<Comment> {
        if !self.guard.begin() {
            return SubmitResult::AlreadySubmitting;
        }
        let result = self.run(gist_id, form).await;
        self.guard.finish();
        result
    }

    async fn run(&self, gist_id: &str, form: &CommentForm) -> SubmitResult<Comment> {
        if let Err(feedback) = form.validate_all() {
            return SubmitResult::Failure(feedback);
        }

        let Some(identity) = self.session.snapshot().identity else {
            return SubmitResult::Failure(FormFeedback::form("You must be logged in to comment"));
        };

        match self.db.add_comment(gist_id, &identity, &form.content).await {
            Ok(comment) => SubmitResult::Success(comment),
            Err(err) => SubmitResult::Failure(FormFeedback::form(store_error_message(&err))),
        }
    }
}
