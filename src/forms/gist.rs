// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gist creation.

use crate::db::FirestoreDb;
use crate::forms::{store_error_message, FormFeedback, SubmitGuard, SubmitResult};
use crate::models::{Gist, GistVisibility, NewGist};
use crate::session::SessionStore;
use validator::Validate;

/// Create-gist form values.
#[derive(Debug, Clone, Validate)]
pub struct GistForm {
    #[validate(length(min = 1, message = "Gist name is required"))]
    pub filename: String,
    #[validate(length(min = 1, message = "Code content is required"))]
    pub code: String,
    pub description: Option<String>,
    pub status: GistVisibility,
}

/// Orchestrates gist creation for the signed-in user.
pub struct CreateGistController {
    db: FirestoreDb,
    session: SessionStore,
    guard: SubmitGuard,
}

impl CreateGistController {
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

    pub async fn submit(&self, form: &GistForm) -> SubmitResult<Gist> {
        if !self.guard.begin() {
            return SubmitResult::AlreadySubmitting;
        }
        let result = self.run(form).await;
        self.guard.finish();
        result
    }

    async fn run(&self, form: &GistForm) -> SubmitResult<Gist> {
        if let Err(errors) = form.validate() {
            return SubmitResult::Failure(FormFeedback::from_validation(&errors));
        }

        let Some(identity) = self.session.snapshot().identity else {
            return SubmitResult::Failure(FormFeedback::form(
                "You must be logged in to create a gist",
            ));
        };

        let input = NewGist {
            filename: form.filename.clone(),
            code: form.code.clone(),
            description: form.description.clone(),
            status: form.status,
        };

        match self.db.create_gist(&input, &identity.uid).await {
            Ok(gist) => SubmitResult::Success(gist),
            Err(err) => SubmitResult::Failure(FormFeedback::form(store_error_message(&err))),
        }
    }
}
