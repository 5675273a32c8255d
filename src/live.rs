// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live projection of a gist's comment thread.
//!
//! The feed subscribes to a comment snapshot stream for the lifetime of a
//! mounted detail view. On every delivered snapshot, the full matching
//! set is rebuilt and replaces the prior projection; there is no
//! incremental patching and no stale-entry retention. The stream's
//! declared order (global creation time) is preserved through the filter,
//! never re-derived here.

use crate::db::listener::{CommentStream, SnapshotCallback};
use crate::models::Comment;
use crate::subscription::Subscription;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type FeedCallback = Arc<dyn Fn(&[Comment]) + Send + Sync>;

/// Always-current view of one gist's comments.
pub struct CommentFeed {
    inner: Arc<FeedInner>,
    stream_sub: Mutex<Option<Subscription>>,
}

struct FeedInner {
    gist_id: String,
    comments: Mutex<Vec<Comment>>,
    listeners: DashMap<u64, FeedCallback>,
    next_listener: AtomicU64,
    /// Set on unmount; deliveries already in flight are dropped, not
    /// applied.
    detached: AtomicBool,
}

impl CommentFeed {
    /// Mount a feed for one gist. Exactly one stream subscription is held
    /// per mounted feed; to view a different gist, unmount and mount a
    /// new feed.
    pub fn mount(gist_id: impl Into<String>, stream: &dyn CommentStream) -> Self {
        let inner = Arc::new(FeedInner {
            gist_id: gist_id.into(),
            comments: Mutex::new(Vec::new()),
            listeners: DashMap::new(),
            next_listener: AtomicU64::new(0),
            detached: AtomicBool::new(false),
        });

        let apply_inner = inner.clone();
        let callback: SnapshotCallback =
            Arc::new(move |snapshot: &[Comment]| apply_inner.apply(snapshot));
        let sub = stream.subscribe(callback);

        Self {
            inner,
            stream_sub: Mutex::new(Some(sub)),
        }
    }

    pub fn gist_id(&self) -> &str {
        &self.inner.gist_id
    }

    /// The current projection.
    pub fn comments(&self) -> Vec<Comment> {
        self.inner.comments.lock().unwrap().clone()
    }

    /// Register a callback invoked with each replaced projection.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[Comment]) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener.fetch_add(1, Ordering::SeqCst);
        self.inner.listeners.insert(id, Arc::new(callback));

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.listeners.remove(&id);
            }
        })
    }

    /// Detach from the stream synchronously. Snapshots delivered after
    /// this point are ignored; no state is written, no listener fires.
    pub fn unmount(&self) {
        self.inner.detached.store(true, Ordering::SeqCst);
        if let Some(sub) = self.stream_sub.lock().unwrap().take() {
            sub.cancel();
        }
    }
}

impl Drop for CommentFeed {
    fn drop(&mut self) {
        self.inner.detached.store(true, Ordering::SeqCst);
    }
}

impl FeedInner {
    fn apply(&self, snapshot: &[Comment]) {
        if self.detached.load(Ordering::SeqCst) {
            tracing::debug!(gist_id = %self.gist_id, "Dropping snapshot for unmounted feed");
            return;
        }

        // Client-side filter; relative order within a gist is exactly the
        // stream's global order.
        let projection: Vec<Comment> = snapshot
            .iter()
            .filter(|comment| comment.gist_id == self.gist_id)
            .cloned()
            .collect();

        *self.comments.lock().unwrap() = projection.clone();

        let callbacks: Vec<FeedCallback> =
            self.listeners.iter().map(|entry| entry.value().clone()).collect();
        for callback in callbacks {
            callback(&projection);
        }
    }
}
