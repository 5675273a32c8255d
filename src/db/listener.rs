// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live comment subscription over the Firestore listen API.
//!
//! The backend's listen primitive cannot combine an equality filter with
//! the thread ordering in one target, so the listener watches the whole
//! `comments` collection and publishes full ordered snapshots; per-gist
//! filtering happens in the consuming feed. Traffic therefore scales with
//! platform-wide comment volume, not per-gist volume.

use crate::db::collections;
use crate::db::FirestoreDb;
use crate::error::StoreError;
use crate::models::Comment;
use crate::subscription::Subscription;
use dashmap::DashMap;
use firestore::{
    FirestoreListenEvent, FirestoreListener, FirestoreListenerTarget,
    FirestoreMemListenStateStorage,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

const COMMENTS_TARGET: u32 = 17;

/// Callback invoked with each full, ordered comment snapshot.
pub type SnapshotCallback = Arc<dyn Fn(&[Comment]) + Send + Sync>;

/// A standing subscription delivering full result snapshots of the
/// comments collection, ordered by creation time ascending (ties broken
/// by document ID). The order is part of the contract: consumers filter
/// but do not re-sort.
pub trait CommentStream {
    fn subscribe(&self, callback: SnapshotCallback) -> Subscription;
}

/// Live listener over the `comments` collection.
pub struct CommentListener {
    hub: Arc<StreamHub>,
    listener: FirestoreListener<firestore::FirestoreDb, FirestoreMemListenStateStorage>,
}

struct StreamHub {
    /// Current document set, keyed by document ID.
    docs: Mutex<HashMap<String, Comment>>,
    /// Set when document events arrived since the last publish.
    dirty: AtomicBool,
    listeners: DashMap<u64, SnapshotCallback>,
    next_id: AtomicU64,
    /// Latest published snapshot, replayed to late subscribers.
    last: Mutex<Option<Arc<Vec<Comment>>>>,
}

impl CommentListener {
    /// Open the listen stream. Document events accumulate and each batch
    /// boundary publishes one full snapshot to all subscribers.
    pub async fn start(db: &FirestoreDb) -> Result<Self, StoreError> {
        let client = db.get_client()?;

        let mut listener = client
            .create_listener(FirestoreMemListenStateStorage::new())
            .await
            .map_err(StoreError::from_firestore)?;

        client
            .fluent()
            .select()
            .from(collections::COMMENTS)
            .listen()
            .add_target(FirestoreListenerTarget::new(COMMENTS_TARGET), &mut listener)
            .map_err(StoreError::from_firestore)?;

        let hub = Arc::new(StreamHub {
            docs: Mutex::new(HashMap::new()),
            dirty: AtomicBool::new(false),
            listeners: DashMap::new(),
            next_id: AtomicU64::new(0),
            last: Mutex::new(None),
        });

        let event_hub = hub.clone();
        listener
            .start(move |event| {
                let hub = event_hub.clone();
                async move {
                    hub.handle_event(event);
                    Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
                }
            })
            .await
            .map_err(StoreError::from_firestore)?;

        tracing::info!("Comment listener started");
        Ok(Self { hub, listener })
    }

    /// Stop the listen stream. Subscribers receive nothing further.
    pub async fn shutdown(mut self) -> Result<(), StoreError> {
        self.listener
            .shutdown()
            .await
            .map_err(StoreError::from_firestore)
    }
}

impl CommentStream for CommentListener {
    fn subscribe(&self, callback: SnapshotCallback) -> Subscription {
        let id = self.hub.next_id.fetch_add(1, Ordering::SeqCst);

        // Replay the current snapshot so a view mounting mid-stream is
        // populated without waiting for the next change.
        let replay = self.hub.last.lock().unwrap().clone();
        if let Some(snapshot) = replay {
            callback(&snapshot);
        }

        self.hub.listeners.insert(id, callback);

        let hub = self.hub.clone();
        Subscription::new(move || {
            hub.listeners.remove(&id);
        })
    }
}

impl StreamHub {
    fn handle_event(&self, event: FirestoreListenEvent) {
        match event {
            FirestoreListenEvent::DocumentChange(change) => {
                if let Some(doc) = change.document {
                    match firestore::FirestoreDb::deserialize_doc_to::<Comment>(&doc) {
                        Ok(comment) => {
                            let doc_id = doc_id_from_path(&doc.name);
                            self.docs.lock().unwrap().insert(doc_id, comment);
                            self.dirty.store(true, Ordering::SeqCst);
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "Skipping undecodable comment document");
                        }
                    }
                }
            }
            FirestoreListenEvent::DocumentDelete(deleted) => {
                self.docs
                    .lock()
                    .unwrap()
                    .remove(&doc_id_from_path(&deleted.document));
                self.dirty.store(true, Ordering::SeqCst);
            }
            FirestoreListenEvent::DocumentRemove(removed) => {
                self.docs
                    .lock()
                    .unwrap()
                    .remove(&doc_id_from_path(&removed.document));
                self.dirty.store(true, Ordering::SeqCst);
            }
            // A target-change marker closes the current batch of document
            // events; publish one consistent snapshot for it.
            FirestoreListenEvent::TargetChange(_) => {
                if self.dirty.swap(false, Ordering::SeqCst) {
                    self.publish();
                }
            }
            _ => {}
        }
    }

    fn publish(&self) {
        let mut snapshot: Vec<Comment> = self.docs.lock().unwrap().values().cloned().collect();
        snapshot.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let snapshot = Arc::new(snapshot);
        *self.last.lock().unwrap() = Some(snapshot.clone());

        let callbacks: Vec<SnapshotCallback> =
            self.listeners.iter().map(|entry| entry.value().clone()).collect();

        tracing::debug!(
            comments = snapshot.len(),
            subscribers = callbacks.len(),
            "Publishing comment snapshot"
        );
        for callback in callbacks {
            callback(&snapshot);
        }
    }
}

/// Document resource names are full paths
/// ("projects/../documents/comments/{id}"); only the last segment is the ID.
fn doc_id_from_path(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_is_last_path_segment() {
        assert_eq!(
            doc_id_from_path("projects/p/databases/(default)/documents/comments/abc123"),
            "abc123"
        );
        assert_eq!(doc_id_from_path("abc123"), "abc123");
    }
}
