// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-wide authentication state.
//!
//! The store is the single source of truth for "who is logged in". It is
//! written only by login/logout actions and by identity-provider status
//! events; every other component reads snapshots. Construct one store,
//! pass it by reference — there is no ambient global.

use crate::auth::{AuthStatus, StatusCallback, StatusSource};
use crate::models::Identity;
use crate::subscription::Subscription;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Immutable view of the session at a point in time.
///
/// While `is_resolving` is true, `identity` may hold a cached value that
/// an in-flight provider check has not yet confirmed; consumers must gate
/// UI decisions on `is_resolving` alone.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub identity: Option<Arc<Identity>>,
    pub is_authenticated: bool,
    pub is_resolving: bool,
}

impl SessionSnapshot {
    fn initial() -> Self {
        Self {
            identity: None,
            is_authenticated: false,
            is_resolving: true,
        }
    }
}

type SessionCallback = Arc<dyn Fn(&SessionSnapshot) + Send + Sync>;

/// Reactive session store.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<SessionSnapshot>,
    listeners: DashMap<u64, SessionCallback>,
    next_listener: AtomicU64,
    /// The one live provider subscription for this store's lifetime.
    provider_sub: Mutex<Option<Subscription>>,
}

impl SessionStore {
    /// Create a store in the resolving state.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SessionSnapshot::initial()),
                listeners: DashMap::new(),
                next_listener: AtomicU64::new(0),
                provider_sub: Mutex::new(None),
            }),
        }
    }

    /// Current session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.lock().unwrap().clone()
    }

    /// Register a callback invoked whenever authentication status changes,
    /// including the initial resolution. Returns the disposer.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
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

    /// Subscribe this store to a provider's status stream.
    ///
    /// The store holds exactly one live provider subscription; attaching
    /// again replaces (and thereby cancels) the previous one.
    pub fn attach(&self, source: &dyn StatusSource) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let callback: StatusCallback = Arc::new(move |status: AuthStatus| {
            if let Some(inner) = weak.upgrade() {
                Inner::apply_status(&inner, status);
            }
        });

        let sub = source.subscribe_status(callback);
        *self.inner.provider_sub.lock().unwrap() = Some(sub);
    }

    /// Optimistically mark the session authenticated, immediately after a
    /// successful credential exchange. Idempotent under the provider's own
    /// event carrying the same identity: listeners are only notified when
    /// the snapshot materially changes, so there is no flicker.
    pub fn login(&self, identity: Arc<Identity>) {
        let next = {
            let state = self.inner.state.lock().unwrap();
            SessionSnapshot {
                identity: Some(identity),
                is_authenticated: true,
                is_resolving: state.is_resolving,
            }
        };
        Inner::apply(&self.inner, next);
    }

    /// Optimistically clear the session, independent of whether the
    /// provider confirms the sign-out.
    pub fn logout(&self) {
        let next = {
            let state = self.inner.state.lock().unwrap();
            SessionSnapshot {
                identity: None,
                is_authenticated: false,
                is_resolving: state.is_resolving,
            }
        };
        Inner::apply(&self.inner, next);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    /// Apply a provider status event. Any event resolves the session;
    /// once resolved it never reverts to resolving.
    fn apply_status(inner: &Arc<Inner>, status: AuthStatus) {
        let next = SessionSnapshot {
            is_authenticated: status.is_some(),
            identity: status,
            is_resolving: false,
        };
        Self::apply(inner, next);
    }

    fn apply(inner: &Arc<Inner>, next: SessionSnapshot) {
        let changed = {
            let mut state = inner.state.lock().unwrap();
            if *state == next {
                false
            } else {
                *state = next.clone();
                true
            }
        };

        if changed {
            // Snapshot the callbacks before invoking so a listener may
            // subscribe or unsubscribe from within its callback.
            let callbacks: Vec<SessionCallback> =
                inner.listeners.iter().map(|entry| entry.value().clone()).collect();
            for callback in callbacks {
                callback(&next);
            }
        }
    }
}
