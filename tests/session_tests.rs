// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store behavior against a scripted identity provider.

mod common;

use common::test_identity;
use dashmap::DashMap;
use gistbin::auth::{AuthStatus, StatusCallback, StatusSource};
use gistbin::session::SessionStore;
use gistbin::subscription::Subscription;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted provider: tests push status events by hand.
#[derive(Default)]
struct FakeProvider {
    listeners: Arc<DashMap<u64, StatusCallback>>,
    next_id: AtomicU64,
    last: Mutex<Option<AuthStatus>>,
}

impl FakeProvider {
    fn emit(&self, status: AuthStatus) {
        *self.last.lock().unwrap() = Some(status.clone());
        let callbacks: Vec<StatusCallback> =
            self.listeners.iter().map(|entry| entry.value().clone()).collect();
        for callback in callbacks {
            callback(status.clone());
        }
    }

    fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl StatusSource for FakeProvider {
    fn subscribe_status(&self, callback: StatusCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let replay = self.last.lock().unwrap().clone();
        if let Some(status) = replay {
            callback(status);
        }
        self.listeners.insert(id, callback);
        let listeners = self.listeners.clone();
        Subscription::new(move || {
            listeners.remove(&id);
        })
    }
}

#[test]
fn starts_resolving_and_resolves_on_first_event() {
    let provider = FakeProvider::default();
    let store = SessionStore::new();
    store.attach(&provider);

    let snapshot = store.snapshot();
    assert!(snapshot.is_resolving);
    assert!(!snapshot.is_authenticated);
    assert!(snapshot.identity.is_none());

    provider.emit(None);

    let snapshot = store.snapshot();
    assert!(!snapshot.is_resolving);
    assert!(!snapshot.is_authenticated);
}

#[test]
fn resolving_never_reverts_across_event_sequences() {
    let alice = test_identity("u-alice", "alice@example.com");
    let bob = test_identity("u-bob", "bob@example.com");

    let sequences: Vec<Vec<AuthStatus>> = vec![
        vec![None, Some(alice.clone()), None],
        vec![Some(alice.clone()), Some(bob.clone()), None, Some(alice.clone())],
        vec![None, None, None],
    ];

    for sequence in sequences {
        let provider = FakeProvider::default();
        let store = SessionStore::new();
        store.attach(&provider);

        for (index, status) in sequence.into_iter().enumerate() {
            provider.emit(status.clone());

            let snapshot = store.snapshot();
            assert!(
                !snapshot.is_resolving,
                "event {index} should leave the session resolved"
            );
            assert_eq!(snapshot.is_authenticated, snapshot.identity.is_some());
            assert_eq!(snapshot.identity, status);
        }
    }
}

#[test]
fn optimistic_login_is_idempotent_under_provider_echo() {
    let provider = FakeProvider::default();
    let store = SessionStore::new();
    store.attach(&provider);
    provider.emit(None);

    let notifications = Arc::new(AtomicUsize::new(0));
    let observed = notifications.clone();
    let _sub = store.subscribe(move |_| {
        observed.fetch_add(1, Ordering::SeqCst);
    });

    let identity = test_identity("u1", "u1@example.com");

    // Optimistic login after a successful credential exchange.
    store.login(identity.clone());
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
    assert!(store.snapshot().is_authenticated);

    // The provider's own event carrying the same identity follows
    // immediately; the state must not flicker.
    provider.emit(Some(identity.clone()));
    assert_eq!(notifications.load(Ordering::SeqCst), 1, "no extra notification");

    let snapshot = store.snapshot();
    assert!(snapshot.is_authenticated);
    assert_eq!(snapshot.identity, Some(identity));
}

#[test]
fn login_before_resolution_does_not_resolve() {
    let store = SessionStore::new();
    store.login(test_identity("u1", "u1@example.com"));

    // Optimistic login marks the session authenticated but only the
    // provider's first event may resolve it.
    let snapshot = store.snapshot();
    assert!(snapshot.is_authenticated);
    assert!(snapshot.is_resolving);
}

#[test]
fn logout_clears_immediately() {
    let provider = FakeProvider::default();
    let store = SessionStore::new();
    store.attach(&provider);
    provider.emit(Some(test_identity("u1", "u1@example.com")));
    assert!(store.snapshot().is_authenticated);

    store.logout();

    let snapshot = store.snapshot();
    assert!(!snapshot.is_authenticated);
    assert!(snapshot.identity.is_none());
    assert!(!snapshot.is_resolving);
}

#[test]
fn subscription_disposer_detaches_synchronously() {
    let provider = FakeProvider::default();
    let store = SessionStore::new();
    store.attach(&provider);

    let notifications = Arc::new(AtomicUsize::new(0));
    let observed = notifications.clone();
    let sub = store.subscribe(move |_| {
        observed.fetch_add(1, Ordering::SeqCst);
    });

    provider.emit(None);
    assert_eq!(notifications.load(Ordering::SeqCst), 1);

    sub.cancel();
    provider.emit(Some(test_identity("u1", "u1@example.com")));
    assert_eq!(notifications.load(Ordering::SeqCst), 1, "cancelled listener stays silent");
}

#[test]
fn attach_replaces_the_provider_subscription() {
    let first = FakeProvider::default();
    let second = FakeProvider::default();
    let store = SessionStore::new();

    store.attach(&first);
    assert_eq!(first.subscriber_count(), 1);

    store.attach(&second);
    assert_eq!(first.subscriber_count(), 0, "previous subscription cancelled");
    assert_eq!(second.subscriber_count(), 1);

    // Only the attached provider drives the store now.
    first.emit(Some(test_identity("stale", "stale@example.com")));
    assert!(store.snapshot().is_resolving);

    second.emit(None);
    assert!(!store.snapshot().is_resolving);
}

#[test]
fn late_attach_replays_current_status() {
    let provider = FakeProvider::default();
    provider.emit(Some(test_identity("u1", "u1@example.com")));

    let store = SessionStore::new();
    store.attach(&provider);

    let snapshot = store.snapshot();
    assert!(!snapshot.is_resolving, "replayed status resolves immediately");
    assert!(snapshot.is_authenticated);
}
