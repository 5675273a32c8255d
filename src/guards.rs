// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route-level gates over session state.
//!
//! A guard is a pure mapping from a session snapshot to one of three
//! outcomes: show the loading placeholder, redirect, or render the nested
//! view. Nothing protected is ever rendered before the session resolves.

use crate::session::{SessionSnapshot, SessionStore};
use crate::subscription::Subscription;
use std::sync::{Arc, Mutex};

/// Named navigation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Home,
    CreateGist,
    Gists,
    GistDetail(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Home => "/".to_string(),
            Route::CreateGist => "/create".to_string(),
            Route::Gists => "/gists".to_string(),
            Route::GistDetail(id) => format!("/gist/{id}"),
        }
    }
}

/// What a guard decided for the current render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session not yet resolved; show a neutral placeholder.
    Loading,
    Redirect(Route),
    /// Render the nested view.
    Render,
}

/// The two gate variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    /// Anonymous sessions are sent to the login route.
    AuthenticatedOnly,
    /// Authenticated sessions land on the default authenticated view.
    AnonymousOnly,
}

impl GuardKind {
    /// Compute the decision for one session snapshot.
    pub fn decide(&self, session: &SessionSnapshot) -> RouteDecision {
        if session.is_resolving {
            return RouteDecision::Loading;
        }

        match self {
            GuardKind::AuthenticatedOnly => {
                if session.is_authenticated {
                    RouteDecision::Render
                } else {
                    RouteDecision::Redirect(Route::Login)
                }
            }
            GuardKind::AnonymousOnly => {
                if session.is_authenticated {
                    RouteDecision::Redirect(Route::Home)
                } else {
                    RouteDecision::Render
                }
            }
        }
    }
}

/// A guard bound to a mounted view.
///
/// Subscribes to the session store for its lifetime and recomputes the
/// decision on every status change; dropping it detaches synchronously.
/// `on_change` fires with the mount-time decision and then once per
/// decision change.
pub struct RouteGuard {
    kind: GuardKind,
    current: Arc<Mutex<RouteDecision>>,
    _session_sub: Subscription,
}

impl RouteGuard {
    pub fn mount<F>(kind: GuardKind, store: &SessionStore, on_change: F) -> Self
    where
        F: Fn(&RouteDecision) + Send + Sync + 'static,
    {
        let initial = kind.decide(&store.snapshot());
        on_change(&initial);
        let current = Arc::new(Mutex::new(initial));

        let sub = {
            let current = current.clone();
            store.subscribe(move |snapshot| {
                let next = kind.decide(snapshot);
                let mut decision = current.lock().unwrap();
                if *decision != next {
                    *decision = next.clone();
                    drop(decision);
                    on_change(&next);
                }
            })
        };

        Self {
            kind,
            current,
            _session_sub: sub,
        }
    }

    pub fn kind(&self) -> GuardKind {
        self.kind
    }

    /// The decision as of the latest session change.
    pub fn decision(&self) -> RouteDecision {
        self.current.lock().unwrap().clone()
    }

    /// Detach from the session store. Dropping has the same effect.
    pub fn unmount(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(is_resolving: bool, is_authenticated: bool) -> SessionSnapshot {
        SessionSnapshot {
            identity: None,
            is_authenticated,
            is_resolving,
        }
    }

    #[test]
    fn resolving_always_loads() {
        for kind in [GuardKind::AuthenticatedOnly, GuardKind::AnonymousOnly] {
            for authed in [false, true] {
                assert_eq!(kind.decide(&snapshot(true, authed)), RouteDecision::Loading);
            }
        }
    }

    #[test]
    fn authenticated_only_redirects_anonymous_to_login() {
        assert_eq!(
            GuardKind::AuthenticatedOnly.decide(&snapshot(false, false)),
            RouteDecision::Redirect(Route::Login)
        );
        assert_eq!(
            GuardKind::AuthenticatedOnly.decide(&snapshot(false, true)),
            RouteDecision::Render
        );
    }

    #[test]
    fn anonymous_only_redirects_authenticated_home() {
        assert_eq!(
            GuardKind::AnonymousOnly.decide(&snapshot(false, true)),
            RouteDecision::Redirect(Route::Home)
        );
        assert_eq!(
            GuardKind::AnonymousOnly.decide(&snapshot(false, false)),
            RouteDecision::Render
        );
    }

    #[test]
    fn route_paths() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::Login.path(), "/login");
        assert_eq!(Route::Register.path(), "/register");
        assert_eq!(Route::CreateGist.path(), "/create");
        assert_eq!(Route::Gists.path(), "/gists");
        assert_eq!(Route::GistDetail("abc".to_string()).path(), "/gist/abc");
    }
}
