//! Navigation guard for protected views.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected routes apply identical gating: placeholder while the start-up
//! validation is pending, redirect to `/login` (replacing history) once it has
//! settled without an identity, otherwise render the wrapped view.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::state::session::SessionState;

/// Path of the login view.
pub const LOGIN_PATH: &str = "/login";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

/// The view router the guard issues redirects through.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str, options: NavigateOptions);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn navigate(&self, path: &str, options: NavigateOptions) {
        (**self).navigate(path, options);
    }
}

/// Outcome of gating one protected view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still validating; show the loading placeholder.
    Placeholder,
    /// Authenticated; render the wrapped view unchanged.
    Render,
    /// Not authenticated; navigate away.
    Redirect { to: &'static str, options: NavigateOptions },
}

/// Pure gating decision for `state`.
#[must_use]
pub fn evaluate(state: &SessionState) -> GuardDecision {
    if state.loading {
        GuardDecision::Placeholder
    } else if state.user.is_none() {
        GuardDecision::Redirect { to: LOGIN_PATH, options: NavigateOptions { replace: true } }
    } else {
        GuardDecision::Render
    }
}

// =============================================================================
// GUARD
// =============================================================================

/// Guard bound to a navigator; issues the redirect its decision calls for.
#[derive(Debug)]
pub struct NavigationGuard<N> {
    navigator: N,
}

impl<N: Navigator> NavigationGuard<N> {
    pub fn new(navigator: N) -> Self {
        Self { navigator }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Evaluate `state` once, redirecting if required.
    pub fn apply(&self, state: &SessionState) -> GuardDecision {
        let decision = evaluate(state);
        if let GuardDecision::Redirect { to, options } = decision {
            tracing::debug!(to, "redirecting unauthenticated navigation");
            self.navigator.navigate(to, options);
        }
        decision
    }

    /// Re-evaluate on every published session state.
    ///
    /// Returns after the first redirect, since the guarded view is gone once
    /// it navigates away, or when the store is dropped.
    pub async fn watch(self, mut states: watch::Receiver<SessionState>) {
        loop {
            let state = states.borrow_and_update().clone();
            if let GuardDecision::Redirect { .. } = self.apply(&state) {
                return;
            }
            if states.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Spawn a guard for one mounted view.
///
/// The task redirects to `/login` once the session settles without a user and
/// then finishes. A view that unmounts while the user is still logged in owns
/// the returned handle and should abort it.
pub fn install_unauth_redirect<N>(states: watch::Receiver<SessionState>, navigator: N) -> JoinHandle<()>
where
    N: Navigator + 'static,
{
    tokio::spawn(NavigationGuard::new(navigator).watch(states))
}

// =============================================================================
// HISTORY
// =============================================================================

/// In-memory navigation history with browser push/replace/back semantics.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<String>>,
}

impl History {
    #[must_use]
    pub fn new(start: &str) -> Self {
        Self { entries: Mutex::new(vec![start.to_owned()]) }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Go back one entry. Returns the new current entry, or `None` at the start.
    pub fn back(&self) -> Option<String> {
        let mut entries = self.lock();
        if entries.len() < 2 {
            return None;
        }
        entries.pop();
        entries.last().cloned()
    }
}

impl Navigator for History {
    fn navigate(&self, path: &str, options: NavigateOptions) {
        let mut entries = self.lock();
        if options.replace {
            entries.pop();
        }
        entries.push(path.to_owned());
    }
}
