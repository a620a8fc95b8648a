//! Route table for the BookShare client.
//!
//! Login and registration are public; every other view sits behind the
//! navigation guard.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use super::guard::{GuardDecision, NavigateOptions, NavigationGuard, Navigator, evaluate};
use crate::state::session::SessionState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Home,
    Feed,
    Profile { id: String },
    Book { id: String },
    Community { id: String },
    Leaderboard,
}

impl Route {
    /// Match a path (query string and fragment ignored, one trailing slash tolerated).
    ///
    /// Empty segments anywhere else (`//feed`, `/profile//u1`) do not match.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.strip_suffix('/').unwrap_or(path);
        if path.is_empty() {
            return Some(Self::Home);
        }
        let segments: Vec<&str> = path.split('/').collect();

        match segments.as_slice() {
            ["login"] => Some(Self::Login),
            ["register"] => Some(Self::Register),
            ["feed"] => Some(Self::Feed),
            ["leaderboard"] => Some(Self::Leaderboard),
            ["profile", id] if !id.is_empty() => Some(Self::Profile { id: (*id).to_owned() }),
            ["book", id] if !id.is_empty() => Some(Self::Book { id: (*id).to_owned() }),
            ["community", id] if !id.is_empty() => Some(Self::Community { id: (*id).to_owned() }),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_protected(&self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }

    /// Canonical path for this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::Home => "/".to_owned(),
            Self::Feed => "/feed".to_owned(),
            Self::Leaderboard => "/leaderboard".to_owned(),
            Self::Profile { id } => format!("/profile/{id}"),
            Self::Book { id } => format!("/book/{id}"),
            Self::Community { id } => format!("/community/{id}"),
        }
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Register => "Register",
            Self::Home => "Home",
            Self::Feed => "Feed",
            Self::Leaderboard => "Leaderboard",
            Self::Profile { .. } => "Profile",
            Self::Book { .. } => "Book details",
            Self::Community { .. } => "Community",
        }
    }
}

/// Result of resolving a navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    NotFound,
    Public(Route),
    Guarded { route: Route, decision: GuardDecision },
}

/// Resolve `path` against `state` without navigating.
#[must_use]
pub fn resolve(path: &str, state: &SessionState) -> Resolution {
    match Route::parse(path) {
        None => Resolution::NotFound,
        Some(route) if !route.is_protected() => Resolution::Public(route),
        Some(route) => Resolution::Guarded { decision: evaluate(state), route },
    }
}

/// Router that records navigations and gates protected routes.
#[derive(Debug)]
pub struct Router<N> {
    guard: NavigationGuard<N>,
}

impl<N: Navigator> Router<N> {
    pub fn new(navigator: N) -> Self {
        Self { guard: NavigationGuard::new(navigator) }
    }

    pub fn navigator(&self) -> &N {
        self.guard.navigator()
    }

    #[must_use]
    pub fn resolve(&self, path: &str, state: &SessionState) -> Resolution {
        resolve(path, state)
    }

    /// Navigate to `path`, letting the guard redirect if the route is protected.
    pub fn open(&self, path: &str, state: &SessionState) -> Resolution {
        let Some(route) = Route::parse(path) else {
            return Resolution::NotFound;
        };
        self.navigator()
            .navigate(&route.path(), NavigateOptions::default());

        if !route.is_protected() {
            return Resolution::Public(route);
        }
        let decision = self.guard.apply(state);
        Resolution::Guarded { route, decision }
    }
}
