//! Client-side navigation: the route table and the guard in front of it.

pub mod guard;
pub mod routes;

pub use guard::{GuardDecision, History, LOGIN_PATH, NavigateOptions, NavigationGuard, Navigator, evaluate};
pub use routes::{Resolution, Route, Router};
