//! Client-side application state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` is the only writer of identity and credential; everything else
//! reads snapshots or subscribes to transitions.

pub mod session;

pub use session::{HttpSessionStore, SessionState, SessionStore};
