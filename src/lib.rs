//! # bookshare
//!
//! Session client for the BookShare book-sharing community.
//!
//! The crate owns the authenticated-session lifecycle (credential persistence,
//! identity validation, login/register/logout) and the navigation guard that
//! gates protected views on that session. The `bookshare` binary drives both
//! from the command line.

pub mod config;
pub mod error;
pub mod nav;
pub mod net;
pub mod state;
pub mod storage;
