//! Networking modules for the BookShare backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` talks to the identity service, `request` builds credential-bearing
//! requests explicitly, and `types` defines the wire schema.

pub mod api;
pub mod request;
pub mod types;
