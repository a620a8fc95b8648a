//! Error taxonomy for the session client.
//!
//! DESIGN
//! ======
//! `AuthError` is the only error that reaches callers of the session store:
//! login and registration failures propagate unchanged. `SessionInvalid`
//! describes why a stored credential could not be validated; the store
//! resolves it into a logout and only logs it.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

// =============================================================================
// AUTH
// =============================================================================

/// Failure of a login or registration attempt.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The identity service declined the attempt (bad credentials, duplicate account).
    #[error("authentication rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response.
    #[error("identity service request failed: {0}")]
    Request(String),

    /// The service answered with a success status but an unreadable body.
    #[error("identity service response malformed: {0}")]
    Malformed(String),

    /// The credential could not be written to durable storage.
    #[error("credential storage failed: {0}")]
    Storage(#[from] StorageError),
}

// =============================================================================
// SESSION VALIDATION
// =============================================================================

/// Reason a stored credential failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionInvalid {
    /// No credential was held when a refresh was requested.
    #[error("no credential to validate")]
    MissingCredential,

    /// The identity service refused the credential.
    #[error("credential refused with status {status}")]
    Refused { status: u16 },

    /// The request failed before a response arrived.
    #[error("identity lookup failed: {0}")]
    Request(String),

    /// The identity payload could not be decoded.
    #[error("identity payload malformed: {0}")]
    Malformed(String),
}

// =============================================================================
// API
// =============================================================================

/// Failure of a general backend request issued through the session.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not logged in")]
    Unauthenticated,

    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response decode failed: {0}")]
    Decode(String),
}

// =============================================================================
// STORAGE
// =============================================================================

/// Failure reading or writing the persisted credential slot.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("credential slot io failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// CONFIG
// =============================================================================

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("no data directory available; set BOOKSHARE_TOKEN_PATH")]
    NoDataDir,

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}
