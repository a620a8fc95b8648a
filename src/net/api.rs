//! Identity service client: login, registration, current-identity lookup.
//!
//! ERROR HANDLING
//! ==============
//! Login and registration map every non-success status to
//! [`AuthError::Rejected`] so forms can show the backend's message. Identity
//! lookups report [`SessionInvalid`]; the session store turns those into a
//! logout. Pure parsing lives in `parse_*` for testability.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::Method;
use serde::Serialize;

use super::request::ApiClient;
use super::types::{AuthResponse, Credential, ErrorBody, LoginRequest, MeResponse, RegisterRequest, User};
use crate::config::ClientConfig;
use crate::error::{AuthError, ConfigError, SessionInvalid};

pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const REGISTER_ENDPOINT: &str = "/api/auth/register";
pub const ME_ENDPOINT: &str = "/api/auth/me";

// =============================================================================
// IDENTITY SERVICE TRAIT
// =============================================================================

/// Backend responsible for authentication and profile retrieval. Enables mocking in tests.
#[async_trait::async_trait]
pub trait IdentityService: Send + Sync {
    /// Exchange email and password for a credential and profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] when the service declines the credentials.
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError>;

    /// Create an account and return its credential and profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] on validation failure or duplicate email.
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse, AuthError>;

    /// Look up the identity behind a credential.
    ///
    /// # Errors
    ///
    /// Returns [`SessionInvalid`] when the credential is refused or the lookup fails.
    async fn fetch_current_user(&self, credential: &Credential) -> Result<User, SessionInvalid>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// [`IdentityService`] backed by the BookShare REST API.
#[derive(Clone, Debug)]
pub struct HttpIdentityService {
    api: ApiClient,
}

impl HttpIdentityService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(ApiClient::from_config(config)?))
    }

    async fn post_auth<B>(&self, path: &str, body: &B) -> Result<AuthResponse, AuthError>
    where
        B: Serialize + Sync,
    {
        let response = self
            .api
            .request(Method::POST, path)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        parse_auth_response(status, &text)
    }
}

#[async_trait::async_trait]
impl IdentityService for HttpIdentityService {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        self.post_auth(LOGIN_ENDPOINT, &LoginRequest { email, password })
            .await
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        self.post_auth(REGISTER_ENDPOINT, &RegisterRequest { name, email, password })
            .await
    }

    async fn fetch_current_user(&self, credential: &Credential) -> Result<User, SessionInvalid> {
        let response = self
            .api
            .authorized(Method::GET, ME_ENDPOINT, credential)
            .send()
            .await
            .map_err(|e| SessionInvalid::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| SessionInvalid::Request(e.to_string()))?;

        parse_me_response(status, &text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Human-readable rejection text: the body's `message`, else the raw body, else a generic note.
pub(crate) fn rejection_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();
    if let Some(message) = parsed.message.filter(|m| !m.trim().is_empty()) {
        return message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("request failed with status {status}")
    } else {
        trimmed.to_owned()
    }
}

pub(crate) fn parse_auth_response(status: u16, body: &str) -> Result<AuthResponse, AuthError> {
    if !is_success(status) {
        return Err(AuthError::Rejected { status, message: rejection_message(status, body) });
    }
    let AuthResponse { user, token } =
        serde_json::from_str(body).map_err(|e| AuthError::Malformed(e.to_string()))?;
    // The slot stores the token trimmed; hold exactly what a reload would return.
    let token = token.as_str().trim();
    if token.is_empty() {
        return Err(AuthError::Malformed("empty token".to_owned()));
    }
    Ok(AuthResponse { user, token: Credential::new(token) })
}

pub(crate) fn parse_me_response(status: u16, body: &str) -> Result<User, SessionInvalid> {
    if !is_success(status) {
        return Err(SessionInvalid::Refused { status });
    }
    serde_json::from_str::<MeResponse>(body)
        .map(|me| me.user)
        .map_err(|e| SessionInvalid::Malformed(e.to_string()))
}
