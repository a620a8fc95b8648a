//! Explicit request building against the BookShare backend.
//!
//! DESIGN
//! ======
//! There is no shared default-header map. A protected request is built by
//! passing the session's current credential to [`ApiClient::authorized`],
//! which attaches `Authorization: Bearer <token>` to that request only.

#[cfg(test)]
#[path = "request_test.rs"]
mod request_test;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};

use super::types::Credential;
use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};

/// Headers an outgoing request carries for the given credential.
///
/// Empty when `credential` is `None`; never contains a stale `Authorization`.
#[must_use]
pub fn authorization_headers(credential: Option<&Credential>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let Some(credential) = credential else {
        return headers;
    };
    match HeaderValue::from_str(&credential.bearer()) {
        Ok(mut value) => {
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Err(_) => tracing::warn!("credential is not a valid header value; request sent without it"),
    }
    headers
}

/// Thin wrapper over `reqwest::Client` that joins paths onto the base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { http, base_url }
    }

    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.http_client()?, config.api_url.clone()))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a backend path (`/api/...`).
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Unauthenticated request (login, registration).
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Request carrying the given credential as a bearer header.
    pub fn authorized(&self, method: Method, path: &str, credential: &Credential) -> RequestBuilder {
        self.request(method, path)
            .headers(authorization_headers(Some(credential)))
    }

    /// `GET` a protected JSON resource.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] on transport failure, [`ApiError::Status`]
    /// on a non-success status and [`ApiError::Decode`] on a non-JSON body.
    pub async fn get_json(&self, path: &str, credential: &Credential) -> Result<serde_json::Value, ApiError> {
        let response = self
            .authorized(Method::GET, path, credential)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(ApiError::Status { status, body: text });
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
