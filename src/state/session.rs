//! Auth-session state and the store that owns it.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `SessionStore` is constructed at process start and handed (usually as
//! an `Arc`) to every component that needs the current identity or the
//! credential for an outgoing request. The navigation guard subscribes to its
//! state channel.
//!
//! TRANSITIONS
//! ===========
//! Every transition is one synchronous replacement of `SessionState` after
//! the awaited network call has settled; nothing awaits halfway through a
//! mutation. Persisted slot and in-memory credential change together.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::header::HeaderMap;
use tokio::sync::watch;

use crate::config::ClientConfig;
use crate::error::{ApiError, AuthError, ConfigError, SessionInvalid};
use crate::net::api::{HttpIdentityService, IdentityService};
use crate::net::request::authorization_headers;
use crate::net::types::{AuthResponse, Credential, User};
use crate::storage::{CredentialStore, FileCredentialStore};

// =============================================================================
// SESSION STATE
// =============================================================================

/// Identity, loading flag and credential as seen by the rest of the client.
///
/// `loading` starts `true` and flips to `false` once, when the start-up
/// validation settles. `user.is_some()` implies `credential.is_some()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    pub loading: bool,
    pub credential: Option<Credential>,
}

impl SessionState {
    /// State at process start, before the persisted credential is checked.
    #[must_use]
    pub fn starting() -> Self {
        Self { user: None, loading: true, credential: None }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Headers an outgoing request built from this state would carry.
    #[must_use]
    pub fn authorization_headers(&self) -> HeaderMap {
        authorization_headers(self.credential.as_ref())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::starting()
    }
}

// =============================================================================
// SESSION STORE
// =============================================================================

/// Single source of truth for who is logged in.
pub struct SessionStore<I, S> {
    identity: I,
    storage: S,
    state: watch::Sender<SessionState>,
    initialized: AtomicBool,
}

/// Store wired to the REST identity service and the on-disk credential slot.
pub type HttpSessionStore = SessionStore<HttpIdentityService, FileCredentialStore>;

impl HttpSessionStore {
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let identity = HttpIdentityService::from_config(config)?;
        Ok(Self::new(identity, FileCredentialStore::new(&config.token_path)))
    }
}

impl<I, S> SessionStore<I, S>
where
    I: IdentityService,
    S: CredentialStore,
{
    pub fn new(identity: I, storage: S) -> Self {
        let (state, _) = watch::channel(SessionState::starting());
        Self { identity, storage, state, initialized: AtomicBool::new(false) }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver woken on every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Credential to attach to the next outgoing request, if any.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.state.borrow().credential.clone()
    }

    /// Credential for a protected request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthenticated`] when no credential is held.
    pub fn require_credential(&self) -> Result<Credential, ApiError> {
        self.credential().ok_or(ApiError::Unauthenticated)
    }

    #[must_use]
    pub fn authorization_headers(&self) -> HeaderMap {
        self.state.borrow().authorization_headers()
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Restore and validate the persisted credential. Call once at start-up.
    ///
    /// `loading` becomes `false` only after validation settles, success or not.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            tracing::warn!("session already initialized; ignoring");
            return;
        }

        let persisted = match self.storage.load() {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(error = %e, "credential slot unreadable; starting logged out");
                None
            }
        };

        let Some(credential) = persisted else {
            tracing::info!("no persisted credential");
            self.transition(|state| {
                state.user = None;
                state.credential = None;
                state.loading = false;
            });
            return;
        };

        self.transition(|state| state.credential = Some(credential));
        self.refresh_user().await;
        self.transition(|state| state.loading = false);
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Propagates the identity service's [`AuthError`]; state is untouched on failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let response = self
            .identity
            .login(email, password)
            .await
            .inspect_err(|e| tracing::info!(error = %e, "login failed"))?;
        self.establish(response)
    }

    /// Create an account and log in as it.
    ///
    /// # Errors
    ///
    /// Propagates the identity service's [`AuthError`]; state is untouched on failure.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let response = self
            .identity
            .register(name, email, password)
            .await
            .inspect_err(|e| tracing::info!(error = %e, "registration failed"))?;
        self.establish(response)
    }

    /// Drop the session locally. No server round-trip; always succeeds.
    pub fn logout(&self) {
        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "failed to clear credential slot");
        }
        self.transition(|state| {
            state.user = None;
            state.credential = None;
        });
        tracing::info!("logged out");
    }

    /// Re-fetch the identity for the held credential.
    ///
    /// Any failure ends the session; see [`Self::recover`].
    pub async fn refresh_user(&self) {
        let Some(credential) = self.credential() else {
            self.recover(&SessionInvalid::MissingCredential);
            return;
        };

        match self.identity.fetch_current_user(&credential).await {
            Ok(user) => {
                let user_id = user.id.clone();
                let mut stale = false;
                self.state.send_if_modified(|state| {
                    if state.credential.as_ref() != Some(&credential) {
                        stale = true;
                        return false;
                    }
                    if state.user.as_ref() == Some(&user) {
                        return false;
                    }
                    state.user = Some(user);
                    true
                });
                if stale {
                    tracing::debug!(%user_id, "discarding identity for superseded credential");
                } else {
                    tracing::debug!(%user_id, "identity refreshed");
                }
            }
            Err(reason) => {
                if self.credential().as_ref() == Some(&credential) {
                    self.recover(&reason);
                } else {
                    tracing::debug!(%reason, "ignoring failure for superseded credential");
                }
            }
        }
    }

    /// Recovery transition for an invalid session: always ends logged out.
    fn recover(&self, reason: &SessionInvalid) {
        tracing::warn!(%reason, "session invalid; logging out");
        self.logout();
    }

    fn establish(&self, response: AuthResponse) -> Result<User, AuthError> {
        let AuthResponse { user, token } = response;
        self.storage.save(&token)?;

        tracing::info!(user_id = %user.id, "session established");
        let established = user.clone();
        self.transition(|state| {
            state.credential = Some(token);
            state.user = Some(established);
        });
        Ok(user)
    }

    /// Apply `update` and notify subscribers only if the state changed.
    fn transition<F>(&self, update: F)
    where
        F: FnOnce(&mut SessionState),
    {
        self.state.send_if_modified(|state| {
            let before = state.clone();
            update(state);
            *state != before
        });
    }
}
