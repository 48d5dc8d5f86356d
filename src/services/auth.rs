//! Auth client: login, signup, profile fetch, and account management.
//!
//! ARCHITECTURE
//! ============
//! `AuthClient` is the only writer of the `SessionStore`. Every operation
//! that mutates the session takes a `SessionTicket` before awaiting the
//! network, so responses that arrive after a logout or a newer login are
//! dropped instead of repopulating state.
//!
//! TRADE-OFFS
//! ==========
//! `fetch_user` treats any failure as an invalid token and clears the
//! session. A transient network error therefore looks the same as an
//! expired token; the caller lands back on the login page either way.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::net::api::JobBoardApi;
use crate::net::types::{
    Ack, ApiError, CreatedUser, LoginResponse, SignupRequest, User, validate_password,
};
use crate::services::guard::{LOGIN_PATH, Navigation};
use crate::state::session::{SessionStore, SessionTicket};

const LOGIN_FALLBACK: &str = "Login failed";
const SIGNUP_FALLBACK: &str = "Signup failed";
const PROFILE_FALLBACK: &str = "Could not load user profile";
const CHANGE_PASSWORD_FALLBACK: &str = "Password change failed";
const DELETE_ACCOUNT_FALLBACK: &str = "Account deletion failed";
const OAUTH_FALLBACK: &str = "Authentication failed";
const BEARER: &str = "bearer";

/// User-facing auth failures. Each variant carries the message to show.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The request could not complete.
    #[error("{0}")]
    Network(String),

    /// Credentials or token were refused.
    #[error("{0}")]
    Rejected(String),

    /// The submitted payload was refused.
    #[error("{0}")]
    Validation(String),

    /// A logout or newer login replaced the session mid-request.
    #[error("request was superseded by a newer session change")]
    Superseded,
}

impl AuthError {
    /// Map a transport error to a user-facing one, preferring the server's
    /// own detail and falling back to `fallback`.
    #[must_use]
    pub fn from_api(err: &ApiError, fallback: &str) -> Self {
        let message = err.detail().unwrap_or(fallback).to_owned();
        match err {
            ApiError::Status { status: 400 | 422, .. } => Self::Validation(message),
            ApiError::Status { .. } => Self::Rejected(message),
            ApiError::Network(_) | ApiError::Decode(_) | ApiError::HttpClientBuild(_) => Self::Network(message),
        }
    }
}

pub struct AuthClient {
    api: Arc<dyn JobBoardApi>,
    session: Arc<SessionStore>,
}

impl AuthClient {
    #[must_use]
    pub fn new(api: Arc<dyn JobBoardApi>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Sign in and load the profile for the issued token.
    ///
    /// Any previous session is cleared first and stays cleared on failure.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when credentials are rejected, the network call
    /// fails, the profile cannot be loaded, or the attempt was superseded.
    pub async fn login(&self, identifier: &str, password: &str, remember: bool) -> Result<LoginResponse, AuthError> {
        let ticket = self.session.begin_login();
        tracing::info!(identifier, remember, "login started");

        let data = self.api.login(identifier, password).await.map_err(|e| {
            tracing::warn!(error = %e, "login rejected");
            AuthError::from_api(&e, LOGIN_FALLBACK)
        })?;

        if !self.session.set_token(ticket, &data.access_token, &data.token_type, remember) {
            return Err(AuthError::Superseded);
        }

        self.load_user(ticket, PROFILE_FALLBACK).await?;
        tracing::info!(identifier, "login complete");
        Ok(data)
    }

    /// Register a new account. The session is untouched; the user must
    /// still log in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for payloads that fail local or
    /// server checks, and other variants for transport failures.
    pub async fn signup(&self, request: &SignupRequest) -> Result<CreatedUser, AuthError> {
        request.validate().map_err(AuthError::Validation)?;
        self.api.signup(request).await.map_err(|e| {
            tracing::warn!(error = %e, "signup failed");
            AuthError::from_api(&e, SIGNUP_FALLBACK)
        })
    }

    /// Refresh the profile for the held token.
    ///
    /// Returns `None` without a request when no token is held. Any failure
    /// clears the session and also yields `None`.
    pub async fn fetch_user(&self) -> Option<User> {
        let Some(token) = self.session.token() else {
            tracing::debug!("no token, skipping user fetch");
            return None;
        };
        let ticket = self.session.ticket();

        match self.api.me(&token).await {
            Ok(user) => self.session.set_user(ticket, user.clone()).then_some(user),
            Err(e) => {
                tracing::warn!(error = %e, "user fetch failed, clearing session");
                self.session.invalidate(ticket);
                None
            }
        }
    }

    /// Startup hook: load the profile when a persisted token exists.
    pub async fn restore(&self) -> Option<User> {
        if self.session.token().is_none() {
            return None;
        }
        self.fetch_user().await
    }

    /// Adopt a token delivered by the server's OAuth redirect.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the token is empty or the server refuses it;
    /// the session is left cleared.
    pub async fn complete_oauth_callback(&self, token: &str, remember: bool) -> Result<User, AuthError> {
        let ticket = self.session.begin_login();
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::Rejected(OAUTH_FALLBACK.to_owned()));
        }
        if !self.session.set_token(ticket, token, BEARER, remember) {
            return Err(AuthError::Superseded);
        }
        self.load_user(ticket, OAUTH_FALLBACK).await
    }

    /// Clear the session and send the visitor to the login page.
    pub fn logout(&self) -> Navigation {
        tracing::info!("logging out");
        self.session.clear();
        Navigation::Redirect(LOGIN_PATH.to_owned())
    }

    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] without a token, [`AuthError::Validation`]
    /// for an unacceptable new password, and the mapped server error otherwise.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<Ack, AuthError> {
        let token = self.require_token()?;
        validate_password(new).map_err(AuthError::Validation)?;
        if current == new {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_owned(),
            ));
        }
        self.api.change_password(&token, current, new).await.map_err(|e| {
            tracing::warn!(error = %e, "password change failed");
            AuthError::from_api(&e, CHANGE_PASSWORD_FALLBACK)
        })
    }

    /// Delete the signed-in account. The session is left as is; callers
    /// normally follow up with [`AuthClient::logout`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] without a token or for a wrong
    /// password, and the mapped server error otherwise.
    pub async fn delete_account(&self, password: &str) -> Result<Ack, AuthError> {
        let token = self.require_token()?;
        self.api.delete_account(&token, password).await.map_err(|e| {
            tracing::warn!(error = %e, "account deletion failed");
            AuthError::from_api(&e, DELETE_ACCOUNT_FALLBACK)
        })
    }

    #[must_use]
    pub fn get_auth_header(&self) -> BTreeMap<String, String> {
        self.session.auth_header()
    }

    fn require_token(&self) -> Result<String, AuthError> {
        self.session
            .token()
            .ok_or_else(|| AuthError::Rejected("Not authenticated".to_owned()))
    }

    async fn load_user(&self, ticket: SessionTicket, fallback: &str) -> Result<User, AuthError> {
        let token = self.session.token().ok_or(AuthError::Superseded)?;
        match self.api.me(&token).await {
            Ok(user) => {
                if self.session.set_user(ticket, user.clone()) {
                    Ok(user)
                } else {
                    Err(AuthError::Superseded)
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "profile fetch failed, clearing session");
                self.session.invalidate(ticket);
                Err(AuthError::from_api(&e, fallback))
            }
        }
    }
}
