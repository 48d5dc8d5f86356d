//! Authentication session: bearer token plus the loaded user profile.
//!
//! DESIGN
//! ======
//! `SessionStore` is an injectable container, shared via `Arc`, rather than
//! ambient global state. It is seeded from `TokenStorage` at construction
//! and keeps storage in step with every mutation.
//!
//! STALE RESPONSES
//! ===============
//! Every `clear()` or `begin_login()` bumps a generation counter. Writers take a
//! `SessionTicket` before issuing a request and hand it back with the
//! response; a ticket from an older generation is refused, so a late
//! `/auth/me` reply cannot resurrect a session that was logged out while
//! the request was in flight.
//!
//! A token installed by `set_token` lives in memory only. It reaches
//! `TokenStorage` once `set_user` accepts a profile for the same
//! generation, so a login whose profile fetch fails writes nothing.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::net::types::User;
use crate::storage::TokenStorage;

/// Coarse authentication phase derived from which fields are populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// No token held.
    Anonymous,
    /// Token held, profile not loaded yet.
    TokenOnly,
    /// Token and profile both present.
    Authenticated,
}

/// Generation marker captured before a session-mutating request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionTicket {
    generation: u64,
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    token_type: Option<String>,
    user: Option<User>,
    /// Remember flag of a token not yet written to storage.
    unsaved: Option<bool>,
    generation: u64,
}

impl SessionState {
    fn reset(&mut self) {
        self.token = None;
        self.token_type = None;
        self.user = None;
        self.unsaved = None;
        self.generation += 1;
    }

    fn accepts(&self, ticket: SessionTicket) -> bool {
        self.generation == ticket.generation
    }
}

pub struct SessionStore {
    state: Mutex<SessionState>,
    storage: TokenStorage,
}

impl SessionStore {
    /// Create a store seeded with whatever token `storage` already holds.
    #[must_use]
    pub fn new(storage: TokenStorage) -> Self {
        let mut state = SessionState::default();
        if let Some(stored) = storage.load() {
            state.token = Some(stored.access_token);
            state.token_type = stored.token_type;
        }
        Self { state: Mutex::new(state), storage }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    #[must_use]
    pub fn token_type(&self) -> Option<String> {
        self.lock().token_type.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    /// True iff both a token and a user are held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.phase() == SessionPhase::Authenticated
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        let state = self.lock();
        match (&state.token, &state.user) {
            (None, _) => SessionPhase::Anonymous,
            (Some(_), None) => SessionPhase::TokenOnly,
            (Some(_), Some(_)) => SessionPhase::Authenticated,
        }
    }

    #[must_use]
    pub fn can_scrape(&self) -> bool {
        self.lock().user.as_ref().is_some_and(User::can_scrape)
    }

    #[must_use]
    pub fn can_view_analytics(&self) -> bool {
        self.lock().user.as_ref().is_some_and(User::can_view_analytics)
    }

    /// `Authorization` header for API calls; empty when no token is held.
    #[must_use]
    pub fn auth_header(&self) -> BTreeMap<String, String> {
        self.lock()
            .token
            .as_ref()
            .map(|token| BTreeMap::from([("Authorization".to_owned(), format!("Bearer {token}"))]))
            .unwrap_or_default()
    }

    /// Ticket for the current generation.
    #[must_use]
    pub fn ticket(&self) -> SessionTicket {
        SessionTicket { generation: self.lock().generation }
    }

    #[must_use]
    pub fn is_current(&self, ticket: SessionTicket) -> bool {
        self.lock().accepts(ticket)
    }

    /// Drop token and user and wipe both storage areas.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.reset();
        self.storage.clear();
    }

    /// Clear the session and open a new generation for a login attempt.
    pub fn begin_login(&self) -> SessionTicket {
        let mut state = self.lock();
        state.reset();
        self.storage.clear();
        SessionTicket { generation: state.generation }
    }

    /// Install a freshly issued token in memory. Refused for stale tickets.
    ///
    /// Storage is untouched until [`SessionStore::set_user`] confirms the
    /// token with a profile.
    pub fn set_token(&self, ticket: SessionTicket, token: &str, token_type: &str, remember: bool) -> bool {
        let mut state = self.lock();
        if !state.accepts(ticket) {
            tracing::debug!("discarding token from superseded login");
            return false;
        }
        state.token = Some(token.to_owned());
        state.token_type = Some(token_type.to_owned());
        state.unsaved = Some(remember);
        true
    }

    /// Replace the user profile and persist a pending token. Refused for
    /// stale tickets or when the token has since been dropped.
    pub fn set_user(&self, ticket: SessionTicket, user: User) -> bool {
        let mut state = self.lock();
        if !state.accepts(ticket) {
            tracing::debug!("discarding profile from superseded request");
            return false;
        }
        let Some(token) = state.token.clone() else {
            tracing::debug!("discarding profile for dropped token");
            return false;
        };
        if let Some(remember) = state.unsaved.take() {
            let token_type = state.token_type.as_deref().unwrap_or_default();
            self.storage.persist(&token, token_type, remember);
        }
        state.user = Some(user);
        true
    }

    /// Clear the session on behalf of a failed request, unless a newer
    /// generation has started since the ticket was taken.
    pub fn invalidate(&self, ticket: SessionTicket) -> bool {
        let mut state = self.lock();
        if !state.accepts(ticket) {
            tracing::debug!("ignoring failure from superseded request");
            return false;
        }
        state.reset();
        self.storage.clear();
        true
    }
}
