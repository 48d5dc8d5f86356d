//! Application wiring: builds every store once and shares it.
//!
//! DESIGN
//! ======
//! `App` owns the long-lived pieces (API client, session, stores) and hands
//! out `Arc`s. Nothing here is global; tests build an `App` around a mock
//! API and in-memory storage.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::net::api::{HttpApi, JobBoardApi};
use crate::net::types::ApiError;
use crate::services::auth::AuthClient;
use crate::services::guard::RouteGuard;
use crate::state::session::SessionStore;
use crate::state::statistics::StatisticsStore;
use crate::storage::{FileStore, KeyValueStore, MemoryStore, TokenStorage};
use crate::util::color_mode::ColorModeStore;

pub struct App {
    pub api: Arc<dyn JobBoardApi>,
    pub session: Arc<SessionStore>,
    pub auth: Arc<AuthClient>,
    pub guard: RouteGuard,
    pub statistics: StatisticsStore,
    pub color_mode: ColorModeStore,
}

impl App {
    /// Wire the HTTP client and on-disk durable storage from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let api: Arc<dyn JobBoardApi> = Arc::new(HttpApi::from_config(config)?);
        let durable: Arc<dyn KeyValueStore> = Arc::new(FileStore::in_dir(&config.state_dir));
        tracing::debug!(api_base = %config.api_base, state_dir = %config.state_dir.display(), "client configured");
        Ok(Self::with_parts(api, durable, Arc::new(MemoryStore::new()), None))
    }

    /// Wire from explicit parts.
    #[must_use]
    pub fn with_parts(
        api: Arc<dyn JobBoardApi>,
        durable: Arc<dyn KeyValueStore>,
        ephemeral: Arc<dyn KeyValueStore>,
        system_prefers_dark: Option<bool>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(TokenStorage::new(durable.clone(), ephemeral)));
        let auth = Arc::new(AuthClient::new(api.clone(), session.clone()));
        let guard = RouteGuard::new(auth.clone());
        let statistics = StatisticsStore::new(api.clone());
        let color_mode = ColorModeStore::load(durable, system_prefers_dark);
        Self { api, session, auth, guard, statistics, color_mode }
    }

    /// Startup hook: restore the user for a persisted token.
    pub async fn start(&self) {
        if let Some(user) = self.auth.restore().await {
            tracing::info!(user = user.display_name(), "session restored");
        }
    }
}
