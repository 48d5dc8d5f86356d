//! REST API client for the job-board server.
//!
//! DESIGN
//! ======
//! `JobBoardApi` is the seam between the stores and the network. The
//! production implementation, `HttpApi`, is a thin `reqwest` wrapper; tests
//! inject mocks through `Arc<dyn JobBoardApi>`.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become `ApiError::Status` carrying the server's
//! `detail` message when the body has one. Callers decide how to map that
//! into user-facing errors.

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::types::{
    Ack, ApiError, CreatedUser, DeleteAccount, LoginResponse, PasswordChange, SignupRequest,
    StatisticsPayload, User, parse_error_detail,
};
use crate::config::{ClientConfig, HttpTimeouts};

/// Operations exposed by the job-board REST API.
#[async_trait::async_trait]
pub trait JobBoardApi: Send + Sync {
    /// `POST /auth/login` with form-encoded credentials.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or credentials are rejected.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// `POST /auth/signup` with a JSON profile.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    async fn signup(&self, request: &SignupRequest) -> Result<CreatedUser, ApiError>;

    /// `GET /auth/me` using `token` as a bearer credential.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a rejected token.
    async fn me(&self, token: &str) -> Result<User, ApiError>;

    /// `POST /auth/change_password`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    async fn change_password(&self, token: &str, current: &str, new: &str) -> Result<Ack, ApiError>;

    /// `POST /auth/delete_account`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    async fn delete_account(&self, token: &str, password: &str) -> Result<Ack, ApiError>;

    /// `GET /statistics/CTE`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, a non-2xx status, or a
    /// payload that does not match the statistics schema.
    async fn statistics(&self) -> Result<StatisticsPayload, ApiError>;
}

// =============================================================================
// HTTP IMPLEMENTATION
// =============================================================================

/// `reqwest`-backed API client.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    stats_top_n: Option<u32>,
}

impl HttpApi {
    /// Build a client for `base_url` with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS backend fails to initialize.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned(), stats_top_n: None })
    }

    /// Build a client from a parsed [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS backend fails to initialize.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut api = Self::new(&config.api_base, config.timeouts)?;
        api.stats_top_n = config.stats_top_n;
        Ok(api)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), detail: parse_error_detail(&text) });
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl JobBoardApi for HttpApi {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = self
            .http
            .post(self.url("/auth/login"))
            .form(&[("username", username), ("password", password)]);
        self.send(request).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<CreatedUser, ApiError> {
        let request = self.http.post(self.url("/auth/signup")).json(request);
        self.send(request).await
    }

    async fn me(&self, token: &str) -> Result<User, ApiError> {
        let request = self.http.get(self.url("/auth/me")).bearer_auth(token);
        self.send(request).await
    }

    async fn change_password(&self, token: &str, current: &str, new: &str) -> Result<Ack, ApiError> {
        let request = self
            .http
            .post(self.url("/auth/change_password"))
            .bearer_auth(token)
            .json(&PasswordChange { current, new });
        self.send(request).await
    }

    async fn delete_account(&self, token: &str, password: &str) -> Result<Ack, ApiError> {
        let request = self
            .http
            .post(self.url("/auth/delete_account"))
            .bearer_auth(token)
            .json(&DeleteAccount { password });
        self.send(request).await
    }

    async fn statistics(&self) -> Result<StatisticsPayload, ApiError> {
        let mut request = self.http.get(self.url("/statistics/CTE"));
        if let Some(top_n) = self.stats_top_n {
            request = request.query(&[("top_n_companies", top_n)]);
        }
        self.send(request).await
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
