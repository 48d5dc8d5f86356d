//! Wire types for the job-board REST API.
//!
//! DESIGN
//! ======
//! Every endpoint response gets an explicit schema so malformed payloads
//! fail at the boundary instead of leaking half-populated state into the
//! stores. Collections default to empty when the server sends `null` or
//! omits the field, which it does for empty statistics windows.

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by API transport operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not complete (DNS, connect, TLS, timeout).
    #[error("request failed: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("server returned status {status}")]
    Status { status: u16, detail: Option<String> },

    /// The response body did not match the expected schema.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Server-provided detail message, if the error carried one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// HTTP status code for `Status` errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extract the human-readable detail from an error body.
///
/// Accepts both `{"detail": "msg"}` and the validation shape
/// `{"detail": [{"msg": "..."}, ...]}`; for the latter the first message wins.
#[must_use]
pub fn parse_error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
            .map(str::to_owned),
        _ => None,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// AUTH
// =============================================================================

/// Response body of `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Profile returned by `GET /auth/me`.
///
/// The server omits `id` and `is_superuser` from this endpoint, so both
/// default rather than failing the parse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: BTreeMap<String, bool>,
}

impl User {
    /// Look up a named permission. Missing entries are denied.
    #[must_use]
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.get(name).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn can_scrape(&self) -> bool {
        self.has_permission("can_scrape")
    }

    #[must_use]
    pub fn can_view_analytics(&self) -> bool {
        self.has_permission("can_view_analytics")
    }

    #[must_use]
    pub fn can_manage_users(&self) -> bool {
        self.has_permission("can_manage_users")
    }

    /// Best label for display: full name, then username, then email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.username.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(self.email.as_str())
    }
}

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// JSON body of `POST /auth/signup`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
}

impl SignupRequest {
    /// Check the payload against the server's own field rules.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message describing the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Username is required".to_owned());
        }
        if !self.email.contains('@') {
            return Err("A valid email address is required".to_owned());
        }
        validate_password(&self.password)
    }
}

/// Password length rules shared by signup and password change.
///
/// # Errors
///
/// Returns a user-facing message when the password is too short or too long.
pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(format!("Password must be at least {MIN_PASSWORD_LEN} characters"));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(format!("Password must be less than {MAX_PASSWORD_LEN} characters"));
    }
    Ok(())
}

/// Response body of `POST /auth/signup`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// JSON body of `POST /auth/change_password`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PasswordChange<'a> {
    pub current: &'a str,
    pub new: &'a str,
}

/// JSON body of `POST /auth/delete_account`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeleteAccount<'a> {
    pub password: &'a str,
}

/// Generic acknowledgement body (`{"message": "..."}`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// STATISTICS
// =============================================================================

/// Number of postings on one calendar day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: String,
    pub count: u64,
}

/// Number of postings per location (normalized upper-case country).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCount {
    pub country: String,
    pub count: u64,
}

/// Number of postings per hiring company.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyCount {
    pub company: String,
    pub count: u64,
}

/// Engineering vs. other postings for one company.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferTypeRow {
    pub company: String,
    pub engineer: u64,
    pub other: u64,
    pub total: u64,
}

/// Headline counters for the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    #[serde(default)]
    pub total_active_jobs: u64,
    #[serde(default)]
    pub total_active_companies: u64,
    #[serde(default)]
    pub latest_job_date: Option<String>,
}

/// Response body of `GET /statistics/CTE`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobs_per_day: Vec<DayCount>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobs_per_location: Vec<LocationCount>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_companies: Vec<CompanyCount>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_offer_type: Vec<OfferTypeRow>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stats_summary: StatsSummary,
}
