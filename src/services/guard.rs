#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::collections::BTreeSet;
use std::sync::Arc;

use super::auth::AuthClient;

pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_PUBLIC_PATHS: [&str; 3] = [LOGIN_PATH, "/signup", "/auth/callback"];

/// Outcome of a navigation check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(String),
}

/// Pre-navigation check for protected routes.
///
/// One profile fetch at most per navigation, no retries.
pub struct RouteGuard {
    auth: Arc<AuthClient>,
    public_paths: BTreeSet<String>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(auth: Arc<AuthClient>) -> Self {
        Self::with_public_paths(auth, DEFAULT_PUBLIC_PATHS)
    }

    #[must_use]
    pub fn with_public_paths<I, S>(auth: Arc<AuthClient>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let public_paths = paths.into_iter().map(|p| normalize_path(&p.into())).collect();
        Self { auth, public_paths }
    }

    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(&normalize_path(path))
    }

    /// Decide whether navigation to `path` may proceed.
    pub async fn before_navigate(&self, path: &str) -> Navigation {
        if self.is_public(path) {
            return Navigation::Allow;
        }

        let session = self.auth.session();
        if session.token().is_some() && session.user().is_none() {
            self.auth.fetch_user().await;
        }

        if session.is_authenticated() {
            Navigation::Allow
        } else {
            tracing::debug!(path, "unauthenticated navigation, redirecting to login");
            Navigation::Redirect(LOGIN_PATH.to_owned())
        }
    }
}

/// Strip query, fragment, and trailing slashes so `/login/?next=x` matches `/login`.
fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/".to_owned() } else { trimmed.to_owned() }
}
