use std::collections::BTreeMap;
use std::sync::atomic::Ordering;

use super::*;
use crate::net::api::test_helpers::MockApi;
use crate::net::types::{ApiError, LoginResponse, User};
use crate::state::session::SessionStore;
use crate::storage::TokenStorage;

fn user() -> User {
    User {
        id: None,
        username: Some("alice".into()),
        email: "alice@example.com".into(),
        full_name: None,
        is_superuser: false,
        permissions: BTreeMap::new(),
    }
}

fn guard_with(storage: TokenStorage) -> (Arc<MockApi>, Arc<AuthClient>, RouteGuard) {
    let mock = Arc::new(MockApi::new());
    let session = Arc::new(SessionStore::new(storage));
    let auth = Arc::new(AuthClient::new(mock.clone(), session));
    let guard = RouteGuard::new(auth.clone());
    (mock, auth, guard)
}

fn stored_token() -> TokenStorage {
    let storage = TokenStorage::in_memory();
    storage.persist("tok", "bearer", true);
    storage
}

#[tokio::test]
async fn anonymous_visitor_is_redirected() {
    let (mock, _auth, guard) = guard_with(TokenStorage::in_memory());

    let nav = guard.before_navigate("/dashboard").await;

    assert_eq!(nav, Navigation::Redirect(LOGIN_PATH.into()));
    assert_eq!(mock.me_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn token_without_user_fetches_once_then_allows() {
    let (mock, auth, guard) = guard_with(stored_token());
    mock.push_me(Ok(user()));

    assert_eq!(guard.before_navigate("/dashboard").await, Navigation::Allow);
    assert!(auth.is_authenticated());

    // User now loaded: no further fetches.
    assert_eq!(guard.before_navigate("/statistics").await, Navigation::Allow);
    assert_eq!(mock.me_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalid_token_redirects_and_clears() {
    let (mock, auth, guard) = guard_with(stored_token());
    mock.push_me(Err(ApiError::Status { status: 401, detail: None }));

    assert_eq!(guard.before_navigate("/dashboard").await, Navigation::Redirect(LOGIN_PATH.into()));
    assert!(auth.session().token().is_none());
    assert_eq!(mock.me_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn authenticated_user_passes_without_request() {
    let (mock, auth, guard) = guard_with(TokenStorage::in_memory());
    mock.push_login(Ok(LoginResponse { access_token: "tok".into(), token_type: "bearer".into() }));
    mock.push_me(Ok(user()));
    auth.login("alice", "pw", false).await.unwrap();

    assert_eq!(guard.before_navigate("/profile").await, Navigation::Allow);
    assert_eq!(mock.me_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn public_paths_skip_checks() {
    let (mock, _auth, guard) = guard_with(stored_token());

    assert_eq!(guard.before_navigate("/login").await, Navigation::Allow);
    assert_eq!(guard.before_navigate("/signup/").await, Navigation::Allow);
    assert_eq!(guard.before_navigate("/auth/callback?token=abc&new_user=false").await, Navigation::Allow);
    assert_eq!(mock.me_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn custom_public_paths() {
    let (_mock, auth, _guard) = guard_with(TokenStorage::in_memory());
    let guard = RouteGuard::with_public_paths(auth, ["/", "/about/"]);

    assert!(guard.is_public("/"));
    assert!(guard.is_public("/about"));
    assert!(guard.is_public("/about#team"));
    assert!(!guard.is_public("/login"));
}

#[test]
fn normalize_path_cases() {
    assert_eq!(normalize_path(""), "/");
    assert_eq!(normalize_path("///"), "/");
    assert_eq!(normalize_path("/a/b/?x=1"), "/a/b");
}
