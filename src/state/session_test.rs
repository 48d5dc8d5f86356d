use super::*;
use crate::storage::{ACCESS_TOKEN_KEY, TOKEN_TYPE_KEY};

fn alice() -> User {
    User {
        id: Some(1),
        username: Some("alice".into()),
        email: "alice@example.com".into(),
        full_name: None,
        is_superuser: false,
        permissions: BTreeMap::from([("can_scrape".to_owned(), true)]),
    }
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_store_is_anonymous() {
    let session = SessionStore::new(TokenStorage::in_memory());
    assert_eq!(session.phase(), SessionPhase::Anonymous);
    assert!(!session.is_authenticated());
    assert!(session.auth_header().is_empty());
    assert!(!session.can_scrape());
}

#[test]
fn new_store_restores_persisted_token() {
    let storage = TokenStorage::in_memory();
    storage.persist("tok", "bearer", true);

    let session = SessionStore::new(storage);
    assert_eq!(session.token().as_deref(), Some("tok"));
    assert_eq!(session.token_type().as_deref(), Some("bearer"));
    assert_eq!(session.phase(), SessionPhase::TokenOnly);
}

// =============================================================
// Transitions
// =============================================================

#[test]
fn token_then_user_authenticates() {
    let session = SessionStore::new(TokenStorage::in_memory());
    let ticket = session.begin_login();

    assert!(session.set_token(ticket, "tok", "bearer", false));
    assert_eq!(session.phase(), SessionPhase::TokenOnly);
    assert!(session.set_user(ticket, alice()));
    assert!(session.is_authenticated());
    assert!(session.can_scrape());
    assert!(!session.can_view_analytics());

    let header = session.auth_header();
    assert_eq!(header.len(), 1);
    assert_eq!(header.get("Authorization").map(String::as_str), Some("Bearer tok"));
}

#[test]
fn user_without_token_is_refused() {
    let session = SessionStore::new(TokenStorage::in_memory());
    let ticket = session.ticket();
    assert!(!session.set_user(ticket, alice()));
    assert!(session.user().is_none());
}

#[test]
fn clear_wipes_state_and_storage() {
    let storage = TokenStorage::in_memory();
    let session = SessionStore::new(storage.clone());
    let ticket = session.begin_login();
    session.set_token(ticket, "tok", "bearer", true);
    session.set_user(ticket, alice());

    session.clear();
    assert!(session.token().is_none());
    assert!(session.user().is_none());
    for store in [storage.durable(), storage.ephemeral()] {
        assert!(store.get(ACCESS_TOKEN_KEY).is_none());
        assert!(store.get(TOKEN_TYPE_KEY).is_none());
    }
}

// =============================================================
// Generations
// =============================================================

#[test]
fn clear_invalidates_outstanding_ticket() {
    let session = SessionStore::new(TokenStorage::in_memory());
    let ticket = session.begin_login();
    session.set_token(ticket, "tok", "bearer", false);

    session.clear();
    assert!(!session.is_current(ticket));
    assert!(!session.set_token(ticket, "tok", "bearer", false));
    assert!(!session.set_user(ticket, alice()));
    assert_eq!(session.phase(), SessionPhase::Anonymous);
}

#[test]
fn stale_failure_does_not_clear_newer_session() {
    let session = SessionStore::new(TokenStorage::in_memory());
    let old = session.begin_login();
    session.set_token(old, "old", "bearer", false);

    let fresh = session.begin_login();
    session.set_token(fresh, "new", "bearer", false);

    assert!(!session.invalidate(old));
    assert_eq!(session.token().as_deref(), Some("new"));
    assert!(session.invalidate(fresh));
    assert!(session.token().is_none());
}

#[test]
fn ticket_is_stable_without_mutation() {
    let session = SessionStore::new(TokenStorage::in_memory());
    let a = session.ticket();
    let b = session.ticket();
    assert_eq!(a, b);
    assert!(session.is_current(a));
}

#[test]
fn token_reaches_storage_only_with_profile() {
    let storage = TokenStorage::in_memory();
    let session = SessionStore::new(storage.clone());
    let ticket = session.begin_login();

    session.set_token(ticket, "tok", "bearer", true);
    assert!(storage.load().is_none());

    session.invalidate(ticket);
    let ticket = session.begin_login();
    session.set_token(ticket, "tok2", "bearer", false);
    assert!(session.set_user(ticket, alice()));
    assert!(storage.durable().get(ACCESS_TOKEN_KEY).is_none());
    assert_eq!(storage.ephemeral().get(ACCESS_TOKEN_KEY).as_deref(), Some("tok2"));
    assert_eq!(storage.ephemeral().get(TOKEN_TYPE_KEY).as_deref(), Some("bearer"));
}
