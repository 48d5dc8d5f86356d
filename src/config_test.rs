use std::sync::{Mutex, MutexGuard, PoisonError};

use super::*;

/// Serializes every test that touches process environment variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_guard() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Callers must hold [`env_guard`].
unsafe fn clear_client_env() {
    unsafe {
        std::env::remove_var("API_BASE");
        std::env::remove_var("JOBBOARD_STATE_DIR");
        std::env::remove_var("JOBBOARD_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("JOBBOARD_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("JOBBOARD_STATS_TOP_N");
    }
}

#[test]
fn from_env_defaults() {
    let _env = env_guard();
    unsafe { clear_client_env() };

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.api_base, DEFAULT_API_BASE);
    assert_eq!(cfg.timeouts, HttpTimeouts::default());
    assert!(cfg.stats_top_n.is_none());
    assert!(cfg.state_dir.ends_with(".jobboard"));
}

#[test]
fn from_env_parses_overrides() {
    let _env = env_guard();
    unsafe {
        clear_client_env();
        std::env::set_var("API_BASE", "https://jobs.example.test/api/");
        std::env::set_var("JOBBOARD_STATE_DIR", "/tmp/jobboard-state");
        std::env::set_var("JOBBOARD_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("JOBBOARD_CONNECT_TIMEOUT_SECS", "7");
        std::env::set_var("JOBBOARD_STATS_TOP_N", "5");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.api_base, "https://jobs.example.test/api");
    assert_eq!(cfg.state_dir, PathBuf::from("/tmp/jobboard-state"));
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 42, connect_secs: 7 });
    assert_eq!(cfg.stats_top_n, Some(5));

    unsafe { clear_client_env() };
}

#[test]
fn from_env_bad_numbers_fall_back() {
    let _env = env_guard();
    unsafe {
        clear_client_env();
        std::env::set_var("JOBBOARD_REQUEST_TIMEOUT_SECS", "soon");
        std::env::set_var("JOBBOARD_STATS_TOP_N", "0");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    assert!(cfg.stats_top_n.is_none());

    unsafe { clear_client_env() };
}

#[test]
fn from_env_rejects_non_http_base() {
    let _env = env_guard();
    unsafe {
        clear_client_env();
        std::env::set_var("API_BASE", "ftp://jobs.example.test");
    }

    let err = ClientConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));

    unsafe { clear_client_env() };
}

#[test]
fn normalize_base_url_cases() {
    assert_eq!(normalize_base_url(" http://localhost:8000// ").unwrap(), "http://localhost:8000");
    assert!(normalize_base_url("http://").is_err());
    assert!(normalize_base_url("localhost:8000").is_err());
}
