use std::sync::atomic::Ordering;

use super::*;
use crate::net::api::test_helpers::MockApi;
use crate::net::types::ApiError;

fn payload() -> StatisticsPayload {
    StatisticsPayload {
        jobs_per_day: vec![DayCount { date: "2025-03-01".into(), count: 3 }],
        jobs_per_location: vec![LocationCount { country: "GERMANY".into(), count: 2 }],
        top_companies: vec![CompanyCount { company: "Acme".into(), count: 3 }],
        company_offer_type: vec![OfferTypeRow { company: "Acme".into(), engineer: 2, other: 1, total: 3 }],
        stats_summary: StatsSummary {
            total_active_jobs: 3,
            total_active_companies: 1,
            latest_job_date: Some("2025-03-01".into()),
        },
    }
}

fn store_with(mock: &Arc<MockApi>) -> StatisticsStore {
    StatisticsStore::new(mock.clone())
}

#[tokio::test]
async fn fetch_populates_every_slice() {
    let mock = Arc::new(MockApi::new());
    mock.push_stats(Ok(payload()));
    let store = store_with(&mock);

    store.fetch_statistics(false).await;

    assert!(store.loaded());
    assert!(store.error().is_none());
    assert_eq!(store.jobs_per_day(), payload().jobs_per_day);
    assert_eq!(store.jobs_per_location(), payload().jobs_per_location);
    assert_eq!(store.top_companies(), payload().top_companies);
    assert_eq!(store.company_offer_type(), payload().company_offer_type);
    assert_eq!(store.summary(), payload().stats_summary);
}

#[tokio::test]
async fn second_plain_fetch_hits_cache() {
    let mock = Arc::new(MockApi::new());
    mock.push_stats(Ok(payload()));
    let store = store_with(&mock);

    store.fetch_statistics(false).await;
    store.fetch_statistics(false).await;

    assert_eq!(mock.stats_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn forced_fetch_always_requests_and_replaces() {
    let mock = Arc::new(MockApi::new());
    mock.push_stats(Ok(payload()));
    mock.push_stats(Ok(StatisticsPayload::default()));
    let store = store_with(&mock);

    store.fetch_statistics(false).await;
    store.fetch_statistics(true).await;

    assert_eq!(mock.stats_calls.load(Ordering::SeqCst), 2);
    assert!(store.jobs_per_day().is_empty());
    assert_eq!(store.summary(), StatsSummary::default());
    assert!(store.loaded());
}

#[tokio::test]
async fn failure_records_error_and_allows_retry() {
    let mock = Arc::new(MockApi::new());
    mock.push_stats(Err(ApiError::Status { status: 500, detail: None }));
    mock.push_stats(Ok(payload()));
    let store = store_with(&mock);

    store.fetch_statistics(false).await;
    assert!(!store.loaded());
    assert_eq!(store.error().as_deref(), Some(STATS_FALLBACK_ERROR));

    store.fetch_statistics(false).await;
    assert_eq!(mock.stats_calls.load(Ordering::SeqCst), 2);
    assert!(store.loaded());
    assert!(store.error().is_none());
}

#[tokio::test]
async fn failure_prefers_server_detail() {
    let mock = Arc::new(MockApi::new());
    mock.push_stats(Err(ApiError::Status { status: 503, detail: Some("database unavailable".into()) }));
    let store = store_with(&mock);

    store.fetch_statistics(false).await;
    assert_eq!(store.error().as_deref(), Some("database unavailable"));
}

#[tokio::test]
async fn failed_forced_refresh_keeps_previous_snapshot() {
    let mock = Arc::new(MockApi::new());
    mock.push_stats(Ok(payload()));
    mock.push_stats(Err(ApiError::Network("connection reset".into())));
    let store = store_with(&mock);

    store.fetch_statistics(false).await;
    store.fetch_statistics(true).await;

    let snapshot = store.snapshot();
    assert!(snapshot.loaded);
    assert_eq!(snapshot.data, payload());
    assert_eq!(snapshot.error.as_deref(), Some(STATS_FALLBACK_ERROR));
}
