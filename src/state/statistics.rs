#[cfg(test)]
#[path = "statistics_test.rs"]
mod statistics_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::net::api::JobBoardApi;
use crate::net::types::{CompanyCount, DayCount, LocationCount, OfferTypeRow, StatisticsPayload, StatsSummary};

pub const STATS_FALLBACK_ERROR: &str = "Failed to load statistics";

/// Cached dashboard dataset plus its load status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    pub data: StatisticsPayload,
    pub loaded: bool,
    pub error: Option<String>,
}

/// Read-through cache over `GET /statistics/CTE`.
///
/// The first successful fetch is kept until a forced refresh. A failed
/// fetch records an error and leaves `loaded` untouched: false before the
/// first success, so the next plain fetch retries, and true after it, so a
/// failed forced refresh keeps serving the previous snapshot.
pub struct StatisticsStore {
    api: Arc<dyn JobBoardApi>,
    snapshot: Mutex<StatisticsSnapshot>,
}

impl StatisticsStore {
    #[must_use]
    pub fn new(api: Arc<dyn JobBoardApi>) -> Self {
        Self { api, snapshot: Mutex::new(StatisticsSnapshot::default()) }
    }

    fn lock(&self) -> MutexGuard<'_, StatisticsSnapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load statistics unless already cached and `force` is false.
    pub async fn fetch_statistics(&self, force: bool) {
        {
            let mut snapshot = self.lock();
            if snapshot.loaded && !force {
                tracing::debug!("statistics cache hit");
                return;
            }
            snapshot.error = None;
        }

        match self.api.statistics().await {
            Ok(data) => {
                *self.lock() = StatisticsSnapshot { data, loaded: true, error: None };
                tracing::debug!("statistics loaded");
            }
            Err(e) => {
                tracing::warn!(error = %e, "statistics fetch failed");
                let message = e.detail().map_or_else(|| STATS_FALLBACK_ERROR.to_owned(), str::to_owned);
                self.lock().error = Some(message);
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> StatisticsSnapshot {
        self.lock().clone()
    }

    #[must_use]
    pub fn loaded(&self) -> bool {
        self.lock().loaded
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    #[must_use]
    pub fn jobs_per_day(&self) -> Vec<DayCount> {
        self.lock().data.jobs_per_day.clone()
    }

    #[must_use]
    pub fn jobs_per_location(&self) -> Vec<LocationCount> {
        self.lock().data.jobs_per_location.clone()
    }

    #[must_use]
    pub fn top_companies(&self) -> Vec<CompanyCount> {
        self.lock().data.top_companies.clone()
    }

    #[must_use]
    pub fn company_offer_type(&self) -> Vec<OfferTypeRow> {
        self.lock().data.company_offer_type.clone()
    }

    #[must_use]
    pub fn summary(&self) -> StatsSummary {
        self.lock().data.stats_summary.clone()
    }
}
