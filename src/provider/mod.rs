//! Results provider adapters

pub mod data_api;
pub mod types;

use crate::error::Result;
use async_trait::async_trait;
use types::SessionRecord;

/// Seam between the refresh cycle and the sim platform's results feed
#[async_trait]
pub trait ResultsProvider: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &'static str;

    /// Fetch the split-level result rows for one race week
    async fn fetch_series_results(
        &self,
        season_year: i32,
        season_quarter: i32,
        race_week: i32,
    ) -> Result<Vec<SessionRecord>>;
}
