//! Background refresh loop
//!
//! Runs one refresh cycle immediately at startup, then one per configured
//! interval. Cycle failures are logged and absorbed; the next tick is the
//! retry.

use crate::services::RefreshService;
use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Smallest interval the loop will honor, whatever the environment says
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Periodic series stats refresh scheduler
pub struct RefreshScheduler {
    state: Arc<AppState>,
}

impl RefreshScheduler {
    /// Create a new refresh scheduler
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Interval between cycle starts, floored so a misconfigured
    /// environment cannot hammer the Data API
    pub fn tick_interval(configured: Duration) -> Duration {
        configured.max(MIN_REFRESH_INTERVAL)
    }

    /// Start the background refresh loop
    pub fn start(self) {
        tokio::spawn(async move {
            let interval = Self::tick_interval(self.state.config.refresh_interval);
            info!(
                "Refresh scheduler started (interval {} minutes)",
                interval.as_secs() / 60
            );

            loop {
                Self::run_once(&self.state).await;
                tokio::time::sleep(interval).await;
            }
        });
    }

    async fn run_once(state: &AppState) {
        match RefreshService::run_cycle(state, Utc::now()).await {
            Ok(outcome) if outcome.success => {
                if outcome.refreshed {
                    info!(
                        "Scheduled refresh wrote {} series for {} Q{} week {}",
                        outcome.series_count,
                        outcome.week.season_year,
                        outcome.week.season_quarter,
                        outcome.week.race_week
                    );
                }
            }
            Ok(outcome) => {
                warn!(
                    "Scheduled refresh failed: {}",
                    outcome.error.unwrap_or_else(|| "unknown error".to_string())
                );
            }
            Err(e) => {
                error!("Refresh cycle aborted on store error: {}", e);
            }
        }
    }
}
