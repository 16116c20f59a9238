//! Refresh Service
//!
//! The fetch-aggregate-persist cycle that keeps cached series statistics
//! current: resolve the race week for `now`, skip if the cache is still
//! fresh, otherwise pull the week's results from the provider, aggregate
//! per series and upsert in one transaction.

use crate::aggregate;
use crate::error::{AppError, Result};
use crate::freshness;
use crate::season::{self, RaceWeek};
use crate::state::AppState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Outcome of one refresh cycle
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub success: bool,
    /// False when the cache was fresh and no fetch happened
    pub refreshed: bool,
    pub week: RaceWeek,
    pub series_count: usize,
    pub error: Option<String>,
}

/// Refresh service for the scheduled cache update
pub struct RefreshService;

impl RefreshService {
    /// Run one refresh cycle for the race week containing `now`.
    ///
    /// Upstream fetch and persistence failures land in the outcome with
    /// `success = false` and are not retried here. Store errors from the
    /// freshness lookup propagate as `Err`; retry policy for those belongs
    /// to the caller.
    pub async fn run_cycle(state: &AppState, now: DateTime<Utc>) -> Result<RefreshOutcome> {
        let cycle_id = Uuid::new_v4();
        let week = season::resolve(now);
        info!(
            "RefreshService::run_cycle - cycle {} for {} Q{} week {}",
            cycle_id, week.season_year, week.season_quarter, week.race_week
        );

        let last_updated = state.db.latest_update_for_week(week)?;

        if freshness::is_fresh(last_updated, now, state.config.max_stat_age) {
            debug!("Cycle {} - cache fresh, skipping fetch", cycle_id);
            let cached = state.db.count_for_week(week)? as usize;
            return Ok(RefreshOutcome {
                success: true,
                refreshed: false,
                week,
                series_count: cached,
                error: None,
            });
        }

        let records = match state
            .provider
            .fetch_series_results(week.season_year, week.season_quarter, week.race_week)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "Cycle {} - fetch from {} failed: {}",
                    cycle_id,
                    state.provider.name(),
                    e
                );
                return Ok(Self::failed(week, e));
            }
        };

        let stats = aggregate::aggregate(&records);
        info!(
            "Cycle {} - {} session rows aggregated into {} series",
            cycle_id,
            records.len(),
            stats.len()
        );

        match state.db.upsert_week_stats(&stats, now) {
            Ok(written) => {
                info!("Cycle {} - {} series stat rows upserted", cycle_id, written);
                Ok(RefreshOutcome {
                    success: true,
                    refreshed: true,
                    week,
                    series_count: written,
                    error: None,
                })
            }
            Err(e) => {
                error!("Cycle {} - persisting aggregates failed: {}", cycle_id, e);
                Ok(Self::failed(week, e))
            }
        }
    }

    fn failed(week: RaceWeek, err: AppError) -> RefreshOutcome {
        RefreshOutcome {
            success: false,
            refreshed: false,
            week,
            series_count: 0,
            error: Some(err.to_string()),
        }
    }
}
