//! Stats Service
//!
//! Read path for the dashboard's series statistics page: cached rows for a
//! race week plus the freshness metadata the page needs to decide whether
//! stale data is acceptable.

use crate::db::CachedSeriesStat;
use crate::error::Result;
use crate::freshness;
use crate::season::{self, RaceWeek};
use crate::state::AppState;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

/// Cached week statistics with freshness metadata
#[derive(Debug, Clone, Serialize)]
pub struct WeekStatsResult {
    pub success: bool,
    pub week: RaceWeek,
    pub stats: Vec<CachedSeriesStat>,
    /// RFC 3339 instant of the newest row, absent when never fetched
    pub last_updated: Option<String>,
    pub stale: bool,
}

/// Stats service for the dashboard read path
pub struct StatsService;

impl StatsService {
    /// Stats for the race week containing `now`
    pub fn current_week_stats(state: &AppState, now: DateTime<Utc>) -> Result<WeekStatsResult> {
        Self::week_stats(state, season::resolve(now), now)
    }

    /// Stats for a given week, ordered by series name
    pub fn week_stats(
        state: &AppState,
        week: RaceWeek,
        now: DateTime<Utc>,
    ) -> Result<WeekStatsResult> {
        info!(
            "StatsService::week_stats - {} Q{} week {}",
            week.season_year, week.season_quarter, week.race_week
        );

        let stats = state.db.get_week_stats(week)?;
        let last_updated = state.db.latest_update_for_week(week)?;
        let stale = !freshness::is_fresh(last_updated, now, state.config.max_stat_age);

        Ok(WeekStatsResult {
            success: true,
            week,
            stats,
            last_updated: last_updated.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            stale,
        })
    }
}
