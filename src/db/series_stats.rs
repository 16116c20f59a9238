//! Cached series statistics storage
//!
//! One row per (season_year, season_quarter, race_week, series_id). Rows are
//! upserted by the refresh cycle and never deleted; timestamps are stored as
//! RFC 3339 UTC text.

use crate::aggregate::SeriesStat;
use crate::error::{AppError, Result};
use crate::season::RaceWeek;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;

/// Persisted aggregate row for one series in one race week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedSeriesStat {
    pub id: i64,
    pub series_id: i64,
    pub season_id: i64,
    pub series_name: String,
    pub track_name: String,
    pub season_year: i32,
    pub season_quarter: i32,
    pub race_week: i32,
    pub total_race_sessions: i32,
    pub total_splits: i32,
    pub total_drivers: i32,
    pub average_strength_of_field: i32,
    pub official_session: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Upsert one refresh cycle's aggregated stats inside a single transaction.
///
/// On conflict with the natural key only the aggregate columns and
/// `updated_at` move; identity columns and `created_at` keep their original
/// values. Returns the number of rows written.
pub fn upsert_week_stats(
    conn: &mut Connection,
    stats: &[SeriesStat],
    now: DateTime<Utc>,
) -> Result<usize> {
    let tx = conn.transaction()?;
    let now_str = now.to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut stmt = tx.prepare(
        "INSERT INTO series_stats (
            series_id, season_id, series_name, track_name,
            season_year, season_quarter, race_week,
            total_race_sessions, total_splits, total_drivers,
            average_strength_of_field, official_session,
            created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
         ON CONFLICT (season_year, season_quarter, race_week, series_id) DO UPDATE SET
           total_race_sessions = excluded.total_race_sessions,
           total_splits = excluded.total_splits,
           total_drivers = excluded.total_drivers,
           average_strength_of_field = excluded.average_strength_of_field,
           official_session = excluded.official_session,
           updated_at = excluded.updated_at",
    )?;

    let mut count = 0;
    for stat in stats {
        stmt.execute(params![
            stat.series_id,
            stat.season_id,
            stat.series_name,
            stat.track_name,
            stat.season_year,
            stat.season_quarter,
            stat.race_week,
            stat.total_race_sessions,
            stat.total_splits,
            stat.total_drivers,
            stat.average_strength_of_field,
            stat.official_session,
            now_str,
            now_str,
        ])?;
        count += 1;
    }

    drop(stmt);
    tx.commit()?;

    Ok(count)
}

/// Most recent update instant across the week's rows, series-agnostic.
/// `None` when the week has never been written.
pub fn latest_update_for_week(
    conn: &Connection,
    week: RaceWeek,
) -> Result<Option<DateTime<Utc>>> {
    let latest: Option<String> = conn.query_row(
        "SELECT MAX(updated_at) FROM series_stats
         WHERE season_year = ?1 AND season_quarter = ?2 AND race_week = ?3",
        params![week.season_year, week.season_quarter, week.race_week],
        |row| row.get(0),
    )?;

    match latest {
        Some(raw) => {
            let parsed = DateTime::parse_from_rfc3339(&raw)
                .map_err(|e| AppError::Internal(format!("Bad updated_at '{}': {}", raw, e)))?;
            Ok(Some(parsed.with_timezone(&Utc)))
        }
        None => Ok(None),
    }
}

/// All cached rows for a week, ordered by series name
pub fn get_week_stats(conn: &Connection, week: RaceWeek) -> Result<Vec<CachedSeriesStat>> {
    let mut stmt = conn.prepare(
        "SELECT id, series_id, season_id, series_name, track_name,
                season_year, season_quarter, race_week,
                total_race_sessions, total_splits, total_drivers,
                average_strength_of_field, official_session,
                created_at, updated_at
         FROM series_stats
         WHERE season_year = ?1 AND season_quarter = ?2 AND race_week = ?3
         ORDER BY series_name",
    )?;

    let stats = stmt
        .query_map(
            params![week.season_year, week.season_quarter, week.race_week],
            |row| {
                Ok(CachedSeriesStat {
                    id: row.get(0)?,
                    series_id: row.get(1)?,
                    season_id: row.get(2)?,
                    series_name: row.get(3)?,
                    track_name: row.get(4)?,
                    season_year: row.get(5)?,
                    season_quarter: row.get(6)?,
                    race_week: row.get(7)?,
                    total_race_sessions: row.get(8)?,
                    total_splits: row.get(9)?,
                    total_drivers: row.get(10)?,
                    average_strength_of_field: row.get(11)?,
                    official_session: row.get(12)?,
                    created_at: row.get(13)?,
                    updated_at: row.get(14)?,
                })
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(stats)
}

/// Number of cached rows for a week
pub fn count_for_week(conn: &Connection, week: RaceWeek) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM series_stats
         WHERE season_year = ?1 AND season_quarter = ?2 AND race_week = ?3",
        params![week.season_year, week.season_quarter, week.race_week],
        |row| row.get(0),
    )?;
    Ok(count)
}
