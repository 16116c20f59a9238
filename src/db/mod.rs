//! SQLite persistence layer

pub mod migrations;
pub mod series_stats;

pub use series_stats::CachedSeriesStat;

use crate::aggregate::SeriesStat;
use crate::error::Result;
use crate::season::RaceWeek;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

/// SQLite database wrapper
pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    /// Open (or create) the database file and run migrations
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL keeps dashboard reads open while a refresh cycle writes
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// In-memory database for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    // ========== Series Stats Methods ==========

    /// Upsert one cycle's aggregated stats in a single transaction
    pub fn upsert_week_stats(&self, stats: &[SeriesStat], now: DateTime<Utc>) -> Result<usize> {
        let mut conn = self.conn.lock();
        series_stats::upsert_week_stats(&mut conn, stats, now)
    }

    /// Most recent update instant for a week, if any row exists
    pub fn latest_update_for_week(&self, week: RaceWeek) -> Result<Option<DateTime<Utc>>> {
        let conn = self.conn.lock();
        series_stats::latest_update_for_week(&conn, week)
    }

    /// Cached rows for a week, ordered by series name
    pub fn get_week_stats(&self, week: RaceWeek) -> Result<Vec<CachedSeriesStat>> {
        let conn = self.conn.lock();
        series_stats::get_week_stats(&conn, week)
    }

    /// Number of cached rows for a week
    pub fn count_for_week(&self, week: RaceWeek) -> Result<i64> {
        let conn = self.conn.lock();
        series_stats::count_for_week(&conn, week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample_stat() -> SeriesStat {
        SeriesStat {
            series_id: 139,
            season_id: 4139,
            series_name: "Mazda Cup".to_string(),
            track_name: "Laguna Seca".to_string(),
            season_year: 2025,
            season_quarter: 3,
            race_week: 2,
            total_race_sessions: 3,
            total_splits: 7,
            total_drivers: 120,
            average_strength_of_field: 1650,
            official_session: true,
        }
    }

    #[test]
    fn test_reopen_keeps_data_and_reruns_migrations() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("paddock.db");
        let week = RaceWeek {
            season_year: 2025,
            season_quarter: 3,
            race_week: 2,
        };
        let now = Utc.with_ymd_and_hms(2025, 6, 20, 12, 0, 0).unwrap();

        {
            let db = Db::new(&path).unwrap();
            db.upsert_week_stats(&[sample_stat()], now).unwrap();
        }

        // Second open runs the already-applied migration as a no-op
        let db = Db::new(&path).unwrap();
        let rows = db.get_week_stats(week).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].series_name, "Mazda Cup");
        assert_eq!(db.latest_update_for_week(week).unwrap(), Some(now));
    }
}
