//! Season calendar resolution
//!
//! The sim platform runs four fixed seasons per year, each 12 race weeks
//! long. Season 1 of a given year starts in mid December of the *previous*
//! calendar year, so the labeled year and the start instant's year differ
//! for that quarter.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;

/// One race week bucket on the platform calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RaceWeek {
    pub season_year: i32,
    pub season_quarter: i32,
    /// Zero-based week within the season, 0..=11
    pub race_week: i32,
}

/// A concrete season window candidate for one labeled year
#[derive(Debug, Clone, Copy)]
pub struct SeasonWindow {
    pub season_year: i32,
    pub season_quarter: i32,
    pub start: DateTime<Utc>,
}

/// Declarative season start table entry
struct SeasonStart {
    quarter: i32,
    month: u32,
    day: u32,
    hour: u32,
    /// Offset from the labeled year to the start instant's calendar year
    year_offset: i32,
}

/// Season starts, all at the stated hour UTC. Quarter 1 of year Y begins in
/// December of Y-1.
const SEASON_STARTS: [SeasonStart; 4] = [
    SeasonStart { quarter: 1, month: 12, day: 16, hour: 20, year_offset: -1 },
    SeasonStart { quarter: 2, month: 3, day: 11, hour: 20, year_offset: 0 },
    SeasonStart { quarter: 3, month: 6, day: 3, hour: 20, year_offset: 0 },
    SeasonStart { quarter: 4, month: 8, day: 26, hour: 20, year_offset: 0 },
];

const WEEK_MS: i64 = 7 * 24 * 3600 * 1000;
const MAX_RACE_WEEK: i64 = 11;

fn window_start(season_year: i32, entry: &SeasonStart) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(
        season_year + entry.year_offset,
        entry.month,
        entry.day,
        entry.hour,
        0,
        0,
    )
    .single()
}

/// Candidate windows ordered by start instant: the four seasons labeled
/// `year` plus next year's season 1, whose start falls in December of `year`.
pub fn season_windows(year: i32) -> Vec<SeasonWindow> {
    let mut windows: Vec<SeasonWindow> = SEASON_STARTS
        .iter()
        .filter_map(|entry| {
            window_start(year, entry).map(|start| SeasonWindow {
                season_year: year,
                season_quarter: entry.quarter,
                start,
            })
        })
        .collect();
    if let Some(start) = window_start(year + 1, &SEASON_STARTS[0]) {
        windows.push(SeasonWindow {
            season_year: year + 1,
            season_quarter: 1,
            start,
        });
    }
    windows
}

/// Resolve an instant to its race week bucket.
///
/// Picks the latest season window starting at or before `now` (an instant
/// exactly on a start boundary belongs to the new season) and counts whole
/// UTC weeks since that start, clamped to the 12-week season. Instants
/// outside any plausible window still resolve: far-past clocks land on the
/// current year's season 1 week 0, far-future ones on week 11.
pub fn resolve(now: DateTime<Utc>) -> RaceWeek {
    let windows = season_windows(now.year());
    let selected = windows
        .iter()
        .rev()
        .find(|w| w.start <= now)
        .or_else(|| windows.first());

    match selected {
        Some(window) => {
            let elapsed_ms = now.signed_duration_since(window.start).num_milliseconds();
            let weeks = elapsed_ms.div_euclid(WEEK_MS);
            RaceWeek {
                season_year: window.season_year,
                season_quarter: window.season_quarter,
                race_week: weeks.clamp(0, MAX_RACE_WEEK) as i32,
            }
        }
        None => RaceWeek {
            season_year: now.year(),
            season_quarter: 1,
            race_week: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_season_windows_for_2025() {
        let windows = season_windows(2025);
        assert_eq!(windows.len(), 5);
        assert_eq!(windows[0].start, utc(2024, 12, 16, 20, 0, 0));
        assert_eq!(windows[0].season_year, 2025);
        assert_eq!(windows[0].season_quarter, 1);
        assert_eq!(windows[1].start, utc(2025, 3, 11, 20, 0, 0));
        assert_eq!(windows[2].start, utc(2025, 6, 3, 20, 0, 0));
        assert_eq!(windows[3].start, utc(2025, 8, 26, 20, 0, 0));
        // Lookahead: next year's season 1 starts this December
        assert_eq!(windows[4].start, utc(2025, 12, 16, 20, 0, 0));
        assert_eq!(windows[4].season_year, 2026);
        assert_eq!(windows[4].season_quarter, 1);
    }

    #[test]
    fn test_windows_sorted_by_start() {
        let windows = season_windows(2024);
        for pair in windows.windows(2) {
            assert!(pair[0].start < pair[1].start);
        }
    }

    #[test]
    fn test_week_zero_at_every_season_start() {
        for window in season_windows(2025) {
            let bucket = resolve(window.start);
            assert_eq!(bucket.season_year, window.season_year);
            assert_eq!(bucket.season_quarter, window.season_quarter);
            assert_eq!(bucket.race_week, 0);
        }
    }

    #[test]
    fn test_week_clamps_to_eleven_long_after_start() {
        for window in season_windows(2025) {
            let bucket = resolve(window.start + Duration::weeks(20));
            // 20 weeks past any start is either deep in that season or past
            // the next boundary; the clamp keeps the index in range either way
            assert!(bucket.race_week <= 11);
        }
        // Season 4 runs 16 calendar weeks before the December boundary
        let s4 = utc(2025, 8, 26, 20, 0, 0);
        let bucket = resolve(s4 + Duration::weeks(15));
        assert_eq!(bucket.season_quarter, 4);
        assert_eq!(bucket.race_week, 11);
    }

    #[test]
    fn test_december_lookahead_labels_next_year() {
        let bucket = resolve(utc(2025, 12, 20, 0, 0, 0));
        assert_eq!(bucket.season_year, 2026);
        assert_eq!(bucket.season_quarter, 1);
        assert_eq!(bucket.race_week, 0);
    }

    #[test]
    fn test_start_boundary_is_inclusive() {
        // Exactly at the season 4 start instant
        let bucket = resolve(utc(2025, 8, 26, 20, 0, 0));
        assert_eq!(bucket.season_quarter, 4);
        assert_eq!(bucket.race_week, 0);

        // One second earlier still belongs to season 3
        let bucket = resolve(utc(2025, 8, 26, 19, 59, 59));
        assert_eq!(bucket.season_quarter, 3);
        assert_eq!(bucket.race_week, 11);
    }

    #[test]
    fn test_mid_season_weeks() {
        let s2 = utc(2025, 3, 11, 20, 0, 0);
        assert_eq!(resolve(s2 + Duration::days(6)).race_week, 0);
        assert_eq!(resolve(s2 + Duration::days(7)).race_week, 1);
        assert_eq!(resolve(s2 + Duration::days(20)).race_week, 2);
    }

    #[test]
    fn test_january_belongs_to_season_one() {
        let bucket = resolve(utc(2026, 1, 10, 12, 0, 0));
        assert_eq!(bucket.season_year, 2026);
        assert_eq!(bucket.season_quarter, 1);
        assert_eq!(bucket.race_week, 3);
    }

    proptest! {
        #[test]
        fn prop_week_monotonic_within_season(
            year in 2020i32..2030,
            quarter in 0usize..4,
            a_ms in 0i64..(12 * WEEK_MS),
            b_ms in 0i64..(12 * WEEK_MS),
        ) {
            let (lo, hi) = if a_ms <= b_ms { (a_ms, b_ms) } else { (b_ms, a_ms) };
            let start = season_windows(year)[quarter].start;
            let early = resolve(start + Duration::milliseconds(lo));
            let late = resolve(start + Duration::milliseconds(hi));
            prop_assert_eq!(early.season_quarter, late.season_quarter);
            prop_assert!(early.race_week <= late.race_week);
        }

        #[test]
        fn prop_week_always_in_range(secs in -4_000_000_000i64..8_000_000_000) {
            let now = Utc.timestamp_opt(secs, 0).unwrap();
            let bucket = resolve(now);
            prop_assert!((0..=11).contains(&bucket.race_week));
            prop_assert!((1..=4).contains(&bucket.season_quarter));
        }
    }
}
