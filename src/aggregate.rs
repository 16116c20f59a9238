//! Series result aggregation
//!
//! Collapses the flat split-level session list returned by the Data API into
//! one summary row per series, in a single pass over per-series accumulators.

use crate::provider::types::SessionRecord;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Aggregated statistics for one series over one race week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStat {
    pub series_id: i64,
    pub season_id: i64,
    pub series_name: String,
    pub track_name: String,
    pub season_year: i32,
    pub season_quarter: i32,
    pub race_week: i32,
    /// Distinct parent race sessions (splits of one session share its id)
    pub total_race_sessions: i32,
    pub total_splits: i32,
    pub total_drivers: i32,
    pub average_strength_of_field: i32,
    /// True only when every split in the week ran as an official session
    pub official_session: bool,
}

/// Running totals for one series while the pass is in flight
struct Accumulator {
    series_id: i64,
    season_id: i64,
    series_name: String,
    track_name: String,
    season_year: i32,
    season_quarter: i32,
    race_week: i32,
    splits: i32,
    drivers: i32,
    sof_sum: i64,
    session_ids: HashSet<i64>,
    all_official: bool,
}

impl Accumulator {
    /// Identity fields come from the group's first record
    fn new(first: &SessionRecord) -> Self {
        Self {
            series_id: first.series_id,
            season_id: first.season_id,
            series_name: first.series_name.trim().to_string(),
            track_name: first.track.track_name.trim().to_string(),
            season_year: first.season_year,
            season_quarter: first.season_quarter,
            race_week: first.race_week_num,
            splits: 0,
            drivers: 0,
            sof_sum: 0,
            session_ids: HashSet::new(),
            all_official: true,
        }
    }

    fn add(&mut self, record: &SessionRecord) {
        self.splits += 1;
        self.drivers += record.num_drivers;
        self.sof_sum += i64::from(record.event_strength_of_field);
        self.session_ids.insert(record.session_id);
        self.all_official &= record.official_session;
    }

    fn finish(self) -> SeriesStat {
        // splits >= 1 for every accumulator, so the mean is well defined.
        // f64::round ties away from zero, which is round-half-up for the
        // non-negative ratings the platform produces.
        let average = (self.sof_sum as f64 / f64::from(self.splits)).round() as i32;
        SeriesStat {
            series_id: self.series_id,
            season_id: self.season_id,
            series_name: self.series_name,
            track_name: self.track_name,
            season_year: self.season_year,
            season_quarter: self.season_quarter,
            race_week: self.race_week,
            total_race_sessions: self.session_ids.len() as i32,
            total_splits: self.splits,
            total_drivers: self.drivers,
            average_strength_of_field: average,
            official_session: self.all_official,
        }
    }
}

/// Group session records by series and reduce each group to a [`SeriesStat`].
///
/// Output order follows the first occurrence of each `series_id` in the
/// input. Empty input yields empty output.
pub fn aggregate(sessions: &[SessionRecord]) -> Vec<SeriesStat> {
    let mut order: HashMap<i64, usize> = HashMap::new();
    let mut groups: Vec<Accumulator> = Vec::new();

    for record in sessions {
        let idx = *order.entry(record.series_id).or_insert_with(|| {
            groups.push(Accumulator::new(record));
            groups.len() - 1
        });
        groups[idx].add(record);
    }

    groups.into_iter().map(Accumulator::finish).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::types::Track;

    fn record(
        series_id: i64,
        session_id: i64,
        num_drivers: i32,
        sof: i32,
        official: bool,
    ) -> SessionRecord {
        SessionRecord {
            series_id,
            season_id: 4000 + series_id,
            series_name: format!("Series {}", series_id),
            track: Track {
                track_name: "Okayama International Circuit".to_string(),
            },
            season_year: 2025,
            season_quarter: 3,
            race_week_num: 5,
            official_session: official,
            num_drivers,
            event_strength_of_field: sof,
            session_id,
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_splits_and_distinct_sessions() {
        // Two splits of session 100 plus one single-split session 101
        let sessions = vec![
            record(5, 100, 24, 2100, true),
            record(5, 100, 18, 1400, true),
            record(5, 101, 30, 1800, true),
        ];
        let stats = aggregate(&sessions);
        assert_eq!(stats.len(), 1);
        let stat = &stats[0];
        assert_eq!(stat.series_id, 5);
        assert_eq!(stat.total_splits, 3);
        assert_eq!(stat.total_race_sessions, 2);
        assert_eq!(stat.total_drivers, 72);
        assert!(stat.official_session);
    }

    #[test]
    fn test_official_is_and_reduction() {
        let sessions = vec![
            record(5, 100, 24, 2100, true),
            record(5, 100, 18, 1400, false),
            record(5, 101, 30, 1800, true),
        ];
        let stats = aggregate(&sessions);
        assert!(!stats[0].official_session);
    }

    #[test]
    fn test_average_rounds_half_up() {
        let sessions = vec![record(7, 200, 20, 1500, true), record(7, 201, 20, 1501, true)];
        let stats = aggregate(&sessions);
        // 1500.5 must land on 1501, not bankers-round down to 1500
        assert_eq!(stats[0].average_strength_of_field, 1501);
    }

    #[test]
    fn test_average_plain_cases() {
        let sessions = vec![record(7, 200, 20, 1000, true), record(7, 201, 20, 2001, true)];
        assert_eq!(aggregate(&sessions)[0].average_strength_of_field, 1501);

        let single = vec![record(8, 300, 12, 1742, true)];
        let stats = aggregate(&single);
        assert_eq!(stats[0].average_strength_of_field, 1742);
        assert_eq!(stats[0].total_splits, 1);
        assert_eq!(stats[0].total_race_sessions, 1);
    }

    #[test]
    fn test_groups_in_first_occurrence_order() {
        let sessions = vec![
            record(9, 500, 10, 1200, true),
            record(3, 600, 10, 1300, true),
            record(9, 501, 10, 1250, true),
            record(12, 700, 10, 1100, true),
            record(3, 601, 10, 1350, true),
        ];
        let stats = aggregate(&sessions);
        let ids: Vec<i64> = stats.iter().map(|s| s.series_id).collect();
        assert_eq!(ids, vec![9, 3, 12]);
        assert_eq!(stats[0].total_splits, 2);
        assert_eq!(stats[1].total_splits, 2);
        assert_eq!(stats[2].total_splits, 1);
    }

    #[test]
    fn test_identity_from_first_record_trimmed() {
        let mut first = record(5, 100, 24, 2100, true);
        first.series_name = "  Advanced Mazda Cup  ".to_string();
        first.track.track_name = " Summit Point Raceway ".to_string();
        let mut second = record(5, 101, 20, 1900, true);
        second.series_name = "renamed mid-week".to_string();

        let stats = aggregate(&[first, second]);
        assert_eq!(stats[0].series_name, "Advanced Mazda Cup");
        assert_eq!(stats[0].track_name, "Summit Point Raceway");
        assert_eq!(stats[0].season_year, 2025);
        assert_eq!(stats[0].season_quarter, 3);
        assert_eq!(stats[0].race_week, 5);
    }
}
