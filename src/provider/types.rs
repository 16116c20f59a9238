//! Data API wire types
//!
//! Only the fields the aggregation consumes are declared; the search
//! endpoint returns plenty more per row and serde drops the rest.

use serde::Deserialize;

/// One split-level result row from the hosted results search
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRecord {
    pub series_id: i64,
    pub season_id: i64,
    pub series_name: String,
    pub track: Track,
    pub season_year: i32,
    pub season_quarter: i32,
    pub race_week_num: i32,
    pub official_session: bool,
    pub num_drivers: i32,
    pub event_strength_of_field: i32,
    /// Parent race session id, shared by every split of that session
    pub session_id: i64,
}

/// Track identity nested inside each result row
#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub track_name: String,
}
