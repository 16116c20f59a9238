//! Services Layer
//!
//! Business logic shared by the background scheduler, the run-once
//! entrypoint and the (out-of-process) dashboard read path.
//!
//! # Services
//!
//! - `RefreshService` - fetch-aggregate-persist cycle for the current week
//! - `StatsService` - cached week statistics with freshness metadata

pub mod refresh_service;
pub mod stats_service;

// Re-export commonly used types and services
pub use refresh_service::{RefreshOutcome, RefreshService};
pub use stats_service::{StatsService, WeekStatsResult};
