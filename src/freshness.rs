//! Cache freshness decisions

use chrono::{DateTime, Duration, Utc};

/// Decide whether a cached race week is still fresh.
///
/// `last_updated` is the most recent update instant across the week's cached
/// rows, or `None` when the week has never been fetched. An entry aged
/// exactly `max_age` counts as stale.
pub fn is_fresh(
    last_updated: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    max_age: Duration,
) -> bool {
    match last_updated {
        Some(updated_at) => now.signed_duration_since(updated_at) < max_age,
        None => false,
    }
}
