//! Trailing-window filtering.
//!
//! Narrows a unified log to the entries dated within the most recent
//! N-day span ending at "today".

use crate::models::WorkLog;
use chrono::{Duration, NaiveDate};
use tracing::debug;

/// Retain entries whose parsed date is on or after `today - window_days`.
///
/// Entries with unparsed dates cannot satisfy the comparison and are
/// excluded. Deterministic for a given `today`, and idempotent.
pub fn filter_window(log: &WorkLog, today: NaiveDate, window_days: u32) -> WorkLog {
    let cutoff = today - Duration::days(i64::from(window_days));

    let entries: Vec<_> = log
        .entries
        .iter()
        .filter(|entry| entry.date.as_date().map_or(false, |date| date >= cutoff))
        .cloned()
        .collect();

    debug!(
        "Window filter kept {} of {} entries (cutoff {})",
        entries.len(),
        log.len(),
        cutoff
    );
    WorkLog::new(entries)
}
