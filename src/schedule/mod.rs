//! Sending-schedule generation.
//!
//! Produces the calendar dates on which a roster is due for a digest:
//! a fixed anchor date repeated every interval until the horizon is
//! covered. Pure functions of their inputs; nothing here touches the
//! clock or the filesystem.

use crate::models::ScheduleEntry;
use chrono::{Duration, NaiveDate};

/// Generate the repeat cycles for one anchor/roster pair.
///
/// The sequence holds `horizon_days / interval_days` (integer division)
/// entries, each `interval_days` after the previous, starting at the
/// anchor itself. The same roster is attached to every entry. Several
/// pairs can be concatenated by calling this once per pair.
pub fn generate(
    anchor: NaiveDate,
    roster: &[String],
    interval_days: u32,
    horizon_days: u32,
) -> Vec<ScheduleEntry> {
    if interval_days == 0 {
        return Vec::new();
    }

    let cycles = horizon_days / interval_days;
    let interval = Duration::days(i64::from(interval_days));

    let mut entries = Vec::with_capacity(cycles as usize);
    let mut current = anchor;

    for _ in 0..cycles {
        entries.push(ScheduleEntry {
            due_date: current,
            roster: roster.to_vec(),
        });
        current = current + interval;
    }

    entries
}

/// The flattened ordered due-date sequence, for convenience lookups.
pub fn due_dates(entries: &[ScheduleEntry]) -> Vec<NaiveDate> {
    entries.iter().map(|entry| entry.due_date).collect()
}
