//! Data models for the work-log digest.
//!
//! This module contains the core data structures shared across the
//! pipeline: raw work entries, the unified log, per-employee metrics,
//! rendered reports, and schedule entries.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// Textual date formats tried when normalizing a date cell.
///
/// Ambiguous numeric dates are interpreted day-first, so the day-first
/// formats come before the ISO ones.
const DAY_FIRST_FORMATS: [&str; 6] = [
    "%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%y", "%d/%m/%y", "%d-%m-%y",
];

const ISO_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// A date cell as read from a source sheet.
///
/// Values that cannot be normalized are kept verbatim instead of being
/// silently nulled, so downstream consumers can decide whether to surface
/// or drop them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryDate {
    /// Successfully normalized calendar date.
    Parsed(NaiveDate),
    /// Original cell text that no supported format matched.
    Unparsed(String),
}

impl EntryDate {
    /// Parse a textual date cell, trying day-first formats before ISO.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return EntryDate::Unparsed(String::new());
        }

        for format in DAY_FIRST_FORMATS.iter().chain(ISO_FORMATS.iter()) {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return EntryDate::Parsed(date);
            }
        }

        // Timestamp-style cells ("2024-11-30 08:00:00" and the T variant).
        for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
                return EntryDate::Parsed(datetime.date());
            }
        }

        EntryDate::Unparsed(raw.to_string())
    }

    /// Returns the calendar date, if this cell was parseable.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            EntryDate::Parsed(date) => Some(*date),
            EntryDate::Unparsed(_) => None,
        }
    }

    /// Whether the cell was normalized to a calendar date.
    pub fn is_parsed(&self) -> bool {
        matches!(self, EntryDate::Parsed(_))
    }
}

impl fmt::Display for EntryDate {
    /// Canonical artifact form: `DD.MM.YYYY` for parsed dates, the raw
    /// cell text otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryDate::Parsed(date) => write!(f, "{}", date.format("%d.%m.%Y")),
            EntryDate::Unparsed(raw) => write!(f, "{}", raw),
        }
    }
}

/// One row of one sheet of one source workbook. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkEntry {
    /// Employee the entry belongs to (containing-folder name).
    pub employee: String,
    /// Reporting-period label (sheet name).
    pub period: String,
    /// Project or scope the entry is booked against; empty cells become `None`.
    pub project_or_scope: Option<String>,
    /// Time spent, kept as the source cell's text.
    pub time_spent: String,
    /// Free-text notes; empty cells become `None`.
    pub notes: Option<String>,
    /// Normalized entry date.
    pub date: EntryDate,
}

/// Ordered, unified sequence of work entries from all discovered files.
///
/// Row order within a sheet and file-walk order across files are preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkLog {
    pub entries: Vec<WorkEntry>,
}

impl WorkLog {
    pub fn new(entries: Vec<WorkEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-project metrics within one employee's filtered entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectStat {
    pub name: String,
    pub entry_count: usize,
    /// Distinct non-empty notes for this project, in first-appearance order.
    pub distinct_notes: Vec<String>,
}

/// Metrics computed per employee group; recomputed on every run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeStats {
    /// Projects in descending entry-count order. Ties keep the
    /// first-encountered project first.
    pub projects: Vec<ProjectStat>,
    /// Distinct parsed work days.
    pub days_worked: usize,
    /// Total entries in the group.
    pub entry_count: usize,
}

impl EmployeeStats {
    /// Number of distinct projects worked on.
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// The project with the most entries, if any. Ties resolve to the
    /// first maximum encountered in iteration order.
    pub fn most_focused(&self) -> Option<&str> {
        self.projects.first().map(|p| p.name.as_str())
    }
}

/// Rendered biweekly report for one employee.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeReport {
    pub employee: String,
    /// Full Markdown report text.
    pub narrative: String,
}

/// One repeat cycle of the sending schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub due_date: NaiveDate,
    /// Employees due for a summary on this date.
    pub roster: Vec<String>,
}
