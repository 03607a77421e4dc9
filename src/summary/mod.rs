//! Summary building.
//!
//! This module groups the filtered log by employee, computes per-project
//! metrics, and assembles the per-employee Markdown reports.

pub mod builder;
pub mod stats;

pub use builder::{build_reports, NO_CONTRIBUTIONS, NO_PROJECT_CONTRIBUTIONS};
pub use stats::{employee_stats, group_by_employee, notes_block};
