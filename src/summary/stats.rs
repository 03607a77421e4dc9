//! Per-employee grouping and project metrics.

use crate::models::{EmployeeStats, ProjectStat, WorkEntry, WorkLog};
use std::collections::{BTreeMap, BTreeSet};

/// Partition a log by employee.
///
/// The map keeps employees in name order so runs are reproducible;
/// nothing downstream depends on a particular employee ordering.
pub fn group_by_employee(log: &WorkLog) -> BTreeMap<String, Vec<&WorkEntry>> {
    let mut groups: BTreeMap<String, Vec<&WorkEntry>> = BTreeMap::new();

    for entry in &log.entries {
        groups.entry(entry.employee.clone()).or_default().push(entry);
    }

    groups
}

/// Compute project metrics for one employee's entries.
///
/// Projects come out in descending entry-count order; the stable sort
/// keeps the first-encountered project ahead on ties, so
/// `EmployeeStats::most_focused` is the first maximum encountered.
pub fn employee_stats(entries: &[&WorkEntry]) -> EmployeeStats {
    let mut projects: Vec<ProjectStat> = Vec::new();

    for entry in entries {
        let Some(name) = entry.project_or_scope.as_deref() else {
            continue;
        };

        let position = match projects.iter().position(|p| p.name == name) {
            Some(position) => position,
            None => {
                projects.push(ProjectStat {
                    name: name.to_string(),
                    entry_count: 0,
                    distinct_notes: Vec::new(),
                });
                projects.len() - 1
            }
        };

        let stat = &mut projects[position];
        stat.entry_count += 1;

        if let Some(note) = entry.notes.as_deref() {
            if !stat.distinct_notes.iter().any(|n| n == note) {
                stat.distinct_notes.push(note.to_string());
            }
        }
    }

    projects.sort_by_key(|p| std::cmp::Reverse(p.entry_count));

    let days_worked = entries
        .iter()
        .filter_map(|entry| entry.date.as_date())
        .collect::<BTreeSet<_>>()
        .len();

    EmployeeStats {
        projects,
        days_worked,
        entry_count: entries.len(),
    }
}

/// All distinct non-empty notes of one employee, in first-appearance
/// order, joined with newlines.
pub fn notes_block(entries: &[&WorkEntry]) -> String {
    let mut seen: Vec<&str> = Vec::new();

    for entry in entries {
        if let Some(note) = entry.notes.as_deref() {
            if !seen.contains(&note) {
                seen.push(note);
            }
        }
    }

    seen.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryDate;

    fn entry(employee: &str, project: Option<&str>, notes: Option<&str>, date: &str) -> WorkEntry {
        WorkEntry {
            employee: employee.to_string(),
            period: "November".to_string(),
            project_or_scope: project.map(String::from),
            time_spent: "1h".to_string(),
            notes: notes.map(String::from),
            date: EntryDate::parse(date),
        }
    }

    #[test]
    fn test_group_by_employee() {
        let log = WorkLog::new(vec![
            entry("bob", Some("atlas"), None, "28.11.2024"),
            entry("alice", Some("atlas"), None, "28.11.2024"),
            entry("bob", Some("hermes"), None, "29.11.2024"),
        ]);

        let groups = group_by_employee(&log);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["alice"].len(), 1);
        assert_eq!(groups["bob"].len(), 2);
    }

    #[test]
    fn test_most_focused_takes_max_count() {
        // A appears first but B has more entries.
        let owned = vec![
            entry("alice", Some("A"), None, "25.11.2024"),
            entry("alice", Some("A"), None, "26.11.2024"),
            entry("alice", Some("A"), None, "27.11.2024"),
            entry("alice", Some("B"), None, "25.11.2024"),
            entry("alice", Some("B"), None, "26.11.2024"),
            entry("alice", Some("B"), None, "27.11.2024"),
            entry("alice", Some("B"), None, "28.11.2024"),
            entry("alice", Some("B"), None, "29.11.2024"),
        ];
        let entries: Vec<&WorkEntry> = owned.iter().collect();

        let stats = employee_stats(&entries);
        assert_eq!(stats.most_focused(), Some("B"));
        assert_eq!(stats.projects[0].entry_count, 5);
        assert_eq!(stats.projects[1].name, "A");
    }

    #[test]
    fn test_ties_keep_first_encountered() {
        let owned = vec![
            entry("alice", Some("A"), None, "25.11.2024"),
            entry("alice", Some("B"), None, "26.11.2024"),
            entry("alice", Some("B"), None, "27.11.2024"),
            entry("alice", Some("A"), None, "28.11.2024"),
        ];
        let entries: Vec<&WorkEntry> = owned.iter().collect();

        let stats = employee_stats(&entries);
        assert_eq!(stats.most_focused(), Some("A"));
    }

    #[test]
    fn test_entries_without_project_are_not_projects() {
        let owned = vec![
            entry("alice", None, Some("standup"), "25.11.2024"),
            entry("alice", Some("A"), None, "26.11.2024"),
        ];
        let entries: Vec<&WorkEntry> = owned.iter().collect();

        let stats = employee_stats(&entries);
        assert_eq!(stats.project_count(), 1);
        assert_eq!(stats.entry_count, 2);
    }

    #[test]
    fn test_days_worked_counts_distinct_parsed_dates() {
        let owned = vec![
            entry("alice", Some("A"), None, "25.11.2024"),
            entry("alice", Some("A"), None, "25.11.2024"),
            entry("alice", Some("A"), None, "26.11.2024"),
            entry("alice", Some("A"), None, "garbled"),
        ];
        let entries: Vec<&WorkEntry> = owned.iter().collect();

        let stats = employee_stats(&entries);
        assert_eq!(stats.days_worked, 2);
        assert_eq!(stats.entry_count, 4);
    }

    #[test]
    fn test_notes_block_dedupes_in_order() {
        let owned = vec![
            entry("alice", Some("A"), Some("fixed importer"), "25.11.2024"),
            entry("alice", Some("A"), None, "26.11.2024"),
            entry("alice", Some("B"), Some("wrote docs"), "26.11.2024"),
            entry("alice", Some("B"), Some("fixed importer"), "27.11.2024"),
        ];
        let entries: Vec<&WorkEntry> = owned.iter().collect();

        assert_eq!(notes_block(&entries), "fixed importer\nwrote docs");
    }

    #[test]
    fn test_notes_block_empty_when_no_notes() {
        let owned = vec![entry("alice", Some("A"), None, "25.11.2024")];
        let entries: Vec<&WorkEntry> = owned.iter().collect();

        assert_eq!(notes_block(&entries), "");
    }

    #[test]
    fn test_distinct_notes_tracked_per_project() {
        let owned = vec![
            entry("alice", Some("A"), Some("one"), "25.11.2024"),
            entry("alice", Some("A"), Some("one"), "26.11.2024"),
            entry("alice", Some("A"), Some("two"), "27.11.2024"),
            entry("alice", Some("B"), None, "27.11.2024"),
        ];
        let entries: Vec<&WorkEntry> = owned.iter().collect();

        let stats = employee_stats(&entries);
        assert_eq!(stats.projects[0].distinct_notes, vec!["one", "two"]);
        assert!(stats.projects[1].distinct_notes.is_empty());
    }
}
