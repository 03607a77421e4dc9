//! Report assembly.
//!
//! Builds one Markdown report per employee: an overview, a per-project
//! breakdown, an insights block, and a conclusion. The employee's notes
//! are condensed into a narrative by the injected summarizer; employees
//! whose window holds no notes get a fixed sentinel and no external call.

use crate::llm::{LlmError, NoteSummarizer};
use crate::models::{EmployeeReport, EmployeeStats, ProjectStat, WorkLog};
use crate::summary::stats::{employee_stats, group_by_employee, notes_block};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Narrative used when an employee's window has no notes at all.
pub const NO_CONTRIBUTIONS: &str = "No significant contributions noted.";

/// Per-project variant of the sentinel.
pub const NO_PROJECT_CONTRIBUTIONS: &str =
    "No significant contributions noted for this project.";

/// Build one report per employee found in the filtered log.
///
/// Each employee is processed independently; the summarizer is called at
/// most once per employee, and a failure there ends the whole build.
pub async fn build_reports(
    log: &WorkLog,
    summarizer: &dyn NoteSummarizer,
    show_progress: bool,
) -> Result<BTreeMap<String, EmployeeReport>, LlmError> {
    if log.is_empty() {
        return Ok(BTreeMap::new());
    }

    let groups = group_by_employee(log);

    let progress = if show_progress {
        let bar = ProgressBar::new(groups.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut reports = BTreeMap::new();

    for (employee, entries) in &groups {
        progress.set_message(employee.clone());

        let stats = employee_stats(entries);
        let notes = notes_block(entries);

        let narrative = if notes.is_empty() {
            debug!("No notes for {}, skipping summarization", employee);
            NO_CONTRIBUTIONS.to_string()
        } else {
            summarizer.summarize(&notes).await?
        };

        reports.insert(
            employee.clone(),
            EmployeeReport {
                employee: employee.clone(),
                narrative: render_report(employee, &stats, &narrative),
            },
        );
        progress.inc(1);
    }

    progress.finish_and_clear();
    info!("Built {} employee reports", reports.len());
    Ok(reports)
}

/// Render the full Markdown report for one employee.
fn render_report(employee: &str, stats: &EmployeeStats, narrative: &str) -> String {
    let mut report = String::new();

    report.push_str(&format!(
        "### Work Summary for {} (Last Two Weeks)\n\n",
        employee
    ));
    report.push_str("#### Overview\n");

    if let Some(most_focused) = stats.most_focused() {
        report.push_str(&format!(
            "In the last two weeks, {} has contributed to **{} project{}**. \
             The primary focus has been on **{}**.\n",
            employee,
            stats.project_count(),
            if stats.project_count() > 1 { "s" } else { "" },
            most_focused
        ));

        report.push_str("#### Project Breakdown\n");
        for (index, project) in stats.projects.iter().enumerate() {
            report.push_str(&render_project(index + 1, project, narrative));
        }

        report.push_str(&format!(
            "#### Insights and Metrics\n\
             - **Total Days Worked**: {} days\n\
             - **Total Work Entries**: {} entries\n\
             - **Key Contribution Areas**: {}\n\n",
            stats.days_worked, stats.entry_count, narrative
        ));
    } else {
        report.push_str("No projects were worked on during this period.\n\n");
    }

    report.push_str("#### Conclusion\n");
    report.push_str(&render_conclusion(employee, stats));

    report
}

/// Render one numbered project row of the breakdown.
///
/// The per-project summary reuses the overall narrative when the project
/// name occurs in it verbatim. That is an approximation, not true
/// per-project summarization; text mentioning several projects is reused
/// for each of them.
fn render_project(number: usize, project: &ProjectStat, narrative: &str) -> String {
    let summary = if !project.distinct_notes.is_empty() && narrative.contains(&project.name) {
        narrative
    } else {
        NO_PROJECT_CONTRIBUTIONS
    };

    format!(
        "{}. **{}**\n   - **Entries**: {}\n   - **Summary**: {}\n\n",
        number, project.name, project.entry_count, summary
    )
}

fn render_conclusion(employee: &str, stats: &EmployeeStats) -> String {
    match stats.most_focused() {
        Some(most_focused) => {
            let involvement = if stats.project_count() == 1 {
                "a project"
            } else {
                "multiple projects"
            };
            format!(
                "{} demonstrated involvement in {}, with particular emphasis on **{}**.",
                employee, involvement, most_focused
            )
        }
        None => format!(
            "{} demonstrated no significant contributions during the last two weeks.",
            employee
        ),
    }
}
