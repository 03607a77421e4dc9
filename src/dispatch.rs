//! Dispatch driver.
//!
//! Joins the generated schedule with the built reports on each
//! invocation: every schedule entry due today triggers one digest mail
//! holding the reports of its roster. Sending is best-effort; a mail
//! failure is logged and the run still completes normally. Callers that
//! need guaranteed delivery have to add their own retry layer.

use crate::mail::MailSender;
use crate::models::{EmployeeReport, ScheduleEntry};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// Schedule entries whose due date is exactly `today`.
///
/// Equality is exact calendar-day equality, not "on or after": a missed
/// run does not fire on the next day.
pub fn due_entries<'a>(
    schedule: &'a [ScheduleEntry],
    today: NaiveDate,
) -> Vec<&'a ScheduleEntry> {
    schedule
        .iter()
        .filter(|entry| entry.due_date == today)
        .collect()
}

/// Concatenate the reports of the roster members that have one, with
/// blank-line separation. Roster members without a report (no entries in
/// the window) are skipped silently.
pub fn compose_body(reports: &BTreeMap<String, EmployeeReport>, roster: &[String]) -> String {
    roster
        .iter()
        .filter_map(|employee| reports.get(employee))
        .map(|report| report.narrative.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Schedule entries due today.
    pub matched: usize,
    /// Mails that were accepted by the relay.
    pub sent: usize,
}

/// Process every schedule entry due today.
///
/// Matches are independent: each produces its own mail, and a failed
/// send never prevents the remaining ones.
pub async fn dispatch(
    schedule: &[ScheduleEntry],
    reports: &BTreeMap<String, EmployeeReport>,
    mailer: &dyn MailSender,
    subject: &str,
    today: NaiveDate,
) -> DispatchOutcome {
    let due = due_entries(schedule, today);
    let mut outcome = DispatchOutcome {
        matched: due.len(),
        sent: 0,
    };

    if due.is_empty() {
        info!("No digest scheduled for {}", today);
        return outcome;
    }

    for entry in due {
        let body = compose_body(reports, &entry.roster);
        if body.is_empty() {
            warn!(
                "No reports available for the roster due {}; sending an empty digest",
                entry.due_date
            );
        }

        match mailer.send(subject, &body).await {
            Ok(()) => {
                info!(
                    "Digest sent for {} roster member(s) due {}",
                    entry.roster.len(),
                    entry.due_date
                );
                outcome.sent += 1;
            }
            Err(e) => {
                error!("An error occurred while sending the digest email: {e:?}");
            }
        }
    }

    outcome
}
