//! Work-log aggregation.
//!
//! Walks a directory tree of per-employee workbooks, normalizes every
//! sheet into work entries, and concatenates them into one unified log.
//! The employee is taken from the containing folder, the reporting
//! period from the sheet name.

use crate::models::{EntryDate, WorkEntry, WorkLog};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Columns every sheet must provide, in artifact order.
pub const REQUIRED_COLUMNS: [&str; 4] = ["project_or_scope", "time", "notes", "date"];

/// Header of the CSV artifacts.
pub const ARTIFACT_HEADER: [&str; 6] = [
    "User",
    "Month",
    "project_or_scope",
    "time",
    "notes",
    "date",
];

/// Spreadsheet extensions treated as work-log sources.
const LOG_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Errors raised while aggregating work logs.
///
/// All of these are fatal to the run; the input tree has to be fixed,
/// not worked around.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("no work-log spreadsheets found under {}", .0.display())]
    NoFiles(PathBuf),

    #[error("failed to open workbook {}: {source}", path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("failed to read sheet '{sheet}' in {}: {source}", path.display())]
    Sheet {
        path: PathBuf,
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error("sheet '{sheet}' in {} is missing required column '{column}'", path.display())]
    MissingColumn {
        path: PathBuf,
        sheet: String,
        column: &'static str,
    },

    #[error("failed to write artifact {}: {source}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Recursively aggregate every workbook under `root` into one log.
///
/// Row order within a sheet and file-walk order across files (sorted by
/// file name, so runs are deterministic) are preserved.
pub fn aggregate(root: &Path) -> Result<WorkLog, AggregateError> {
    let mut entries = Vec::new();
    let mut files_read = 0usize;

    for item in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !item.file_type().is_file() || !is_log_file(item.path()) {
            continue;
        }

        let employee = employee_for(item.path());
        read_workbook(item.path(), &employee, &mut entries)?;
        files_read += 1;
    }

    if files_read == 0 {
        return Err(AggregateError::NoFiles(root.to_path_buf()));
    }

    info!(
        "Aggregated {} entries from {} workbooks",
        entries.len(),
        files_read
    );
    Ok(WorkLog::new(entries))
}

/// Write a log to a CSV artifact, overwriting any previous one.
pub fn write_artifact(log: &WorkLog, path: &Path) -> Result<(), AggregateError> {
    let artifact_err = |source: csv::Error| AggregateError::Artifact {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(artifact_err)?;
    writer.write_record(ARTIFACT_HEADER).map_err(artifact_err)?;

    for entry in &log.entries {
        let date = entry.date.to_string();
        writer
            .write_record([
                entry.employee.as_str(),
                entry.period.as_str(),
                entry.project_or_scope.as_deref().unwrap_or(""),
                entry.time_spent.as_str(),
                entry.notes.as_deref().unwrap_or(""),
                date.as_str(),
            ])
            .map_err(artifact_err)?;
    }

    writer.flush().map_err(|e| artifact_err(e.into()))?;
    debug!("Wrote {} rows to {}", log.len(), path.display());
    Ok(())
}

/// Whether a path is a work-log source file.
fn is_log_file(path: &Path) -> bool {
    // "~$" files are Excel's lock files, not data.
    if path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("~$"))
        .unwrap_or(false)
    {
        return false;
    }

    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| LOG_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// The employee a file belongs to: its immediate parent directory name.
fn employee_for(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_workbook(
    path: &Path,
    employee: &str,
    entries: &mut Vec<WorkEntry>,
) -> Result<(), AggregateError> {
    debug!("Reading workbook {}", path.display());

    let mut workbook = open_workbook_auto(path).map_err(|source| AggregateError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;

    for sheet in workbook.sheet_names().to_vec() {
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|source| AggregateError::Sheet {
                path: path.to_path_buf(),
                sheet: sheet.clone(),
                source,
            })?;

        read_sheet(path, &sheet, range.rows(), employee, entries)?;
    }

    Ok(())
}

fn read_sheet<'a>(
    path: &Path,
    sheet: &str,
    mut rows: impl Iterator<Item = &'a [Data]>,
    employee: &str,
    entries: &mut Vec<WorkEntry>,
) -> Result<(), AggregateError> {
    let header = rows.next().unwrap_or(&[]);
    let columns = column_indices(header).map_err(|column| AggregateError::MissingColumn {
        path: path.to_path_buf(),
        sheet: sheet.to_string(),
        column,
    })?;

    for row in rows {
        if let Some(entry) = row_entry(row, &columns, employee, sheet) {
            entries.push(entry);
        }
    }

    Ok(())
}

/// Positions of the required columns within a sheet's header row.
struct ColumnIndices {
    project: usize,
    time: usize,
    notes: usize,
    date: usize,
}

fn column_indices(header: &[Data]) -> Result<ColumnIndices, &'static str> {
    let find = |name: &'static str| {
        header
            .iter()
            .position(|cell| cell_text(Some(cell)).trim() == name)
            .ok_or(name)
    };

    let [project, time, notes, date] = REQUIRED_COLUMNS;
    Ok(ColumnIndices {
        project: find(project)?,
        time: find(time)?,
        notes: find(notes)?,
        date: find(date)?,
    })
}

fn row_entry(
    row: &[Data],
    columns: &ColumnIndices,
    employee: &str,
    period: &str,
) -> Option<WorkEntry> {
    let project_or_scope = non_empty(cell_text(row.get(columns.project)));
    let time_spent = cell_text(row.get(columns.time)).trim().to_string();
    let notes = non_empty(cell_text(row.get(columns.notes)));
    let date = date_cell(row.get(columns.date));

    // Trailing spreadsheet rows with nothing in them are not entries.
    let date_blank = matches!(date, EntryDate::Unparsed(ref raw) if raw.is_empty());
    if project_or_scope.is_none() && notes.is_none() && time_spent.is_empty() && date_blank {
        return None;
    }

    Some(WorkEntry {
        employee: employee.to_string(),
        period: period.to_string(),
        project_or_scope,
        time_spent,
        notes,
        date,
    })
}

/// Normalize a date cell. Native spreadsheet datetimes convert directly;
/// everything else goes through the textual day-first parser.
fn date_cell(cell: Option<&Data>) -> EntryDate {
    match cell {
        Some(Data::DateTime(dt)) => match dt.as_datetime() {
            Some(datetime) => EntryDate::Parsed(datetime.date()),
            None => EntryDate::Unparsed(format!("{}", dt)),
        },
        Some(Data::DateTimeIso(s)) => EntryDate::parse(s),
        other => EntryDate::parse(&cell_text(other)),
    }
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(Data::Int(n)) => n.to_string(),
        Some(Data::Float(x)) => format!("{}", x),
        Some(Data::Bool(b)) => b.to_string(),
        Some(Data::Error(e)) => format!("#ERR({:?})", e),
        Some(Data::DateTime(dt)) => format!("{}", dt),
        Some(Data::DateTimeIso(s)) => s.clone(),
        Some(Data::DurationIso(s)) => s.clone(),
    }
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    /// Write a workbook with the required header and the given
    /// [project, time, notes, date] rows per sheet.
    fn write_workbook(root: &Path, employee: &str, file: &str, sheets: &[(&str, &[[&str; 4]])]) {
        let folder = root.join(employee);
        std::fs::create_dir_all(&folder).unwrap();

        let mut workbook = Workbook::new();
        for (name, rows) in sheets {
            let sheet = workbook.add_worksheet();
            sheet.set_name(*name).unwrap();
            for (col, header) in REQUIRED_COLUMNS.iter().enumerate() {
                sheet.write(0, col as u16, *header).unwrap();
            }
            for (r, row) in rows.iter().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    sheet.write((r + 1) as u32, c as u16, *value).unwrap();
                }
            }
        }
        workbook.save(folder.join(file)).unwrap();
    }

    #[test]
    fn test_aggregation_is_loss_free() {
        let dir = TempDir::new().unwrap();
        write_workbook(
            dir.path(),
            "alice",
            "log.xlsx",
            &[
                (
                    "November",
                    &[
                        ["atlas", "2h", "fixed the importer", "28.11.2024"],
                        ["atlas", "1h", "reviewed PRs", "29.11.2024"],
                    ],
                ),
                ("December", &[["hermes", "3h", "wrote docs", "02.12.2024"]]),
            ],
        );
        write_workbook(
            dir.path(),
            "bob",
            "log.xlsx",
            &[("December", &[["atlas", "4h", "load testing", "03.12.2024"]])],
        );

        let log = aggregate(dir.path()).unwrap();

        // Unified row count equals the sum of per-sheet row counts.
        assert_eq!(log.len(), 4);

        // Walk order is sorted by file name, so alice comes first.
        assert_eq!(log.entries[0].employee, "alice");
        assert_eq!(log.entries[0].period, "November");
        assert_eq!(log.entries[2].period, "December");
        assert_eq!(log.entries[3].employee, "bob");
        assert_eq!(log.entries[3].project_or_scope.as_deref(), Some("atlas"));
        assert_eq!(log.entries[3].notes.as_deref(), Some("load testing"));
    }

    #[test]
    fn test_dates_are_normalized() {
        let dir = TempDir::new().unwrap();
        write_workbook(
            dir.path(),
            "carol",
            "log.xlsx",
            &[(
                "Mixed",
                &[
                    ["atlas", "1h", "a", "05.12.2024"],
                    ["atlas", "1h", "b", "2024-12-06"],
                    ["atlas", "1h", "c", "sometime last week"],
                ],
            )],
        );

        let log = aggregate(dir.path()).unwrap();
        assert_eq!(log.entries[0].date.to_string(), "05.12.2024");
        assert_eq!(log.entries[1].date.to_string(), "06.12.2024");
        // Unparseable dates are retained, not dropped.
        assert_eq!(
            log.entries[2].date,
            EntryDate::Unparsed("sometime last week".to_string())
        );
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let dir = TempDir::new().unwrap();
        write_workbook(
            dir.path(),
            "dave",
            "log.xlsx",
            &[(
                "November",
                &[
                    ["atlas", "1h", "real entry", "28.11.2024"],
                    ["", "", "", ""],
                ],
            )],
        );

        let log = aggregate(dir.path()).unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_missing_column_fails() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("erin");
        std::fs::create_dir_all(&folder).unwrap();

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("November").unwrap();
        // No "notes" column.
        for (col, header) in ["project_or_scope", "time", "date"].iter().enumerate() {
            sheet.write(0, col as u16, *header).unwrap();
        }
        workbook.save(folder.join("log.xlsx")).unwrap();

        let err = aggregate(dir.path()).unwrap_err();
        match err {
            AggregateError::MissingColumn { sheet, column, .. } => {
                assert_eq!(sheet, "November");
                assert_eq!(column, "notes");
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_no_files_fails() {
        let dir = TempDir::new().unwrap();
        let err = aggregate(dir.path()).unwrap_err();
        assert!(matches!(err, AggregateError::NoFiles(_)));
    }

    #[test]
    fn test_artifact_round_trip() {
        let dir = TempDir::new().unwrap();
        write_workbook(
            dir.path(),
            "alice",
            "log.xlsx",
            &[("November", &[["atlas", "2h", "fixed the importer", "28.11.2024"]])],
        );

        let log = aggregate(dir.path()).unwrap();
        let artifact = dir.path().join("combined.csv");
        write_artifact(&log, &artifact).unwrap();

        let content = std::fs::read_to_string(&artifact).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "User,Month,project_or_scope,time,notes,date"
        );
        assert_eq!(
            lines.next().unwrap(),
            "alice,November,atlas,2h,fixed the importer,28.11.2024"
        );
        assert!(lines.next().is_none());
    }
}
