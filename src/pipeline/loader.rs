//! CSV loading and cleaning.
//!
//! The loader is the only stage that sees the raw, name-indexed table.
//! Everything downstream operates on [`VisitRecord`], never on a free-form
//! row.

use crate::domain::{VisitRecord, VisitSet};
use crate::error::{AnalyzeError, Result};
use crate::observability::metrics as obs;
use chrono::{DateTime, NaiveDate};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Columns that must be present in the header, in reporting order.
const REQUIRED_COLUMNS: [&str; 3] = ["department", "patient_id", "visit_date"];

/// Date formats tried in order before falling back to RFC 3339 timestamps.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Parses and cleans a visits CSV.
///
/// Fails only on a missing required column or a file-level parse error.
/// Row-level invalidity (empty id, unparseable date) is not an error: the
/// row is dropped and the cleaned set is the input's valid subset, in
/// original order. An empty survivor set is a valid result.
pub fn load_visits<R: Read>(reader: R) -> Result<VisitSet> {
    let mut csv_reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let index_of = |name: &str| headers.iter().position(|h| h == name);

    let mut required = [0usize; 3];
    let mut missing = Vec::new();
    for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
        match index_of(name) {
            Some(i) => required[slot] = i,
            None => missing.push((*name).to_string()),
        }
    }
    if !missing.is_empty() {
        obs::record_schema_error();
        return Err(AnalyzeError::MissingColumns(missing));
    }
    let [department_idx, patient_idx, date_idx] = required;

    let length_of_stay_idx = index_of("length_of_stay_days");
    let gender_idx = index_of("gender");
    let age_idx = index_of("age");

    let mut records = Vec::new();
    let mut rows_read = 0usize;
    for row in csv_reader.records() {
        let row = row?;
        rows_read += 1;

        let department = cell(&row, department_idx);
        let patient_id = cell(&row, patient_idx);
        if department.is_empty() || patient_id.is_empty() {
            debug!(row = rows_read, "dropping row: empty department or patient_id");
            continue;
        }
        let Some(visit_date) = parse_visit_date(cell(&row, date_idx)) else {
            debug!(row = rows_read, "dropping row: unparseable visit_date");
            continue;
        };

        records.push(VisitRecord {
            department: department.to_string(),
            patient_id: patient_id.to_string(),
            visit_date,
            length_of_stay_days: length_of_stay_idx.and_then(|i| parse_lenient_f64(cell(&row, i))),
            gender: gender_idx.and_then(|i| {
                let value = cell(&row, i);
                (!value.is_empty()).then(|| value.to_string())
            }),
            age: age_idx.and_then(|i| cell(&row, i).parse::<u32>().ok()),
        });
    }

    let rows_dropped = rows_read - records.len();
    obs::record_rows(rows_read, records.len(), rows_dropped);
    info!(rows_read, rows_kept = records.len(), rows_dropped, "loaded visit records");

    Ok(VisitSet {
        records,
        has_length_of_stay: length_of_stay_idx.is_some(),
        rows_read,
        rows_dropped,
    })
}

/// Convenience wrapper over [`load_visits`] for on-disk files.
pub fn load_visits_path(path: &Path) -> Result<VisitSet> {
    load_visits(File::open(path)?)
}

/// Missing cells (short rows) read as empty, same as blank cells.
fn cell<'r>(row: &'r StringRecord, index: usize) -> &'r str {
    row.get(index).map(str::trim).unwrap_or("")
}

/// Tries the common date formats in order, then RFC 3339 timestamps
/// truncated to their date. Anything unparseable is treated as missing.
fn parse_visit_date(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}

fn parse_lenient_f64(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
