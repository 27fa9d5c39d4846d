use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One cleaned hospital visit.
///
/// Every record that survives the loader has the three required fields
/// trimmed, non-empty, and well-typed; a row that fails coercion is dropped
/// whole, never retained partially valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub department: String,
    pub patient_id: String,
    pub visit_date: NaiveDate,
    /// Optional passthrough; `None` when the column is absent or the cell
    /// fails numeric coercion.
    pub length_of_stay_days: Option<f64>,
    pub gender: Option<String>,
    pub age: Option<u32>,
}

/// Loader output: surviving records in original row order, plus the schema
/// facts and loss accounting the reporter and the logs need.
#[derive(Debug, Clone, Serialize)]
pub struct VisitSet {
    pub records: Vec<VisitRecord>,
    /// Whether `length_of_stay_days` was present in the header at all, as
    /// opposed to present but unparseable in every row.
    pub has_length_of_stay: bool,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

/// One row of the per-department aggregate: distinct patients attributed to
/// the department and that count's share of the sum of all counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentStat {
    pub department: String,
    pub patient_count: usize,
    pub percentage: f64,
}
