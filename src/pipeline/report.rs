//! Summary statistics over the cleaned set and the aggregate.

use crate::domain::{DepartmentStat, VisitSet};
use crate::pipeline::aggregate::round2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopDepartment {
    pub department: String,
    pub patient_count: usize,
}

/// Scalar summary derived from the cleaned records and the aggregate.
/// A pure projection, recomputed from scratch on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    /// Distinct patient ids across the whole cleaned set. May be less than
    /// the sum of per-department counts when patients span departments.
    pub total_patients: usize,
    pub total_visits: usize,
    pub unique_departments: usize,
    /// First aggregate row; `None` when the aggregate is empty.
    pub top_department: Option<TopDepartment>,
    /// Mean of the valid `length_of_stay_days` values, two decimals. `None`
    /// when the column is absent or no valid values remain.
    pub avg_length_of_stay: Option<f64>,
}

impl SummaryReport {
    pub fn build(visits: &VisitSet, aggregate: &[DepartmentStat]) -> Self {
        let total_patients = visits
            .records
            .iter()
            .map(|r| r.patient_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        let top_department = aggregate.first().map(|stat| TopDepartment {
            department: stat.department.clone(),
            patient_count: stat.patient_count,
        });

        let avg_length_of_stay = visits
            .has_length_of_stay
            .then(|| {
                let values: Vec<f64> =
                    visits.records.iter().filter_map(|r| r.length_of_stay_days).collect();
                if values.is_empty() {
                    None
                } else {
                    Some(round2(values.iter().sum::<f64>() / values.len() as f64))
                }
            })
            .flatten();

        SummaryReport {
            total_patients,
            total_visits: visits.records.len(),
            unique_departments: aggregate.len(),
            top_department,
            avg_length_of_stay,
        }
    }

    /// The human-readable stats block, one line per present stat.
    pub fn render_text(&self) -> String {
        let mut lines = vec![
            format!("Total patients: {}", self.total_patients),
            format!("Total visits: {}", self.total_visits),
            format!("Unique departments: {}", self.unique_departments),
        ];
        if let Some(top) = &self.top_department {
            lines.push(format!("Top department: {} ({} patients)", top.department, top.patient_count));
        }
        if let Some(avg) = self.avg_length_of_stay {
            lines.push(format!("Average length of stay (days): {avg:.2}"));
        }
        lines.join("\n")
    }
}
