//! Per-department aggregation.

use crate::domain::{DepartmentStat, VisitRecord};
use std::collections::{HashMap, HashSet};

/// Counts distinct patients per department and attaches the percentage
/// split.
///
/// Grouping is by exact department string (trimming happened upstream). A
/// patient with several visits to the same department counts once there; a
/// patient seen in two departments counts once in each. Rows are sorted by
/// patient count descending, department name ascending on ties, so the
/// output order is deterministic.
pub fn department_counts(records: &[VisitRecord]) -> Vec<DepartmentStat> {
    let mut patients_by_department: HashMap<&str, HashSet<&str>> = HashMap::new();
    for record in records {
        patients_by_department
            .entry(record.department.as_str())
            .or_default()
            .insert(record.patient_id.as_str());
    }

    let mut stats: Vec<DepartmentStat> = patients_by_department
        .into_iter()
        .map(|(department, patients)| DepartmentStat {
            department: department.to_string(),
            patient_count: patients.len(),
            percentage: 0.0,
        })
        .collect();
    stats.sort_by(|a, b| {
        b.patient_count
            .cmp(&a.patient_count)
            .then_with(|| a.department.cmp(&b.department))
    });

    percentage_split(stats)
}

/// Fills in each row's share of the sum of per-department counts, rounded
/// half-up to two decimals. An empty aggregate passes through untouched so
/// the zero denominator never divides.
pub fn percentage_split(mut stats: Vec<DepartmentStat>) -> Vec<DepartmentStat> {
    let total: usize = stats.iter().map(|s| s.patient_count).sum();
    if total == 0 {
        return stats;
    }
    for stat in &mut stats {
        stat.percentage = round2(stat.patient_count as f64 / total as f64 * 100.0);
    }
    stats
}

/// Round half-up (away from zero) to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn visit(department: &str, patient_id: &str, day: u32) -> VisitRecord {
        VisitRecord {
            department: department.to_string(),
            patient_id: patient_id.to_string(),
            visit_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            length_of_stay_days: None,
            gender: None,
            age: None,
        }
    }

    #[test]
    fn counts_distinct_patients_and_sorts_descending() {
        let records = vec![visit("ER", "P1", 1), visit("ER", "P2", 2), visit("ICU", "P1", 3)];

        let stats = department_counts(&records);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].department, "ER");
        assert_eq!(stats[0].patient_count, 2);
        assert!((stats[0].percentage - 66.67).abs() < 1e-9);
        assert_eq!(stats[1].department, "ICU");
        assert_eq!(stats[1].patient_count, 1);
        assert!((stats[1].percentage - 33.33).abs() < 1e-9);
    }

    #[test]
    fn repeat_visits_to_one_department_count_once() {
        let records = vec![visit("ER", "P1", 1), visit("ER", "P1", 2), visit("ER", "P1", 3)];

        let stats = department_counts(&records);

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].patient_count, 1);
        assert!((stats[0].percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn multi_department_patient_counts_in_each() {
        let records = vec![visit("ER", "P1", 1), visit("ICU", "P1", 2)];

        let stats = department_counts(&records);

        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.patient_count == 1));
        // The percentage denominator is the sum of per-department counts,
        // so shares still total 100 even though both rows are one patient.
        assert!((stats.iter().map(|s| s.percentage).sum::<f64>() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn ties_break_by_department_name_ascending() {
        let records = vec![
            visit("Oncology", "P1", 1),
            visit("Cardiology", "P2", 2),
            visit("ICU", "P3", 3),
        ];

        let stats = department_counts(&records);

        let order: Vec<&str> = stats.iter().map(|s| s.department.as_str()).collect();
        assert_eq!(order, vec!["Cardiology", "ICU", "Oncology"]);
    }

    #[test]
    fn empty_input_yields_empty_aggregate() {
        assert!(department_counts(&[]).is_empty());
        assert!(percentage_split(Vec::new()).is_empty());
    }

    #[test]
    fn percentages_sum_to_one_hundred_within_rounding() {
        let records = vec![
            visit("A", "P1", 1),
            visit("A", "P2", 1),
            visit("A", "P3", 1),
            visit("B", "P4", 2),
            visit("B", "P5", 2),
            visit("C", "P6", 3),
            visit("D", "P7", 4),
        ];

        let stats = department_counts(&records);
        let sum: f64 = stats.iter().map(|s| s.percentage).sum();

        assert!((sum - 100.0).abs() <= 0.01 * stats.len() as f64, "sum was {sum}");
    }

    #[test]
    fn rounding_is_half_up_to_two_decimals() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
        // 0.125 is exact in binary, so the half-up behavior is observable
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(50.0), 50.0);
    }
}
