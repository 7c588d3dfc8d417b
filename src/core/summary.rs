use std::collections::BTreeMap;

use serde::Serialize;

use super::table::ScenarioTable;
use super::types::StatusColor;

const TOP_GRADES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusShare {
    pub status: StatusColor,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeCount {
    pub grade: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub total_scenarios: usize,
    pub status_distribution: Vec<StatusShare>,
    pub fire_achievable_percentage: Option<f64>,
    pub average_retirement_age: Option<f64>,
    pub top_fire_grades: Vec<GradeCount>,
}

impl TableSummary {
    pub fn from_table(table: &ScenarioTable) -> Self {
        let total = table.len();
        let records = table.records();

        let mut by_status: BTreeMap<StatusColor, usize> = BTreeMap::new();
        for record in records {
            *by_status.entry(record.status()).or_default() += 1;
        }
        let status_distribution = [StatusColor::Green, StatusColor::Yellow, StatusColor::Red]
            .into_iter()
            .filter_map(|status| {
                let count = by_status.get(&status).copied()?;
                Some(StatusShare {
                    status,
                    count,
                    percentage: percent(count, total),
                })
            })
            .collect();

        let flags = records
            .iter()
            .filter_map(|r| r.fire_achievable)
            .collect::<Vec<_>>();
        let fire_achievable_percentage = (!flags.is_empty())
            .then(|| percent(flags.iter().filter(|flag| **flag).count(), flags.len()));

        let ages = records
            .iter()
            .filter_map(|r| r.traditional_retirement_age)
            .filter(|age| age.is_finite())
            .collect::<Vec<_>>();
        let average_retirement_age =
            (!ages.is_empty()).then(|| ages.iter().sum::<f64>() / ages.len() as f64);

        let mut grades: BTreeMap<&str, usize> = BTreeMap::new();
        for grade in records.iter().filter_map(|r| r.fire_grade.as_deref()) {
            let grade = grade.trim();
            if !grade.is_empty() {
                *grades.entry(grade).or_default() += 1;
            }
        }
        let mut top_fire_grades = grades
            .into_iter()
            .map(|(grade, count)| GradeCount {
                grade: grade.to_string(),
                count,
            })
            .collect::<Vec<_>>();
        // Stable sort keeps ties in grade order.
        top_fire_grades.sort_by(|a, b| b.count.cmp(&a.count));
        top_fire_grades.truncate(TOP_GRADES);

        Self {
            total_scenarios: total,
            status_distribution,
            fire_achievable_percentage,
            average_retirement_age,
            top_fire_grades,
        }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{record_for, sample_profile};

    fn assert_approx(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(diff < 1e-9, "expected {expected}, got {actual} (diff {diff})");
    }

    #[test]
    fn empty_table_has_no_aggregates() {
        let summary = TableSummary::from_table(&ScenarioTable::new(Vec::new()));
        assert_eq!(summary.total_scenarios, 0);
        assert!(summary.status_distribution.is_empty());
        assert_eq!(summary.fire_achievable_percentage, None);
        assert_eq!(summary.average_retirement_age, None);
        assert!(summary.top_fire_grades.is_empty());
    }

    #[test]
    fn aggregates_mixed_rows() {
        let profile = sample_profile();
        let mut rows = Vec::new();
        for (status, grade, achievable, age) in [
            (Some("green"), "A", Some(true), Some(60.0)),
            (Some("green"), "B", Some(false), Some(64.0)),
            (Some("red"), "B", Some(false), None),
            (None, "C", None, Some(68.0)),
        ] {
            let mut record = record_for(&profile);
            record.status_color = status.map(str::to_string);
            record.fire_grade = Some(grade.to_string());
            record.fire_achievable = achievable;
            record.traditional_retirement_age = age;
            rows.push(record);
        }

        let summary = TableSummary::from_table(&ScenarioTable::new(rows));
        assert_eq!(summary.total_scenarios, 4);

        let shares = summary
            .status_distribution
            .iter()
            .map(|s| (s.status, s.count))
            .collect::<Vec<_>>();
        assert_eq!(
            shares,
            vec![
                (StatusColor::Green, 2),
                (StatusColor::Yellow, 1),
                (StatusColor::Red, 1),
            ]
        );
        assert_approx(summary.status_distribution[0].percentage, 50.0);

        assert_approx(summary.fire_achievable_percentage.expect("flags present"), 100.0 / 3.0);
        assert_approx(summary.average_retirement_age.expect("ages present"), 64.0);

        assert_eq!(summary.top_fire_grades[0].grade, "B");
        assert_eq!(summary.top_fire_grades[0].count, 2);
        assert_eq!(summary.top_fire_grades[1].grade, "A");
        assert_eq!(summary.top_fire_grades.len(), 3);
    }

    #[test]
    fn top_grades_are_capped() {
        let profile = sample_profile();
        let rows = ["A+", "A", "B", "C", "D", "E", "A"]
            .into_iter()
            .map(|grade| {
                let mut record = record_for(&profile);
                record.fire_grade = Some(grade.to_string());
                record
            })
            .collect();
        let summary = TableSummary::from_table(&ScenarioTable::new(rows));
        assert_eq!(summary.top_fire_grades.len(), 5);
        assert_eq!(summary.top_fire_grades[0].grade, "A");
    }
}
