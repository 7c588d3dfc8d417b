use serde::Serialize;
use tracing::debug;

use super::codec::{canonicalize_retirement_age, normalize};
use super::index::ScenarioIndex;
use super::table::ScenarioTable;
use super::types::{BucketField, Profile, ScenarioRecord};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupStrategy {
    Indexed,
    Scan,
}

#[derive(Debug, Clone, Copy)]
pub struct LookupHit<'t> {
    pub position: usize,
    pub record: &'t ScenarioRecord,
    pub strategy: LookupStrategy,
}

pub fn lookup<'t>(
    table: &'t ScenarioTable,
    index: Option<&ScenarioIndex>,
    profile: &Profile,
) -> Option<LookupHit<'t>> {
    let (strategy, position) = match index {
        Some(index) => (LookupStrategy::Indexed, index.find(table, profile)),
        None => (LookupStrategy::Scan, scan(table, profile)),
    };
    debug!(?strategy, ?position, "scenario lookup");

    let position = position?;
    table.get(position).map(|record| LookupHit {
        position,
        record,
        strategy,
    })
}

pub fn scan(table: &ScenarioTable, profile: &Profile) -> Option<usize> {
    let predicate = ProfilePredicate::new(table, profile);
    table
        .records()
        .iter()
        .position(|record| predicate.matches(record))
}

enum FieldTest {
    Text(String),
    Numeric(f64),
    OneOf(Vec<String>),
}

struct ProfilePredicate {
    tests: Vec<(BucketField, FieldTest)>,
}

impl ProfilePredicate {
    fn new(table: &ScenarioTable, profile: &Profile) -> Self {
        let tests = BucketField::ALL
            .iter()
            .copied()
            .filter(|field| table.has_column(*field))
            .map(|field| {
                let test = match field {
                    BucketField::HouseholdSize => {
                        FieldTest::Numeric(f64::from(profile.household_size))
                    }
                    BucketField::RetirementAgeBucket => FieldTest::OneOf(
                        canonicalize_retirement_age(&profile.retirement_age_bucket)
                            .into_iter()
                            .collect(),
                    ),
                    _ => FieldTest::Text(normalize(&profile.token(field))),
                };
                (field, test)
            })
            .collect();
        Self { tests }
    }

    fn matches(&self, record: &ScenarioRecord) -> bool {
        self.tests.iter().all(|(field, test)| {
            let Some(cell) = record.bucket(*field) else {
                return false;
            };
            match test {
                FieldTest::Text(expected) => normalize(cell) == *expected,
                FieldTest::Numeric(expected) => cell
                    .trim()
                    .parse::<f64>()
                    .is_ok_and(|actual| actual.is_finite() && actual == *expected),
                FieldTest::OneOf(choices) => {
                    let cell = normalize(cell);
                    choices.iter().any(|choice| *choice == cell)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codec::encode;
    use crate::core::fixtures::{record_for, sample_profile};
    use crate::core::index::derived_key;

    fn both_strategies(table: &ScenarioTable, profile: &Profile) -> [Option<usize>; 2] {
        let index = ScenarioIndex::build(table);
        [
            lookup(table, Some(&index), profile).map(|hit| hit.position),
            lookup(table, None, profile).map(|hit| hit.position),
        ]
    }

    #[test]
    fn end_to_end_profile_resolves_single_record() {
        let profile = sample_profile();
        let record = record_for(&profile);
        assert_eq!(
            derived_key(&record),
            "combo__30-34__b__c__m__2__rent__c__m__c__65"
        );

        let table = ScenarioTable::new(vec![record.clone()]);
        for position in both_strategies(&table, &profile) {
            assert_eq!(position, Some(0));
        }

        let index = ScenarioIndex::build(&table);
        let hit = lookup(&table, Some(&index), &profile).expect("record expected");
        assert_eq!(hit.record, &record);
        assert_eq!(hit.strategy, LookupStrategy::Indexed);
    }

    #[test]
    fn empty_table_is_not_found() {
        let table = ScenarioTable::new(Vec::new());
        for position in both_strategies(&table, &sample_profile()) {
            assert_eq!(position, None);
        }
    }

    #[test]
    fn unknown_key_is_not_found() {
        let table = ScenarioTable::new(vec![record_for(&sample_profile())]);
        let mut other = sample_profile();
        other.income_bucket = "e".to_string();
        for position in both_strategies(&table, &other) {
            assert_eq!(position, None);
        }
    }

    #[test]
    fn scan_returns_first_match_in_table_order() {
        let profile = sample_profile();
        let mut unrelated = record_for(&profile);
        unrelated.gender = Some("f".to_string());
        let first = record_for(&profile);
        let mut second = record_for(&profile);
        second.fire_grade = Some("D".to_string());

        let table = ScenarioTable::new(vec![unrelated, first, second]);
        for position in both_strategies(&table, &profile) {
            assert_eq!(position, Some(1));
        }
    }

    #[test]
    fn scan_compares_text_case_insensitively() {
        let profile = sample_profile();
        let mut record = record_for(&profile);
        record.income_bucket = Some("C".to_string());
        record.housing_status = Some(" Rent".to_string());

        let table = ScenarioTable::new(vec![record]);
        for position in both_strategies(&table, &profile) {
            assert_eq!(position, Some(0));
        }
    }

    #[test]
    fn scan_coerces_household_size_and_rejects_non_numeric() {
        let profile = sample_profile();
        let mut decimal = record_for(&profile);
        decimal.household_size = Some("2.0".to_string());
        let mut garbage = record_for(&profile);
        garbage.household_size = Some("two".to_string());

        let table = ScenarioTable::new(vec![garbage, decimal]);
        assert_eq!(scan(&table, &profile), Some(1));
    }

    #[test]
    fn scan_accepts_retirement_age_aliases() {
        let profile = sample_profile();
        let mut record = record_for(&profile);
        record.retirement_age_bucket = Some("65+".to_string());

        let table = ScenarioTable::new(vec![record]);
        assert_eq!(scan(&table, &profile), Some(0));
    }

    #[test]
    fn scan_skips_columns_missing_from_schema() {
        let profile = sample_profile();
        let mut record = record_for(&profile);
        record.expected_expenses_bucket = None;

        let table = ScenarioTable::new(vec![record]);
        let mut other_expenses = profile.clone();
        other_expenses.expected_expenses_bucket = "a".to_string();
        for position in both_strategies(&table, &other_expenses) {
            assert_eq!(position, Some(0));
        }
    }

    #[test]
    fn encode_and_index_agree_on_mixed_case_profiles() {
        let profile = sample_profile();
        let table = ScenarioTable::new(vec![record_for(&profile)]);
        let mut loud = profile.clone();
        loud.housing_status = "RENT".to_string();
        loud.retirement_age_bucket = "65+".to_string();
        assert_ne!(encode(&loud), encode(&profile));
        for position in both_strategies(&table, &loud) {
            assert_eq!(position, Some(0));
        }
    }
}
