use super::codec::encode;
use super::types::{Profile, ScenarioRecord};

pub(crate) fn sample_profile() -> Profile {
    Profile {
        age_bucket: "30-34".to_string(),
        current_savings_bucket: "b".to_string(),
        expected_expenses_bucket: "c".to_string(),
        gender: "m".to_string(),
        household_size: 2,
        housing_status: "rent".to_string(),
        income_bucket: "c".to_string(),
        marital_status: "m".to_string(),
        monthly_savings_bucket: "c".to_string(),
        retirement_age_bucket: "65".to_string(),
    }
}

pub(crate) fn record_for(profile: &Profile) -> ScenarioRecord {
    ScenarioRecord {
        pk: Some("retirement".to_string()),
        sk: Some(encode(profile)),
        age_bucket: Some(profile.age_bucket.clone()),
        current_savings_bucket: Some(profile.current_savings_bucket.clone()),
        expected_expenses_bucket: Some(profile.expected_expenses_bucket.clone()),
        gender: Some(profile.gender.clone()),
        household_size: Some(profile.household_size.to_string()),
        housing_status: Some(profile.housing_status.clone()),
        income_bucket: Some(profile.income_bucket.clone()),
        marital_status: Some(profile.marital_status.clone()),
        monthly_savings_bucket: Some(profile.monthly_savings_bucket.clone()),
        retirement_age_bucket: Some(profile.retirement_age_bucket.clone()),
        age_midpoint: Some(32.0),
        income_midpoint: Some(7_500_000.0),
        current_savings_midpoint: Some(3_000_000.0),
        monthly_savings_midpoint: Some(250_000.0),
        expected_expenses_midpoint: Some(125_000.0),
        retirement_age_midpoint: Some(65.0),
        fire_grade: Some("B".to_string()),
        fire_percentage: Some(62.5),
        fire_achievable: Some(false),
        fire_number: Some(37_500_000.0),
        projected_wealth: Some(23_400_000.0),
        traditional_grade: Some("A".to_string()),
        traditional_retirement_age: Some(63.0),
        traditional_number: Some(12_000_000.0),
        on_time_retirement: Some(true),
        early_retirement_ready: Some(2.0),
        late_retirement: Some(0.0),
        status_color: Some("green".to_string()),
        wealth_timeline: None,
    }
}
