use std::collections::BTreeSet;

use super::types::{BucketField, Profile};

pub const KEY_PREFIX: &str = "combo";
pub const KEY_DELIMITER: &str = "__";

const RETIREMENT_AGE_ALIASES: [[&str; 2]; 2] = [["65", "65+"], ["70", "70+"]];

pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn canonicalize_retirement_age(value: &str) -> BTreeSet<String> {
    let token = normalize(value);
    for group in RETIREMENT_AGE_ALIASES {
        if group.contains(&token.as_str()) {
            return group.iter().map(|t| t.to_string()).collect();
        }
    }
    BTreeSet::from([token])
}

/// Household size is keyed as a plain integer; `2`, `2.0` and `" 2 "` collide.
pub fn household_token(value: &str) -> String {
    let token = normalize(value);
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        _ => token,
    }
}

pub fn field_token(field: BucketField, raw: &str) -> String {
    match field {
        BucketField::HouseholdSize => household_token(raw),
        _ => normalize(raw),
    }
}

pub fn encode(profile: &Profile) -> String {
    join_key(
        BucketField::ALL
            .iter()
            .map(|field| field_token(*field, &profile.token(*field))),
    )
}

pub(crate) fn join_key<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut key = String::with_capacity(64);
    key.push_str(KEY_PREFIX);
    for segment in segments {
        key.push_str(KEY_DELIMITER);
        key.push_str(segment.as_ref());
    }
    key
}
