use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The ten bucket fields, in canonical key order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum BucketField {
    AgeBucket,
    CurrentSavingsBucket,
    ExpectedExpensesBucket,
    Gender,
    HouseholdSize,
    HousingStatus,
    IncomeBucket,
    MaritalStatus,
    MonthlySavingsBucket,
    RetirementAgeBucket,
}

impl BucketField {
    pub const ALL: [BucketField; 10] = [
        BucketField::AgeBucket,
        BucketField::CurrentSavingsBucket,
        BucketField::ExpectedExpensesBucket,
        BucketField::Gender,
        BucketField::HouseholdSize,
        BucketField::HousingStatus,
        BucketField::IncomeBucket,
        BucketField::MaritalStatus,
        BucketField::MonthlySavingsBucket,
        BucketField::RetirementAgeBucket,
    ];

    pub fn column(self) -> &'static str {
        match self {
            BucketField::AgeBucket => "age_bucket",
            BucketField::CurrentSavingsBucket => "current_savings_bucket",
            BucketField::ExpectedExpensesBucket => "expected_expenses_bucket",
            BucketField::Gender => "gender",
            BucketField::HouseholdSize => "household_size",
            BucketField::HousingStatus => "housing_status",
            BucketField::IncomeBucket => "income_bucket",
            BucketField::MaritalStatus => "marital_status",
            BucketField::MonthlySavingsBucket => "monthly_savings_bucket",
            BucketField::RetirementAgeBucket => "retirement_age_bucket",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(alias = "age_bucket")]
    pub age_bucket: String,
    #[serde(alias = "current_savings_bucket")]
    pub current_savings_bucket: String,
    #[serde(alias = "expected_expenses_bucket")]
    pub expected_expenses_bucket: String,
    pub gender: String,
    #[serde(alias = "household_size")]
    pub household_size: u32,
    #[serde(alias = "housing_status")]
    pub housing_status: String,
    #[serde(alias = "income_bucket")]
    pub income_bucket: String,
    #[serde(alias = "marital_status")]
    pub marital_status: String,
    #[serde(alias = "monthly_savings_bucket")]
    pub monthly_savings_bucket: String,
    #[serde(alias = "retirement_age_bucket")]
    pub retirement_age_bucket: String,
}

impl Profile {
    pub fn token(&self, field: BucketField) -> String {
        match field {
            BucketField::AgeBucket => self.age_bucket.clone(),
            BucketField::CurrentSavingsBucket => self.current_savings_bucket.clone(),
            BucketField::ExpectedExpensesBucket => self.expected_expenses_bucket.clone(),
            BucketField::Gender => self.gender.clone(),
            BucketField::HouseholdSize => self.household_size.to_string(),
            BucketField::HousingStatus => self.housing_status.clone(),
            BucketField::IncomeBucket => self.income_bucket.clone(),
            BucketField::MaritalStatus => self.marital_status.clone(),
            BucketField::MonthlySavingsBucket => self.monthly_savings_bucket.clone(),
            BucketField::RetirementAgeBucket => self.retirement_age_bucket.clone(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
}

impl StatusColor {
    /// Missing status reads as `Yellow`; any unrecognised token reads as `Red`.
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(|t| t.trim().to_ascii_lowercase()) {
            None => StatusColor::Yellow,
            Some(t) if t == "green" => StatusColor::Green,
            Some(t) if t == "yellow" => StatusColor::Yellow,
            Some(_) => StatusColor::Red,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusColor::Green => "green",
            StatusColor::Yellow => "yellow",
            StatusColor::Red => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StoredTimeline {
    Sequence(Vec<Value>),
    Encoded(String),
    Other(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ScenarioRecord {
    #[serde(default, deserialize_with = "de_token")]
    pub pk: Option<String>,
    #[serde(default, deserialize_with = "de_token")]
    pub sk: Option<String>,

    #[serde(default, deserialize_with = "de_token")]
    pub age_bucket: Option<String>,
    #[serde(default, deserialize_with = "de_token")]
    pub current_savings_bucket: Option<String>,
    #[serde(default, deserialize_with = "de_token")]
    pub expected_expenses_bucket: Option<String>,
    #[serde(default, deserialize_with = "de_token")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "de_token")]
    pub household_size: Option<String>,
    #[serde(default, deserialize_with = "de_token")]
    pub housing_status: Option<String>,
    #[serde(default, deserialize_with = "de_token")]
    pub income_bucket: Option<String>,
    #[serde(default, deserialize_with = "de_token")]
    pub marital_status: Option<String>,
    #[serde(default, deserialize_with = "de_token")]
    pub monthly_savings_bucket: Option<String>,
    #[serde(default, deserialize_with = "de_token")]
    pub retirement_age_bucket: Option<String>,

    #[serde(default, deserialize_with = "de_number")]
    pub age_midpoint: Option<f64>,
    #[serde(default, deserialize_with = "de_number")]
    pub income_midpoint: Option<f64>,
    #[serde(default, deserialize_with = "de_number")]
    pub current_savings_midpoint: Option<f64>,
    #[serde(default, deserialize_with = "de_number")]
    pub monthly_savings_midpoint: Option<f64>,
    #[serde(default, deserialize_with = "de_number")]
    pub expected_expenses_midpoint: Option<f64>,
    #[serde(default, deserialize_with = "de_number")]
    pub retirement_age_midpoint: Option<f64>,

    #[serde(default, deserialize_with = "de_token")]
    pub fire_grade: Option<String>,
    #[serde(default, deserialize_with = "de_number")]
    pub fire_percentage: Option<f64>,
    #[serde(default, deserialize_with = "de_flag")]
    pub fire_achievable: Option<bool>,
    #[serde(default, deserialize_with = "de_number")]
    pub fire_number: Option<f64>,
    #[serde(default, deserialize_with = "de_number")]
    pub projected_wealth: Option<f64>,
    #[serde(default, deserialize_with = "de_token")]
    pub traditional_grade: Option<String>,
    #[serde(default, deserialize_with = "de_number")]
    pub traditional_retirement_age: Option<f64>,
    #[serde(default, deserialize_with = "de_number")]
    pub traditional_number: Option<f64>,
    #[serde(default, deserialize_with = "de_flag")]
    pub on_time_retirement: Option<bool>,
    #[serde(default, deserialize_with = "de_number")]
    pub early_retirement_ready: Option<f64>,
    #[serde(default, deserialize_with = "de_number")]
    pub late_retirement: Option<f64>,
    #[serde(default, deserialize_with = "de_token")]
    pub status_color: Option<String>,

    #[serde(default, skip_serializing)]
    pub wealth_timeline: Option<StoredTimeline>,
}

impl ScenarioRecord {
    pub fn bucket(&self, field: BucketField) -> Option<&str> {
        let value = match field {
            BucketField::AgeBucket => &self.age_bucket,
            BucketField::CurrentSavingsBucket => &self.current_savings_bucket,
            BucketField::ExpectedExpensesBucket => &self.expected_expenses_bucket,
            BucketField::Gender => &self.gender,
            BucketField::HouseholdSize => &self.household_size,
            BucketField::HousingStatus => &self.housing_status,
            BucketField::IncomeBucket => &self.income_bucket,
            BucketField::MaritalStatus => &self.marital_status,
            BucketField::MonthlySavingsBucket => &self.monthly_savings_bucket,
            BucketField::RetirementAgeBucket => &self.retirement_age_bucket,
        };
        value.as_deref()
    }

    pub fn status(&self) -> StatusColor {
        StatusColor::from_token(self.status_color.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub age: f64,
    pub wealth: f64,
    pub year: Option<i32>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineSource {
    Stored,
    Synthesized,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WealthTimeline {
    pub source: TimelineSource,
    pub points: Vec<TimelinePoint>,
}

impl WealthTimeline {
    pub fn unavailable() -> Self {
        Self {
            source: TimelineSource::Unavailable,
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn de_token<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.is_finite() && f.fract() == 0.0 => format!("{}", f as i64),
            _ => n.to_string(),
        }),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn de_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn de_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    })
}
