use super::codec::normalize;
use super::types::{ScenarioRecord, TimelinePoint};

pub const DEFAULT_ANNUAL_GROWTH_RATE: f64 = 0.07;
pub const DEFAULT_WITHDRAWAL_RATE: f64 = 0.04;
pub const DEFAULT_EPOCH_YEAR: i32 = 2024;

const FALLBACK_CURRENT_AGE: f64 = 32.0;
const FALLBACK_CURRENT_SAVINGS: f64 = 2_500_000.0;
const FALLBACK_MONTHLY_SAVINGS: f64 = 150_000.0;
const FALLBACK_RETIREMENT_AGE: f64 = 65.0;
const MAX_PROJECTION_YEARS: u32 = 120;

const AGE_DEFAULTS: [(&str, f64); 6] = [
    ("20-29", 25.0),
    ("30-34", 32.0),
    ("35-39", 37.0),
    ("40-44", 42.0),
    ("45-49", 47.0),
    ("50", 55.0),
];

const CURRENT_SAVINGS_DEFAULTS: [(&str, f64); 5] = [
    ("a", 500_000.0),
    ("b", 2_500_000.0),
    ("c", 12_500_000.0),
    ("d", 35_000_000.0),
    ("e", 75_000_000.0),
];

const MONTHLY_SAVINGS_DEFAULTS: [(&str, f64); 6] = [
    ("a", 50_000.0),
    ("b", 150_000.0),
    ("c", 250_000.0),
    ("d", 400_000.0),
    ("e", 650_000.0),
    ("f", 900_000.0),
];

const RETIREMENT_AGE_DEFAULTS: [(&str, f64); 6] = [
    ("50-59", 55.0),
    ("60-64", 62.0),
    ("65", 65.0),
    ("65+", 65.0),
    ("70", 70.0),
    ("70+", 70.0),
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RetirementYearPhase {
    Working,
    Retired,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineConfig {
    pub annual_growth_rate: f64,
    pub withdrawal_rate: f64,
    pub sample_step_years: u32,
    pub post_retirement_years: f64,
    pub max_age: f64,
    pub epoch_year: i32,
    pub retirement_year_phase: RetirementYearPhase,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            annual_growth_rate: DEFAULT_ANNUAL_GROWTH_RATE,
            withdrawal_rate: DEFAULT_WITHDRAWAL_RATE,
            sample_step_years: 3,
            post_retirement_years: 5.0,
            max_age: 80.0,
            epoch_year: DEFAULT_EPOCH_YEAR,
            retirement_year_phase: RetirementYearPhase::Working,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionInputs {
    pub current_age: f64,
    pub current_savings: f64,
    pub monthly_savings: f64,
    pub retirement_age: f64,
}

impl ProjectionInputs {
    pub fn from_record(record: &ScenarioRecord) -> Self {
        let current_age = positive(record.age_midpoint)
            .or_else(|| bucket_default(&AGE_DEFAULTS, record.age_bucket.as_deref()))
            .unwrap_or(FALLBACK_CURRENT_AGE);
        let current_savings = positive(record.current_savings_midpoint)
            .or_else(|| {
                bucket_default(
                    &CURRENT_SAVINGS_DEFAULTS,
                    record.current_savings_bucket.as_deref(),
                )
            })
            .unwrap_or(FALLBACK_CURRENT_SAVINGS);
        let monthly_savings = positive(record.monthly_savings_midpoint)
            .or_else(|| {
                bucket_default(
                    &MONTHLY_SAVINGS_DEFAULTS,
                    record.monthly_savings_bucket.as_deref(),
                )
            })
            .unwrap_or(FALLBACK_MONTHLY_SAVINGS);
        let retirement_age = positive(record.traditional_retirement_age)
            .or_else(|| positive(record.retirement_age_midpoint))
            .or_else(|| {
                bucket_default(
                    &RETIREMENT_AGE_DEFAULTS,
                    record.retirement_age_bucket.as_deref(),
                )
            })
            .unwrap_or(FALLBACK_RETIREMENT_AGE);

        Self {
            current_age,
            current_savings,
            monthly_savings,
            retirement_age,
        }
    }

    fn is_finite(&self) -> bool {
        self.current_age.is_finite()
            && self.current_savings.is_finite()
            && self.monthly_savings.is_finite()
            && self.retirement_age.is_finite()
    }
}

/// Grid points every `sample_step_years`, plus the retirement age when off the grid.
pub fn project_wealth(inputs: &ProjectionInputs, config: &TimelineConfig) -> Vec<TimelinePoint> {
    if !inputs.is_finite()
        || !config.annual_growth_rate.is_finite()
        || !config.withdrawal_rate.is_finite()
        || !config.max_age.is_finite()
    {
        return Vec::new();
    }

    let step = config.sample_step_years.max(1);
    let start_age = inputs.current_age;
    let retirement_age = inputs.retirement_age;
    let end_age = (retirement_age + config.post_retirement_years).min(config.max_age);
    let years_until =
        |age: f64| ((age - start_age).floor().max(0.0) as u32).min(MAX_PROJECTION_YEARS);
    let grid_years = years_until(end_age);
    // Retirement past the age ceiling gets no point of its own.
    let years_to_retirement = (retirement_age > start_age && retirement_age <= config.max_age)
        .then(|| years_until(retirement_age));
    let horizon = grid_years.max(years_to_retirement.unwrap_or(0));
    let annual_contribution = inputs.monthly_savings * 12.0;

    let mut wealth = inputs.current_savings.max(0.0);
    let mut points = Vec::with_capacity((horizon / step) as usize + 2);
    points.push(point(start_age, wealth, config.epoch_year, 0));

    for year in 1..=horizon {
        let age = start_age + f64::from(year);
        let working = match config.retirement_year_phase {
            RetirementYearPhase::Working => age <= retirement_age,
            RetirementYearPhase::Retired => age < retirement_age,
        };

        wealth = if working {
            wealth * (1.0 + config.annual_growth_rate) + annual_contribution
        } else {
            let grown = wealth * (1.0 + config.annual_growth_rate);
            grown - grown * config.withdrawal_rate
        };
        wealth = wealth.max(0.0);

        let on_grid = year <= grid_years && year % step == 0;
        if on_grid {
            points.push(point(age, wealth, config.epoch_year, year));
        }
        if years_to_retirement == Some(year) && (!on_grid || age != retirement_age) {
            points.push(point(retirement_age, wealth, config.epoch_year, year));
        }
    }

    if points.iter().any(|p| !p.wealth.is_finite()) {
        return Vec::new();
    }
    points
}

fn point(age: f64, wealth: f64, epoch_year: i32, years_elapsed: u32) -> TimelinePoint {
    TimelinePoint {
        age,
        wealth,
        year: Some(epoch_year.saturating_add(years_elapsed as i32)),
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn bucket_default(table: &[(&str, f64)], token: Option<&str>) -> Option<f64> {
    let token = normalize(token?);
    table
        .iter()
        .find(|(bucket, _)| *bucket == token)
        .map(|(_, value)| *value)
}
