use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::core::{Profile, RetirementYearPhase, TimelineConfig};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliRetirementYearPhase {
    Working,
    Retired,
}

impl From<CliRetirementYearPhase> for RetirementYearPhase {
    fn from(value: CliRetirementYearPhase) -> Self {
        match value {
            CliRetirementYearPhase::Working => RetirementYearPhase::Working,
            CliRetirementYearPhase::Retired => RetirementYearPhase::Retired,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "compass",
    about = "Retirement scenario lookup over a precomputed scenario table"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the lookup API over HTTP.
    Serve(ServeArgs),
    /// Resolve one profile and print its scenario.
    Lookup(LookupArgs),
    /// Print dataset-wide aggregates.
    Summary(DataArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    #[arg(long, help = "Scenario table as a JSON array or JSON Lines (.jsonl) file")]
    pub data: PathBuf,
    #[arg(long, help = "Scan the table for every lookup instead of building an index")]
    pub no_index: bool,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Annual growth rate for synthesized timelines in percent"
    )]
    pub growth_rate: f64,
    #[arg(
        long,
        default_value_t = 4.0,
        help = "Annual withdrawal rate after retirement in percent"
    )]
    pub withdrawal_rate: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliRetirementYearPhase::Working,
        help = "Phase of the simulated year that ends at the retirement age"
    )]
    pub retirement_year_phase: CliRetirementYearPhase,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub data: DataArgs,
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    #[arg(
        long,
        default_value_t = 3600,
        help = "Seconds before the scenario table is reloaded; 0 disables expiry"
    )]
    pub cache_ttl_secs: u64,
}

#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    #[command(flatten)]
    pub data: DataArgs,
    #[arg(long)]
    pub age_bucket: String,
    #[arg(long)]
    pub current_savings_bucket: String,
    #[arg(long)]
    pub expected_expenses_bucket: String,
    #[arg(long)]
    pub gender: String,
    #[arg(long)]
    pub household_size: u32,
    #[arg(long)]
    pub housing_status: String,
    #[arg(long)]
    pub income_bucket: String,
    #[arg(long)]
    pub marital_status: String,
    #[arg(long)]
    pub monthly_savings_bucket: String,
    #[arg(long)]
    pub retirement_age_bucket: String,
    #[arg(long, help = "Print the lookup as JSON instead of text")]
    pub json: bool,
}

impl LookupArgs {
    pub fn profile(&self) -> Profile {
        Profile {
            age_bucket: self.age_bucket.clone(),
            current_savings_bucket: self.current_savings_bucket.clone(),
            expected_expenses_bucket: self.expected_expenses_bucket.clone(),
            gender: self.gender.clone(),
            household_size: self.household_size,
            housing_status: self.housing_status.clone(),
            income_bucket: self.income_bucket.clone(),
            marital_status: self.marital_status.clone(),
            monthly_savings_bucket: self.monthly_savings_bucket.clone(),
            retirement_age_bucket: self.retirement_age_bucket.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompassConfig {
    pub data_path: PathBuf,
    pub cache_ttl: Option<Duration>,
    pub use_index: bool,
    pub timeline: TimelineConfig,
}

pub fn build_config(args: &DataArgs, cache_ttl_secs: Option<u64>) -> Result<CompassConfig, String> {
    if args.data.as_os_str().is_empty() {
        return Err("--data must name a scenario file".to_string());
    }

    if !args.growth_rate.is_finite() || !(-100.0..=100.0).contains(&args.growth_rate) {
        return Err("--growth-rate must be between -100 and 100".to_string());
    }

    if !(0.0..=100.0).contains(&args.withdrawal_rate) {
        return Err("--withdrawal-rate must be between 0 and 100".to_string());
    }

    let timeline = TimelineConfig {
        annual_growth_rate: args.growth_rate / 100.0,
        withdrawal_rate: args.withdrawal_rate / 100.0,
        retirement_year_phase: args.retirement_year_phase.into(),
        ..TimelineConfig::default()
    };

    Ok(CompassConfig {
        data_path: args.data.clone(),
        cache_ttl: cache_ttl_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs),
        use_index: !args.no_index,
        timeline,
    })
}
