use clap::Parser;
use tracing_subscriber::EnvFilter;

use compass::CompassError;
use compass::api::{
    AppState, Cli, Command, CompassConfig, DataArgs, LookupResponse, build_config,
    build_lookup_response, run_http_server,
};
use compass::core::{
    JsonFileSource, Profile, Snapshot, TableSource, TableSummary, TimelineResolver,
    TimelineSource, format_yen,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve(args) => serve(&args.data, args.port, args.cache_ttl_secs).await,
        Command::Lookup(args) => {
            let profile = args.profile();
            lookup(&args.data, &profile, args.json)
        }
        Command::Summary(args) => summary(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn serve(args: &DataArgs, port: u16, cache_ttl_secs: u64) -> Result<(), CompassError> {
    let config = config_from(args, Some(cache_ttl_secs))?;
    let state = AppState::from_config(&config);
    if let Err(e) = state.snapshot().await {
        tracing::warn!(error = %e, "initial scenario load failed; will retry on first request");
    }
    run_http_server(state, port)
        .await
        .map_err(|e| CompassError::data_unavailable(format!("server error: {e}")))
}

fn lookup(args: &DataArgs, profile: &Profile, json: bool) -> Result<(), CompassError> {
    let config = config_from(args, None)?;
    let snapshot = load_snapshot(&config)?;
    let resolver = TimelineResolver::new(config.timeline);
    let response = build_lookup_response(&snapshot, &resolver, profile)?;

    if json {
        let text = serde_json::to_string_pretty(&response)
            .map_err(|e| CompassError::InvalidConfig(format!("failed to encode response: {e}")))?;
        println!("{text}");
    } else {
        print_lookup(&response);
    }
    Ok(())
}

fn summary(args: &DataArgs) -> Result<(), CompassError> {
    let config = config_from(args, None)?;
    let snapshot = load_snapshot(&config)?;
    let summary = TableSummary::from_table(snapshot.table());

    println!("Total scenarios: {}", summary.total_scenarios);
    for share in &summary.status_distribution {
        println!(
            "  {:<7} {:>8} ({:.1}%)",
            share.status.as_str(),
            share.count,
            share.percentage
        );
    }
    if let Some(pct) = summary.fire_achievable_percentage {
        println!("FIRE achievable: {pct:.1}%");
    }
    if let Some(age) = summary.average_retirement_age {
        println!("Average retirement age: {age:.1}");
    }
    for grade in &summary.top_fire_grades {
        println!("  grade {:<3} {:>8}", grade.grade, grade.count);
    }
    Ok(())
}

fn config_from(args: &DataArgs, cache_ttl_secs: Option<u64>) -> Result<CompassConfig, CompassError> {
    build_config(args, cache_ttl_secs).map_err(CompassError::InvalidConfig)
}

fn load_snapshot(config: &CompassConfig) -> Result<Snapshot, CompassError> {
    let records = JsonFileSource::new(config.data_path.clone()).load()?;
    Ok(Snapshot::build(records, config.use_index))
}

fn print_lookup(response: &LookupResponse<'_>) {
    let record = response.record;
    println!("Scenario {}", response.sort_key);
    println!(
        "  status: {}  FIRE grade: {}  traditional grade: {}",
        record.status().as_str(),
        record.fire_grade.as_deref().unwrap_or("-"),
        record.traditional_grade.as_deref().unwrap_or("-"),
    );
    if let Some(number) = record.fire_number {
        println!("  FIRE number: {}", format_yen(number));
    }
    if let Some(wealth) = record.projected_wealth {
        println!("  projected wealth: {}", format_yen(wealth));
    }

    println!("Insights:");
    for insight in &response.insights {
        println!("  - {insight}");
    }
    println!("Recommended actions:");
    for action in &response.recommendations {
        println!("  - {action}");
    }

    let source = match response.timeline.source {
        TimelineSource::Stored => "stored",
        TimelineSource::Synthesized => "synthesized",
        TimelineSource::Unavailable => "unavailable",
    };
    println!("Wealth timeline ({source}):");
    for point in &response.timeline.points {
        let year = point.year.map(|y| y.to_string()).unwrap_or_default();
        println!("  {:>5.1} {:>6} {}", point.age, year, format_yen(point.wealth));
    }
}
