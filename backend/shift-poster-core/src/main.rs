// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shift_poster_core::config::parse_clock_json;
use shift_poster_core::{
    plan_shifts, ApiConfig, CleanOutcome, ClockSegment, DateSource, FactorialClient,
    PopulateOutcome, Session, ShiftPoster, ShiftPosterConfig, SystemDateSource,
};

/// Fill or clear one employee's monthly attendance shifts in Factorial.
///
/// The Factorial session cookie is read from FACTORIAL_SESSION_COOKIE (or a
/// .env file); FACTORIAL_BASE_URL and FACTORIAL_TIMEOUT_SECS are optional.
#[derive(Parser, Debug)]
#[command(name = "shift-poster", version, about, long_about)]
struct Cli {
    /// Year, e.g. 2019 [default: current year]
    #[arg(long)]
    year: Option<i32>,

    /// Month 1-12, e.g. 11 for November [default: current month]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// Factorial employee ID, e.g. 123456
    #[arg(long, env = "FACTORIAL_EMPLOYEE_ID")]
    employee_id: u64,

    /// Clock segment as IN-OUT; repeat for several [default: 9:00-13:00 and 14:00-18:00]
    #[arg(long = "segment", value_name = "IN-OUT")]
    segments: Vec<ClockSegment>,

    /// Clock segments as a JSON array of {"clock_in", "clock_out"} records
    #[arg(long, value_name = "JSON", conflicts_with = "segments")]
    clock_json: Option<String>,

    /// Days of month to skip, e.g. --holiday 4,5
    #[arg(long = "holiday", value_name = "DAY", value_delimiter = ',')]
    holidays: Vec<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Post your shifts
    Populate,
    /// Clean your shifts
    Clean,
    /// Print the shifts that would be posted, without contacting Factorial
    Plan,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let dates = Arc::new(SystemDateSource);

    let clock = match (&cli.clock_json, cli.segments.is_empty()) {
        (Some(raw), _) => Some(parse_clock_json(raw).context("Failed to read --clock-json")?),
        (None, false) => Some(cli.segments.clone()),
        (None, true) => None,
    };
    let config = ShiftPosterConfig::resolve(
        cli.year,
        cli.month,
        cli.employee_id,
        clock,
        cli.holidays.iter().copied(),
        dates.utc_year(),
        dates.today(),
    )
    .context("Invalid shift configuration")?;

    if cli.command == Command::Plan {
        let plan = plan_shifts(&config, dates.today());
        for planned in &plan {
            println!(
                "{}-{:02}-{:02} {}",
                config.year, config.month, planned.day, planned.segment
            );
        }
        println!("{} shifts", plan.len());
        return Ok(());
    }

    let api_config = ApiConfig::from_env()
        .context("Failed to load FACTORIAL_* configuration from the environment")?;
    let session = Session::from_cookie(&api_config.session_cookie)?;
    let client = FactorialClient::from_config(&api_config)
        .context("Failed to create Factorial client")?;
    info!("Using Factorial API at {}", api_config.base_url);

    let mut poster = ShiftPoster::new(config, Arc::new(client), dates)?;
    poster
        .build(&session)
        .await
        .context("Failed to resolve attendance period")?;

    match cli.command {
        Command::Populate => match poster.populate(&session).await? {
            PopulateOutcome::Posted { requests, days } => {
                info!("Posted {} shifts over {} days", requests, days.len())
            }
            PopulateOutcome::Skipped(status) => warn!("Nothing posted: {}", status),
        },
        Command::Clean => match poster.clean(&session).await? {
            CleanOutcome::Deleted { shifts } => info!("Deleted {} shifts", shifts),
            CleanOutcome::Skipped(status) => warn!("Nothing cleaned: {}", status),
        },
        Command::Plan => {}
    }

    Ok(())
}
