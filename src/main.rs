mod cli;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use cli::{Cli, Commands, FieldCommand};
use fieldops::config::Config;
use fieldops::logic::scheduler::condition_label;
use fieldops::logic::ScheduleRequest;
use fieldops::models::time_format;
use fieldops::App;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Init => run_init(),
        Commands::Check => run_check(cli.config, cli.data_dir.as_ref(), cli.json).await,
        Commands::Field(command) => {
            let config = Config::load_or_default(cli.config).context("Configuration error")?;
            let app = App::from_config(config, cli.data_dir.as_ref())
                .context("Failed to open field storage")?;
            run_command(&app, command, cli.json).await
        }
    }
}

async fn run_command(app: &App, command: FieldCommand, json: bool) -> anyhow::Result<()> {
    let today = Local::now().date_naive();

    match command {
        FieldCommand::Recommend {
            field,
            date,
            moisture,
        } => {
            let field_id = app.resolve_field_id(field)?;
            let date = date.unwrap_or(today);
            let rec = app.recommend(field_id, date, moisture).await;

            if json {
                return print_json(&rec);
            }
            println!("Field {} on {}", field_id, date);
            println!("  {} {}", rec.priority.symbol(), rec.summary());
            println!("  Reason:        {}", rec.reason);
            println!("  Soil moisture: {}%", rec.soil_moisture);
            println!("  Priority:      {}", rec.priority);
        }
        FieldCommand::Schedule {
            field,
            date,
            time,
            duration,
            water,
            irrigation_type,
            notes,
        } => {
            let request = ScheduleRequest {
                time,
                duration,
                water_amount: water,
                irrigation_type: irrigation_type.into(),
                notes,
                ..ScheduleRequest::new(app.resolve_field_id(field)?, date.unwrap_or(today))
            };
            let scheduled = app.schedule(request).await?;

            if json {
                return print_json(&scheduled);
            }
            let event = &scheduled.event;
            println!(
                "Scheduled event {} for {} on {} at {}",
                event.id.unwrap_or_default(),
                event.field_name,
                event.date,
                time_format::format(&event.time)
            );
            println!(
                "  {} min, {} gal ({})",
                event.duration,
                event.water_amount,
                event.irrigation_type.as_str()
            );
            if !scheduled.recommendation.recommended {
                println!("  Note: advice was to skip ({})", scheduled.recommendation.reason);
            }
        }
        FieldCommand::Events { date, field } => {
            let events = app.events(date, field)?;

            if json {
                return print_json(&events);
            }
            if events.is_empty() {
                println!("No irrigation events");
            }
            for event in &events {
                println!(
                    "#{:<4} {} {}  {:<14} {:>3} min {:>4} gal  {:<9} {:<9} {}",
                    event.id.unwrap_or_default(),
                    event.date,
                    time_format::format(&event.time),
                    event.field_name,
                    event.duration,
                    event.water_amount,
                    event.irrigation_type.as_str(),
                    event.status.as_str(),
                    condition_label(event.weather_condition)
                );
            }
        }
        FieldCommand::Cancel { id } => {
            let event = app.cancel(id)?;

            if json {
                return print_json(&event);
            }
            println!(
                "Cancelled event {} ({} on {})",
                id, event.field_name, event.date
            );
        }
        FieldCommand::Fields => {
            let fields = app.fields()?;

            if json {
                return print_json(&fields);
            }
            for field in &fields {
                let harvest = field
                    .days_to_harvest(today)
                    .map(|d| format!("{} days to harvest", d))
                    .unwrap_or_else(|| "-".into());
                println!(
                    "#{:<3} {:<14} {:<10} {:>6.1} ac  {:<9} {}",
                    field.id.unwrap_or_default(),
                    field.name,
                    field.crop_type,
                    field.acres,
                    field.status.as_str(),
                    harvest
                );
            }
        }
        FieldCommand::Forecast { days } => {
            let forecast = app.forecast(days).await?;

            if json {
                return print_json(&forecast);
            }
            for day in &forecast {
                println!(
                    "{}  {:>5.1}°F  {:>4.2} in  {:>3.0}% hum  {:>4.1} mph  {}",
                    day.date,
                    day.temperature,
                    day.precipitation,
                    day.humidity,
                    day.wind_speed,
                    day.conditions
                );
            }
        }
        FieldCommand::Moisture { field } => {
            let reading = app.soil_moisture(app.resolve_field_id(field)?);

            if json {
                return print_json(&reading);
            }
            println!(
                "Field {}: {}% ({})",
                reading.field_id,
                reading.moisture,
                reading.status.as_str()
            );
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_init() -> anyhow::Result<()> {
    Config::setup_interactive().context("Setup failed")?;
    println!("Run `fieldops check` to verify connections.");
    Ok(())
}

async fn run_check(
    config_path: Option<PathBuf>,
    data_dir: Option<&PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("Configuration error")?;
    let farm_name = config.farm.name.clone();

    let app = App::from_config(config, data_dir).context("Failed to open field storage")?;
    let status = app.check_connections().await;

    if json {
        print_json(&status)?;
    } else {
        println!("Config OK: {}", farm_name);
        println!("Storage: {}", if status.storage { "OK" } else { "OFFLINE" });
        println!(
            "Weather ({}): {}",
            status.weather_provider,
            if status.weather { "OK" } else { "OFFLINE" }
        );
    }

    if !status.all_connected() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
