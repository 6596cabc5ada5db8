use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use fieldops::models::{time_format, IrrigationType};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fieldops",
    version,
    about = "Farm field irrigation planning from weather and soil moisture"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Validate config and test connections
    Check,
    #[command(flatten)]
    Field(FieldCommand),
}

/// Commands that work against field storage
#[derive(Subcommand)]
pub enum FieldCommand {
    /// Irrigation advice for a field on a date
    Recommend {
        /// Field id (defaults to farm.default_field_id)
        #[arg(short, long)]
        field: Option<i64>,
        /// Target date, YYYY-MM-DD (defaults to today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Use this soil moisture percentage instead of sampling
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
        moisture: Option<u8>,
    },
    /// Schedule an irrigation event from the current advice
    Schedule {
        #[arg(short, long)]
        field: Option<i64>,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Start time, HH:MM (defaults to the recommended time)
        #[arg(short, long, value_parser = parse_time)]
        time: Option<NaiveTime>,
        /// Minutes
        #[arg(long)]
        duration: Option<u32>,
        /// Gallons
        #[arg(short, long)]
        water: Option<u32>,
        #[arg(long = "type", value_enum, default_value_t = TypeArg::Automatic)]
        irrigation_type: TypeArg,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List irrigation events
    Events {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        field: Option<i64>,
    },
    /// Cancel a scheduled irrigation event
    Cancel { id: i64 },
    /// List fields
    Fields,
    /// Show the daily forecast
    Forecast {
        #[arg(long, default_value_t = 7)]
        days: usize,
    },
    /// Sample current soil moisture for a field
    Moisture {
        #[arg(short, long)]
        field: Option<i64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TypeArg {
    Automatic,
    Manual,
}

impl From<TypeArg> for IrrigationType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Automatic => IrrigationType::Automatic,
            TypeArg::Manual => IrrigationType::Manual,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    time_format::parse(s).ok_or_else(|| format!("expected HH:MM, got '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_schedule_flags() {
        let cli = Cli::parse_from([
            "fieldops",
            "--json",
            "schedule",
            "--field",
            "4",
            "--date",
            "2024-06-14",
            "--time",
            "19:15",
            "--type",
            "manual",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Field(FieldCommand::Schedule {
                field,
                date,
                time,
                irrigation_type,
                duration,
                ..
            }) => {
                assert_eq!(field, Some(4));
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 14));
                assert_eq!(time, NaiveTime::from_hms_opt(19, 15, 0));
                assert_eq!(IrrigationType::from(irrigation_type), IrrigationType::Manual);
                assert_eq!(duration, None);
            }
            _ => panic!("expected schedule"),
        }
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Cli::try_parse_from(["fieldops", "recommend", "--date", "06/14/2024"]).is_err());
        assert!(Cli::try_parse_from(["fieldops", "recommend", "--moisture", "140"]).is_err());
        assert!(Cli::try_parse_from(["fieldops", "schedule", "--time", "7pm"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["fieldops", "forecast", "-vv", "--days", "3"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Field(FieldCommand::Forecast { days: 3 })
        ));
    }

    #[test]
    fn setup_commands_parse() {
        assert!(matches!(
            Cli::parse_from(["fieldops", "init"]).command,
            Commands::Init
        ));
        assert!(matches!(
            Cli::parse_from(["fieldops", "check", "--json"]).command,
            Commands::Check
        ));
    }
}
