//! Serene - terminal client for the Serene mental health companion.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serene_cli::commands::{breathe, chat, mood};
use serene_cli::config::Config;
use serene_cli::logging::{self, LogConfig, LogFormat};
use serene_types::LogMood;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "serene")]
#[command(about = "Chat, breathe and track your mood with Serene")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the backend URL from config
    #[arg(long, env = "SERENE_API_URL")]
    api_url: Option<String>,

    /// Access token (otherwise read from the configured token file)
    #[arg(long, env = "SERENE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Enable verbose logging (INFO for serene targets)
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace logging
    #[arg(long)]
    trace: bool,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,

    /// Set log level for specific targets (e.g., "chat=debug" or "timer=trace").
    /// Can be specified multiple times. Targets are prefixed with "serene::" automatically.
    #[arg(long = "log", value_name = "TARGET=LEVEL")]
    log_overrides: Vec<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Talk with the Serene assistant
    Chat,
    /// Run a guided breathing exercise
    Breathe {
        /// Exercise id from `serene exercises`
        #[arg(short, long, default_value = "4-7-8-breathing")]
        exercise: String,
        /// Custom phases, e.g. "inhale:4,hold:7,exhale:8"
        #[arg(long, value_name = "NAME:SECS,...")]
        phases: Option<String>,
        /// Stop after this many minutes
        #[arg(short, long)]
        minutes: Option<u64>,
    },
    /// 5-4-3-2-1 grounding, one step at a time
    Ground,
    /// List available exercises
    Exercises,
    /// Log or review your mood
    Mood {
        #[command(subcommand)]
        action: MoodCommand,
    },
}

#[derive(Subcommand, Debug)]
enum MoodCommand {
    /// Record how you feel today
    Log {
        /// excellent, great, good, okay, poor or terrible
        #[arg(short, long)]
        mood: LogMood,
        /// Day to log (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        notes: Option<String>,
        /// Energy level, 1-10
        #[arg(long, default_value_t = 5)]
        energy: i64,
        /// Sleep quality, 1-10
        #[arg(long, default_value_t = 5)]
        sleep: i64,
        /// Stress level, 1-10
        #[arg(long, default_value_t = 5)]
        stress: i64,
    },
    /// Show a week of moods and the recent trend
    Week {
        /// Weeks relative to this one (-1 is last week)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_cli(
        cli.verbose,
        cli.debug,
        cli.trace,
        cli.quiet,
        cli.log_overrides,
        cli.log_format,
    );
    logging::init(&log_config);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    tracing::debug!(target: "serene::startup", "Loaded configuration (api: {})", config.api_url);

    match cli.command {
        Command::Chat => chat::run(&config, config.credentials(cli.token)?).await,
        Command::Breathe {
            exercise,
            phases,
            minutes,
        } => {
            breathe::run(breathe::BreatheArgs {
                exercise,
                phases,
                minutes,
            })
            .await
        }
        Command::Ground => breathe::ground().await,
        Command::Exercises => {
            breathe::list();
            Ok(())
        }
        Command::Mood { action } => {
            let credentials = config.credentials(cli.token)?;
            match action {
                MoodCommand::Log {
                    mood: choice,
                    date,
                    notes,
                    energy,
                    sleep,
                    stress,
                } => {
                    let args = mood::LogArgs {
                        mood: choice,
                        date,
                        notes,
                        energy,
                        sleep,
                        stress,
                    };
                    mood::log(&config, credentials, args).await
                }
                MoodCommand::Week { offset } => mood::week(&config, credentials, offset).await,
            }
        }
    }
}
