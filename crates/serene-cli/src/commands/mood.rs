//! Mood logging and weekly overview.

use crate::config::Config;
use crate::render;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serene_core::{ApiClient, Credentials, MoodSample, MoodTracker, WellnessMetrics, Window};
use serene_types::LogMood;

pub struct LogArgs {
    pub mood: LogMood,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub energy: i64,
    pub sleep: i64,
    pub stress: i64,
}

pub fn sample(args: LogArgs, today: NaiveDate) -> Result<MoodSample> {
    let metrics = WellnessMetrics::new(args.energy, args.sleep, args.stress)?;
    Ok(MoodSample::from_choice(
        args.date.unwrap_or(today),
        args.mood,
        args.notes,
        metrics,
    ))
}

fn tracker(config: &Config, credentials: Credentials) -> Result<(ApiClient, MoodTracker)> {
    let api = ApiClient::new(&config.api_url, config.request_timeout())?;
    Ok((api, MoodTracker::new(credentials, config.week_start()?)))
}

pub async fn log(config: &Config, credentials: Credentials, args: LogArgs) -> Result<()> {
    let (api, mut tracker) = tracker(config, credentials)?;
    let sample = sample(args, Local::now().date_naive())?;
    let (date, mood) = (sample.date, sample.category);

    tracker.submit(&api, sample).await?;
    println!("Logged {} for {}.", mood.label(), date.format("%A, %B %-d"));
    Ok(())
}

/// The week `offset` weeks from the one containing `today`.
pub fn week_window(tracker: &MoodTracker, today: NaiveDate, offset: i64) -> Result<Window> {
    tracker
        .week_of(today)
        .shift_weeks(offset)
        .with_context(|| format!("--offset {} is out of range", offset))
}

/// Show the week `offset` weeks from the current one.
pub async fn week(config: &Config, credentials: Credentials, offset: i64) -> Result<()> {
    let (api, mut tracker) = tracker(config, credentials)?;
    let today = Local::now().date_naive();
    let window = week_window(&tracker, today, offset)?;

    let summary = tracker.refresh(&api, window).await?;
    println!("{}", render::week(&summary));
    println!("{}", render::trend(&tracker.log().trend()));
    if offset == 0 && !tracker.today_logged(today) {
        println!("\nYou haven't logged today yet: serene mood log --mood <how you feel>");
    }
    Ok(())
}
