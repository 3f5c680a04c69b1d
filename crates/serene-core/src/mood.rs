//! Mood classification, the per-day mood log and its aggregates.
//!
//! Two score scales meet here: sentiment scores in [-1, 1] from the chat
//! backend, and self-reported log scores on a 1-10 scale. Both classify into
//! the same [`MoodCategory`] vocabulary.

use crate::backend::{Credentials, MoodBackend};
use crate::{Result, SereneError};
use chrono::{Datelike, Days, NaiveDate, TimeDelta, Weekday};
use serene_types::{LogMood, MoodAnalysis, MoodCategory, MoodEntry, MoodLogRequest};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Lower bounds of the negative, neutral, positive and very positive bands.
/// Each band includes its lower bound; the top band is closed at 1.0.
const BAND_LOWER_BOUNDS: [f64; 4] = [-0.5, -0.1, 0.1, 0.5];

/// Log scores above this are rejected.
pub const MAX_LOG_SCORE: f64 = 10.0;

/// Map a sentiment score to a mood category.
///
/// Scores outside [-1, 1] are clamped and NaN classifies as neutral, so
/// every input maps to exactly one category.
pub fn classify(score: f64) -> MoodCategory {
    if score.is_nan() {
        return MoodCategory::Neutral;
    }
    let score = score.clamp(-1.0, 1.0);
    let band = BAND_LOWER_BOUNDS.iter().filter(|&&lower| score >= lower).count();
    MoodCategory::SCORED[band]
}

/// Project a 0-10 log score onto the sentiment scale (5 is neutral).
pub fn normalize_log_score(score: f64) -> f64 {
    ((score - 5.0) / 5.0).clamp(-1.0, 1.0)
}

/// Classify a 0-10 log score.
pub fn classify_log_score(score: f64) -> MoodCategory {
    classify(normalize_log_score(score))
}

/// Energy, sleep quality and stress, each on a 1-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellnessMetrics {
    energy: u8,
    sleep: u8,
    stress: u8,
}

impl Default for WellnessMetrics {
    fn default() -> Self {
        Self {
            energy: 5,
            sleep: 5,
            stress: 5,
        }
    }
}

impl WellnessMetrics {
    pub fn new(energy: i64, sleep: i64, stress: i64) -> Result<Self> {
        Ok(Self {
            energy: check_metric("energy_level", energy)?,
            sleep: check_metric("sleep_quality", sleep)?,
            stress: check_metric("stress_level", stress)?,
        })
    }

    pub fn energy(&self) -> u8 {
        self.energy
    }

    pub fn sleep(&self) -> u8 {
        self.sleep
    }

    pub fn stress(&self) -> u8 {
        self.stress
    }
}

fn check_metric(metric: &'static str, value: i64) -> Result<u8> {
    match u8::try_from(value) {
        Ok(v) if (1..=10).contains(&v) => Ok(v),
        _ => Err(SereneError::MetricOutOfRange { metric, value }),
    }
}

/// The authoritative mood record for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodSample {
    pub date: NaiveDate,
    pub category: MoodCategory,
    /// Log score, 0-10
    pub score: f64,
    /// The option the user picked, if known
    pub mood: Option<LogMood>,
    pub notes: Option<String>,
    pub metrics: WellnessMetrics,
}

impl MoodSample {
    pub fn new(
        date: NaiveDate,
        score: f64,
        mood: Option<LogMood>,
        notes: Option<String>,
        metrics: WellnessMetrics,
    ) -> Result<Self> {
        if !score.is_finite() || !(0.0..=MAX_LOG_SCORE).contains(&score) {
            return Err(SereneError::InvalidMoodScore(score));
        }
        Ok(Self {
            date,
            category: classify_log_score(score),
            score,
            mood,
            notes: notes.filter(|n| !n.trim().is_empty()),
            metrics,
        })
    }

    /// Build from a backend record.
    pub fn from_entry(entry: MoodEntry) -> Result<Self> {
        let metrics = WellnessMetrics::new(
            entry.energy_level.into(),
            entry.sleep_quality.into(),
            entry.stress_level.into(),
        )?;
        Self::new(entry.date, entry.score, entry.mood.parse().ok(), entry.notes, metrics)
    }

    /// Build from the user's pick on the log form.
    pub fn from_choice(
        date: NaiveDate,
        mood: LogMood,
        notes: Option<String>,
        metrics: WellnessMetrics,
    ) -> Self {
        let score = f64::from(mood.score());
        Self {
            date,
            category: classify_log_score(score),
            score,
            mood: Some(mood),
            notes: notes.filter(|n| !n.trim().is_empty()),
            metrics,
        }
    }

    /// Request body for `POST /mood/log`.
    pub fn to_request(&self) -> MoodLogRequest {
        MoodLogRequest {
            mood: self
                .mood
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| self.category.as_str().to_string()),
            score: self.score,
            notes: self.notes.clone(),
            energy_level: self.metrics.energy,
            sleep_quality: self.metrics.sleep,
            stress_level: self.metrics.stress,
            date: self.date,
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: NaiveDate,
    end: NaiveDate,
}

impl Window {
    /// Range between two dates, in either order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// The seven-day week containing `date`.
    pub fn week_of(date: NaiveDate, week_start: Weekday) -> Self {
        let offset = (7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
        let start = date - Days::new(u64::from(offset));
        Self {
            start,
            end: start + Days::new(6),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// The same window moved `weeks` weeks, backwards when negative.
    pub fn shift_weeks(&self, weeks: i64) -> Result<Self> {
        let shift = |date: NaiveDate| {
            TimeDelta::try_weeks(weeks).and_then(|delta| date.checked_add_signed(delta))
        };
        match (shift(self.start), shift(self.end)) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            _ => Err(SereneError::WindowOutOfRange { weeks }),
        }
    }
}

/// Summary of the samples in a window.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodAggregate {
    pub window: Window,
    /// Mean log score; `None` when the window holds no samples
    pub average: Option<f64>,
    pub sample_count: usize,
    /// Every day of the window with its category, if logged
    pub days: Vec<(NaiveDate, Option<MoodCategory>)>,
}

impl MoodAggregate {
    pub fn has_data(&self) -> bool {
        self.sample_count > 0
    }

    /// Category of the average score.
    pub fn average_category(&self) -> Option<MoodCategory> {
        self.average.map(classify_log_score)
    }
}

/// Average and per-day categories of the samples that fall in `window`.
pub fn aggregate<'a>(samples: impl IntoIterator<Item = &'a MoodSample>, window: Window) -> MoodAggregate {
    let by_day: BTreeMap<NaiveDate, &MoodSample> = samples
        .into_iter()
        .filter(|s| window.contains(s.date))
        .map(|s| (s.date, s))
        .collect();

    let sample_count = by_day.len();
    let average = (sample_count > 0)
        .then(|| by_day.values().map(|s| s.score).sum::<f64>() / sample_count as f64);
    let days = window
        .days()
        .map(|d| (d, by_day.get(&d).map(|s| s.category)))
        .collect();

    MoodAggregate {
        window,
        average,
        sample_count,
        days,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoodTrend {
    InsufficientData,
    Analysis {
        direction: TrendDirection,
        /// Recent average minus older average, on the category rank scale
        trend_value: f64,
        /// Mean absolute change between consecutive samples
        volatility: f64,
        current: MoodCategory,
        average_rank: f64,
        range: i8,
    },
}

/// How many trailing categories count as "recent".
const RECENT_WINDOW: usize = 3;
const TREND_THRESHOLD: f64 = 0.5;

/// Compare recent moods against older ones. Input is oldest first.
pub fn analyze_trend(history: &[MoodCategory]) -> MoodTrend {
    if history.len() < 2 {
        return MoodTrend::InsufficientData;
    }
    let ranks: Vec<f64> = history.iter().map(|c| f64::from(c.rank())).collect();
    let split = ranks.len().saturating_sub(RECENT_WINDOW);
    let (older, recent) = ranks.split_at(split);

    let recent_avg = recent.iter().sum::<f64>() / recent.len() as f64;
    let older_avg = older.iter().sum::<f64>() / older.len().max(1) as f64;
    let trend_value = recent_avg - older_avg;

    let direction = if trend_value > TREND_THRESHOLD {
        TrendDirection::Improving
    } else if trend_value < -TREND_THRESHOLD {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    let volatility = ranks.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f64>() / (ranks.len() - 1) as f64;
    let max = history.iter().map(|c| c.rank()).max().unwrap_or_default();
    let min = history.iter().map(|c| c.rank()).min().unwrap_or_default();

    MoodTrend::Analysis {
        direction,
        trend_value,
        volatility,
        current: history[history.len() - 1],
        average_rank: ranks.iter().sum::<f64>() / ranks.len() as f64,
        range: max - min,
    }
}

/// At most one sample per calendar day.
#[derive(Debug, Clone, Default)]
pub struct MoodLog {
    samples: BTreeMap<NaiveDate, MoodSample>,
}

impl MoodLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sample, replacing any existing one for the same date.
    pub fn upsert(&mut self, sample: MoodSample) -> Option<MoodSample> {
        let replaced = self.samples.insert(sample.date, sample);
        if let Some(old) = &replaced {
            debug!(target: "serene::mood", "Replaced mood sample for {}", old.date);
        }
        replaced
    }

    pub fn get(&self, date: NaiveDate) -> Option<&MoodSample> {
        self.samples.get(&date)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in date order.
    pub fn samples(&self) -> impl Iterator<Item = &MoodSample> {
        self.samples.values()
    }

    pub fn is_logged(&self, date: NaiveDate) -> bool {
        self.samples.contains_key(&date)
    }

    pub fn aggregate(&self, window: Window) -> MoodAggregate {
        aggregate(self.samples.range(window.start..=window.end).map(|(_, s)| s), window)
    }

    pub fn trend(&self) -> MoodTrend {
        let history: Vec<MoodCategory> = self.samples.values().map(|s| s.category).collect();
        analyze_trend(&history)
    }

    /// Merge backend records. Records that fail validation are skipped.
    pub fn merge_entries(&mut self, entries: Vec<MoodEntry>) -> usize {
        let mut merged = 0;
        for entry in entries {
            let date = entry.date;
            match MoodSample::from_entry(entry) {
                Ok(sample) => {
                    self.upsert(sample);
                    merged += 1;
                }
                Err(e) => warn!(target: "serene::mood", "Skipping mood entry for {}: {}", date, e),
            }
        }
        merged
    }
}

/// Mood tracker view state: the local log kept in sync with the backend.
pub struct MoodTracker {
    credentials: Credentials,
    log: MoodLog,
    week_start: Weekday,
}

impl MoodTracker {
    pub fn new(credentials: Credentials, week_start: Weekday) -> Self {
        Self {
            credentials,
            log: MoodLog::new(),
            week_start,
        }
    }

    pub fn log(&self) -> &MoodLog {
        &self.log
    }

    pub fn week_of(&self, date: NaiveDate) -> Window {
        Window::week_of(date, self.week_start)
    }

    pub fn today_logged(&self, today: NaiveDate) -> bool {
        self.log.is_logged(today)
    }

    /// Fetch the window from the backend and merge it into the local log.
    pub async fn refresh(&mut self, backend: &dyn MoodBackend, window: Window) -> Result<MoodAggregate> {
        let entries = backend
            .mood_entries(&self.credentials, window.start(), window.end())
            .await?;
        let merged = self.log.merge_entries(entries);
        debug!(target: "serene::mood", "Merged {} mood entries for {}..{}", merged, window.start(), window.end());
        Ok(self.log.aggregate(window))
    }

    /// Submit a sample; on acknowledgement it replaces any local sample for the day.
    pub async fn submit(&mut self, backend: &dyn MoodBackend, sample: MoodSample) -> Result<()> {
        let ack = backend.log_mood(&self.credentials, &sample.to_request()).await?;
        info!(target: "serene::mood", "Logged mood '{}' for {}", ack.mood, ack.date);
        self.log.upsert(sample);
        Ok(())
    }
}

/// Current mood shown in the chat header.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoodIndicator {
    category: MoodCategory,
    sentiment: Option<f64>,
}

impl MoodIndicator {
    pub fn category(&self) -> MoodCategory {
        self.category
    }

    pub fn sentiment(&self) -> Option<f64> {
        self.sentiment
    }

    /// Resolve a backend analysis to a category: the reported mood state if
    /// known, otherwise the classified compound score.
    pub fn resolve(analysis: &MoodAnalysis) -> Option<MoodCategory> {
        analysis.category().or_else(|| analysis.compound().map(classify))
    }

    /// Apply an analysis. Returns false and keeps the last state when the
    /// analysis carries nothing usable.
    pub fn update(&mut self, analysis: &MoodAnalysis) -> bool {
        match Self::resolve(analysis) {
            Some(category) => {
                self.category = category;
                self.sentiment = analysis.compound().map(|c| c.clamp(-1.0, 1.0));
                true
            }
            None => false,
        }
    }
}
