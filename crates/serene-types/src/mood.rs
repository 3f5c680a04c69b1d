//! Mood vocabulary shared between the chat view and the mood tracker.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic mood category, ordered from worst to best.
///
/// `Crisis` only ever comes from the backend's analysis; score
/// classification never produces it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MoodCategory {
    Crisis,
    VeryNegative,
    Negative,
    #[default]
    Neutral,
    Positive,
    VeryPositive,
}

impl MoodCategory {
    /// Categories that score classification can produce, in rank order.
    pub const SCORED: [MoodCategory; 5] = [
        MoodCategory::VeryNegative,
        MoodCategory::Negative,
        MoodCategory::Neutral,
        MoodCategory::Positive,
        MoodCategory::VeryPositive,
    ];

    /// Numeric rank used for trend analysis (crisis = -3 .. very_positive = 2).
    pub fn rank(self) -> i8 {
        match self {
            MoodCategory::Crisis => -3,
            MoodCategory::VeryNegative => -2,
            MoodCategory::Negative => -1,
            MoodCategory::Neutral => 0,
            MoodCategory::Positive => 1,
            MoodCategory::VeryPositive => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MoodCategory::Crisis => "crisis",
            MoodCategory::VeryNegative => "very_negative",
            MoodCategory::Negative => "negative",
            MoodCategory::Neutral => "neutral",
            MoodCategory::Positive => "positive",
            MoodCategory::VeryPositive => "very_positive",
        }
    }

    /// Human readable label for indicators.
    pub fn label(self) -> &'static str {
        match self {
            MoodCategory::Crisis => "Crisis",
            MoodCategory::VeryNegative => "Very Negative",
            MoodCategory::Negative => "Negative",
            MoodCategory::Neutral => "Neutral",
            MoodCategory::Positive => "Positive",
            MoodCategory::VeryPositive => "Very Positive",
        }
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "crisis" => Ok(MoodCategory::Crisis),
            "very_negative" => Ok(MoodCategory::VeryNegative),
            "negative" => Ok(MoodCategory::Negative),
            "neutral" => Ok(MoodCategory::Neutral),
            "positive" => Ok(MoodCategory::Positive),
            "very_positive" => Ok(MoodCategory::VeryPositive),
            _ => Err(format!("Unknown mood category: '{}'", s)),
        }
    }
}

/// Self-reported mood option offered by the mood log form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMood {
    Excellent,
    Great,
    Good,
    Okay,
    Poor,
    Terrible,
}

impl LogMood {
    pub const ALL: [LogMood; 6] = [
        LogMood::Excellent,
        LogMood::Great,
        LogMood::Good,
        LogMood::Okay,
        LogMood::Poor,
        LogMood::Terrible,
    ];

    /// Score on the 1-10 log scale submitted with the entry.
    pub fn score(self) -> u8 {
        match self {
            LogMood::Excellent => 10,
            LogMood::Great => 8,
            LogMood::Good => 7,
            LogMood::Okay => 5,
            LogMood::Poor => 3,
            LogMood::Terrible => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogMood::Excellent => "excellent",
            LogMood::Great => "great",
            LogMood::Good => "good",
            LogMood::Okay => "okay",
            LogMood::Poor => "poor",
            LogMood::Terrible => "terrible",
        }
    }
}

impl FromStr for LogMood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogMood::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Invalid mood: '{}'. Use excellent, great, good, okay, poor or terrible.",
                    s
                )
            })
    }
}
