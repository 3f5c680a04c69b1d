//! Wire types for the backend HTTP API.

use crate::{CrisisLevel, CrisisResource, CrisisSignal, MoodCategory};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body of `POST /chat/message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// `null` for the first message of a session
    pub conversation_id: Option<String>,
}

/// Response of `POST /chat/message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_analysis: Option<MoodAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis_intervention: Option<CrisisIntervention>,
}

/// Mood analysis the backend ran on the user's message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodAnalysis {
    #[serde(default)]
    pub mood_state: Option<String>,
    #[serde(default)]
    pub sentiment_scores: Option<SentimentScores>,
}

impl MoodAnalysis {
    /// The reported mood state, if it is part of the known vocabulary.
    pub fn category(&self) -> Option<MoodCategory> {
        self.mood_state.as_deref().and_then(|s| s.parse().ok())
    }

    /// Compound sentiment score, if reported and finite.
    pub fn compound(&self) -> Option<f64> {
        self.sentiment_scores
            .as_ref()
            .and_then(|s| s.compound)
            .filter(|c| c.is_finite())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    #[serde(default)]
    pub compound: Option<f64>,
    #[serde(default)]
    pub pos: Option<f64>,
    #[serde(default)]
    pub neu: Option<f64>,
    #[serde(default)]
    pub neg: Option<f64>,
}

/// Crisis payload as sent by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisIntervention {
    pub level: String,
    #[serde(default)]
    pub resources: Vec<CrisisResource>,
    #[serde(default)]
    pub de_escalation_message: String,
    #[serde(default)]
    pub immediate_actions: Vec<String>,
}

impl CrisisIntervention {
    /// Convert into a client signal. A level label outside the known tiers is
    /// treated as `High` so that an intervention is never downgraded.
    pub fn into_signal(self) -> CrisisSignal {
        CrisisSignal {
            level: CrisisLevel::from_label(&self.level).unwrap_or(CrisisLevel::High),
            resources: self.resources,
            message: self.de_escalation_message,
            immediate_actions: self.immediate_actions,
        }
    }
}

fn default_metric() -> u8 {
    5
}

/// Body of `POST /mood/log`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodLogRequest {
    pub mood: String,
    pub score: f64,
    #[serde(default)]
    pub notes: Option<String>,
    pub energy_level: u8,
    pub sleep_quality: u8,
    pub stress_level: u8,
    pub date: NaiveDate,
}

/// Acknowledgement of `POST /mood/log`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodLogAck {
    #[serde(default)]
    pub message: String,
    pub mood: String,
    pub score: f64,
    pub date: NaiveDate,
}

/// One record of `GET /mood/entries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub date: NaiveDate,
    pub mood: String,
    pub score: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_metric")]
    pub energy_level: u8,
    #[serde(default = "default_metric")]
    pub sleep_quality: u8,
    #[serde(default = "default_metric")]
    pub stress_level: u8,
}
