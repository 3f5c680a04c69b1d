//! Chat message types for a support conversation.
//!
//! Messages are immutable once appended to a session log. Ids are UUIDv7
//! strings, so sorting by id gives creation order.

use crate::MoodCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Greeting shown as the first assistant message of every new session.
pub const GREETING: &str = "## Hello! I'm here to support you

How are you feeling today?

> **Remember**: This is a safe space where you can share whatever is on your mind.

**Some ways I can help you:**
- Process difficult emotions
- Explore coping strategies
- Practice mindfulness techniques
- Connect you with resources

*What would you like to talk about today?*";

/// Role of the message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The person using the product
    User,
    /// The support assistant (server reply or locally generated notice)
    Assistant,
}

/// A single entry in a conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Locally generated identifier
    pub id: String,
    /// Who wrote this message
    pub role: ChatRole,
    /// Message text (assistant content may contain markdown)
    pub content: String,
    /// When the message was appended locally
    pub created_at: DateTime<Utc>,
    /// Mood detected for the exchange, when the server reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<MoodCategory>,
    /// Compound sentiment score in [-1, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f64>,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            role: ChatRole::User,
            content: content.into(),
            created_at: Utc::now(),
            mood: None,
            sentiment: None,
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            role: ChatRole::Assistant,
            content: content.into(),
            created_at: Utc::now(),
            mood: None,
            sentiment: None,
        }
    }

    /// The seeded greeting for a fresh session.
    pub fn greeting() -> Self {
        Self::assistant(GREETING)
    }

    /// Attach mood analysis results. Sentiment is clamped to [-1, 1].
    pub fn with_mood(mut self, mood: Option<MoodCategory>, sentiment: Option<f64>) -> Self {
        self.mood = mood;
        self.sentiment = sentiment
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(-1.0, 1.0));
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == ChatRole::User
    }
}
