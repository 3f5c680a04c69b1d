//! Backend collaborator interfaces.
//!
//! The session manager and mood tracker talk to the backend only through
//! these traits. [`crate::ApiClient`] implements them over HTTP; tests use
//! in-memory fakes.

use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serene_types::{ChatRequest, ChatResponse, MoodEntry, MoodLogAck, MoodLogRequest};
use std::fmt;

/// Bearer credentials passed explicitly to every backend call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into().trim().to_string(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `POST /chat/message`
    async fn send_message(&self, credentials: &Credentials, request: &ChatRequest) -> Result<ChatResponse>;
}

#[async_trait]
pub trait MoodBackend: Send + Sync {
    /// `GET /mood/entries?start_date&end_date`
    async fn mood_entries(
        &self,
        credentials: &Credentials,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MoodEntry>>;

    /// `POST /mood/log`
    async fn log_mood(&self, credentials: &Credentials, request: &MoodLogRequest) -> Result<MoodLogAck>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials::bearer(" secret-token \n");
        assert_eq!(creds.token(), "secret-token");
        assert!(!format!("{:?}", creds).contains("secret"));
        assert!(Credentials::bearer("  ").is_empty());
    }
}
