//! Common test utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serene_core::{ChatBackend, Credentials, Result, SereneError};
use serene_types::{ChatRequest, ChatResponse};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Load a backend chat reply from the fixtures directory.
pub fn load_chat_fixture(name: &str) -> ChatResponse {
    let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("chat")
        .join(format!("{}.json", name));

    let content = std::fs::read_to_string(&fixture_path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", fixture_path.display(), e));

    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", fixture_path.display(), e))
}

/// In-memory chat backend answering from a queue and recording requests.
#[derive(Default)]
pub struct FakeChatBackend {
    replies: Mutex<VecDeque<Result<ChatResponse>>>,
    requests: Mutex<Vec<(String, ChatRequest)>>,
}

impl FakeChatBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_reply(&self, reply: ChatResponse) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    pub fn push_error(&self, error: SereneError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Requests seen so far as (bearer token, request).
    pub fn requests(&self) -> Vec<(String, ChatRequest)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for FakeChatBackend {
    async fn send_message(&self, credentials: &Credentials, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((credentials.token().to_string(), request.clone()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SereneError::Transport("connection refused".into())))
    }
}
