//! HTTP client for the Serene backend.

use crate::backend::{ChatBackend, Credentials, MoodBackend};
use crate::{Result, SereneError};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serene_types::{ChatRequest, ChatResponse, MoodEntry, MoodLogAck, MoodLogRequest};
use std::time::Duration;
use tracing::{debug, warn};

const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SereneError::Config(format!("http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, credentials: &Credentials) -> Result<T> {
        let response = request.bearer_auth(credentials.token()).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(target: "serene::api", "Backend rejected credentials");
            return Err(SereneError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(target: "serene::api", "Backend returned {}: {}", status, body);
            return Err(SereneError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| SereneError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn send_message(&self, credentials: &Credentials, request: &ChatRequest) -> Result<ChatResponse> {
        debug!(target: "serene::api", "POST /chat/message (session: {:?})", request.conversation_id);
        let builder = self.client.post(self.endpoint("/chat/message")).json(request);
        self.execute(builder, credentials).await
    }
}

#[async_trait]
impl MoodBackend for ApiClient {
    async fn mood_entries(
        &self,
        credentials: &Credentials,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MoodEntry>> {
        debug!(target: "serene::api", "GET /mood/entries {}..{}", start, end);
        let builder = self.client.get(self.endpoint("/mood/entries")).query(&[
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
        ]);
        self.execute(builder, credentials).await
    }

    async fn log_mood(&self, credentials: &Credentials, request: &MoodLogRequest) -> Result<MoodLogAck> {
        debug!(target: "serene::api", "POST /mood/log for {}", request.date);
        let builder = self.client.post(self.endpoint("/mood/log")).json(request);
        self.execute(builder, credentials).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response and hand back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let n = socket.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });
        (format!("http://{}", addr), handle)
    }

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_prefix() {
        let api = client("http://localhost:8000/");
        assert_eq!(api.endpoint("/chat/message"), "http://localhost:8000/api/v1/chat/message");
    }

    #[tokio::test]
    async fn test_send_message_decodes_reply() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"conversation_id":"abc","message":"Hi there","mood_analysis":null,"crisis_intervention":null}"#,
        )
        .await;

        let request = ChatRequest {
            message: "hello".into(),
            conversation_id: None,
        };
        let reply = client(&base)
            .send_message(&Credentials::bearer("tok"), &request)
            .await
            .unwrap();
        assert_eq!(reply.conversation_id.as_deref(), Some("abc"));
        assert_eq!(reply.message, "Hi there");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/v1/chat/message"));
        assert!(raw.to_lowercase().contains("authorization: bearer tok"));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let (base, _server) = serve_once("401 Unauthorized", r#"{"detail":"expired"}"#).await;
        let request = ChatRequest {
            message: "hello".into(),
            conversation_id: None,
        };
        let err = client(&base)
            .send_message(&Credentials::bearer("tok"), &request)
            .await
            .unwrap_err();
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn test_server_error_keeps_status() {
        let (base, _server) = serve_once("503 Service Unavailable", "down").await;
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let err = client(&base)
            .mood_entries(&Credentials::bearer("tok"), day, day)
            .await
            .unwrap_err();
        assert!(matches!(err, SereneError::Server { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_mood_entries_sends_window() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"id":"1","date":"2024-03-04","mood":"good","score":7,"notes":null}]"#,
        )
        .await;
        let start = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

        let entries = client(&base)
            .mood_entries(&Credentials::bearer("tok"), start, end)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, 7.0);

        let raw = server.await.unwrap();
        assert!(raw.contains("start_date=2024-03-03"));
        assert!(raw.contains("end_date=2024-03-09"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let (base, _server) = serve_once("200 OK", "not json").await;
        let request = ChatRequest {
            message: "hello".into(),
            conversation_id: None,
        };
        let err = client(&base)
            .send_message(&Credentials::bearer("tok"), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, SereneError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let request = ChatRequest {
            message: "hello".into(),
            conversation_id: None,
        };
        let err = client(&base)
            .send_message(&Credentials::bearer("tok"), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, SereneError::Transport(_)));
    }
}
