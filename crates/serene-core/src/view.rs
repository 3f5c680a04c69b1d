//! Chat view orchestration.

use crate::backend::{ChatBackend, Credentials};
use crate::conversation::{ConversationSession, SendOutcome, SendTicket};
use crate::crisis::CrisisController;
use crate::mood::MoodIndicator;
use crate::{Result, SereneError};
use serene_types::{ChatResponse, CrisisSignal, Message};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Abandons the guarded send on drop unless disarmed.
struct PendingSend<'a> {
    session: &'a mut ConversationSession,
    key: Option<(Uuid, u64)>,
}

impl PendingSend<'_> {
    fn disarm(mut self) {
        self.key = None;
    }
}

impl Drop for PendingSend<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.session.abandon(key);
        }
    }
}

/// One open chat screen: its conversation, mood indicator and crisis alert.
///
/// Each response is applied in a single `&mut` step, so a host never sees the
/// indicator updated without the reply or the reply without its alert. Once
/// [`ChatView::close`] is called, completions for earlier sends are dropped.
pub struct ChatView {
    backend: Arc<dyn ChatBackend>,
    credentials: Credentials,
    session: ConversationSession,
    mood: MoodIndicator,
    crisis: CrisisController,
    closed: bool,
}

impl ChatView {
    pub fn new(backend: Arc<dyn ChatBackend>, credentials: Credentials) -> Self {
        Self {
            backend,
            credentials,
            session: ConversationSession::new(),
            mood: MoodIndicator::default(),
            crisis: CrisisController::new(),
            closed: false,
        }
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn messages(&self) -> &[Message] {
        self.session.messages()
    }

    pub fn mood(&self) -> &MoodIndicator {
        &self.mood
    }

    pub fn crisis(&self) -> &CrisisController {
        &self.crisis
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn begin_send(&mut self, text: &str) -> Result<SendTicket> {
        if self.closed {
            return Err(SereneError::ViewClosed);
        }
        self.session.begin_send(text)
    }

    /// Apply a send result: mood, reply and crisis alert together.
    ///
    /// A crisis signal never replaces the reply; both are shown.
    pub fn complete_send(&mut self, ticket: SendTicket, result: Result<ChatResponse>) -> Result<SendOutcome> {
        if self.closed {
            debug!(target: "serene::chat", "View closed, dropping response");
            return Ok(SendOutcome::Stale);
        }

        let outcome = self.session.complete_send(ticket, result)?;
        if let SendOutcome::Delivered(delivery) = &outcome {
            if let Some(analysis) = &delivery.mood {
                if !self.mood.update(analysis) {
                    debug!(target: "serene::mood", "Unusable mood analysis, keeping {}", self.mood.category());
                }
            }
            if let Some(signal) = &delivery.crisis {
                self.crisis.activate(signal.clone());
            }
        }
        Ok(outcome)
    }

    /// Give up on a send started with [`ChatView::begin_send`].
    pub fn abandon_send(&mut self, ticket: SendTicket) -> bool {
        !self.closed && self.session.abandon_send(ticket)
    }

    /// Send `text` through the backend and apply the result.
    ///
    /// Dropping the returned future before it resolves abandons the send: the
    /// view goes back to idle with the safety notice appended.
    pub async fn send_user_message(&mut self, text: &str) -> Result<SendOutcome> {
        let ticket = self.begin_send(text)?;
        let backend = Arc::clone(&self.backend);
        let pending = PendingSend {
            session: &mut self.session,
            key: Some(ticket.key()),
        };
        let result = backend.send_message(&self.credentials, ticket.request()).await;
        pending.disarm();
        self.complete_send(ticket, result)
    }

    pub fn dismiss_crisis(&mut self) -> Option<CrisisSignal> {
        self.crisis.dismiss()
    }

    /// Start over with a fresh conversation in the same view.
    pub fn new_conversation(&mut self) {
        self.session.restart();
        self.mood = MoodIndicator::default();
        self.crisis.dismiss();
    }

    /// Tear the view down. Outstanding sends complete as stale.
    pub fn close(&mut self) {
        if !self.closed {
            info!(target: "serene::chat", "Closing chat view (session: {:?})", self.session.id());
            self.closed = true;
            self.crisis.dismiss();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::fallback_notice;
    use async_trait::async_trait;
    use serene_types::{CrisisIntervention, MoodAnalysis, MoodCategory, SentimentScores};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replies from a queue, recording every request.
    #[derive(Default)]
    struct ScriptedBackend {
        replies: Mutex<Vec<Result<ChatResponse>>>,
        seen: Mutex<Vec<serene_types::ChatRequest>>,
    }

    impl ScriptedBackend {
        fn with(replies: Vec<Result<ChatResponse>>) -> Arc<Self> {
            let mut replies = replies;
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                seen: Mutex::default(),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn send_message(
            &self,
            _credentials: &Credentials,
            request: &serene_types::ChatRequest,
        ) -> Result<ChatResponse> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(SereneError::Transport("no scripted reply".into())))
        }
    }

    /// Never answers.
    struct SilentBackend;

    #[async_trait]
    impl ChatBackend for SilentBackend {
        async fn send_message(
            &self,
            _credentials: &Credentials,
            _request: &serene_types::ChatRequest,
        ) -> Result<ChatResponse> {
            std::future::pending().await
        }
    }

    fn reply(text: &str, compound: Option<f64>, crisis: bool) -> ChatResponse {
        ChatResponse {
            conversation_id: Some("conv-1".into()),
            message: text.into(),
            mood_analysis: compound.map(|c| MoodAnalysis {
                mood_state: None,
                sentiment_scores: Some(SentimentScores {
                    compound: Some(c),
                    ..Default::default()
                }),
            }),
            crisis_intervention: crisis.then(|| CrisisIntervention {
                level: "critical".into(),
                resources: vec![],
                de_escalation_message: "Please reach out.".into(),
                immediate_actions: vec![],
            }),
        }
    }

    fn view(backend: Arc<ScriptedBackend>) -> ChatView {
        ChatView::new(backend, Credentials::bearer("token"))
    }

    #[tokio::test]
    async fn test_reply_updates_mood_indicator() {
        let backend = ScriptedBackend::with(vec![Ok(reply("Glad to hear it", Some(0.7), false))]);
        let mut view = view(backend);

        view.send_user_message("great day").await.unwrap();
        assert_eq!(view.mood().category(), MoodCategory::VeryPositive);
        assert_eq!(view.messages().len(), 3);
        assert!(!view.crisis().is_active());
    }

    #[tokio::test]
    async fn test_crisis_and_reply_both_applied() {
        let backend = ScriptedBackend::with(vec![Ok(reply("I'm here with you", Some(-0.9), true))]);
        let mut view = view(backend);

        view.send_user_message("I want to give up").await.unwrap();
        assert!(view.crisis().is_active());
        assert_eq!(view.messages().last().unwrap().content, "I'm here with you");
        assert_eq!(view.mood().category(), MoodCategory::VeryNegative);

        assert!(view.dismiss_crisis().is_some());
        assert!(!view.crisis().is_active());
        assert_eq!(view.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_analysis_keeps_last_mood() {
        let backend = ScriptedBackend::with(vec![
            Ok(reply("ok", Some(-0.3), false)),
            Ok(reply("noted", None, false)),
        ]);
        let mut view = view(backend);

        view.send_user_message("meh").await.unwrap();
        view.send_user_message("still meh").await.unwrap();
        assert_eq!(view.mood().category(), MoodCategory::Negative);
    }

    #[tokio::test]
    async fn test_session_id_flows_into_next_request() {
        let backend = ScriptedBackend::with(vec![Ok(reply("one", None, false)), Ok(reply("two", None, false))]);
        let mut view = view(Arc::clone(&backend));

        view.send_user_message("first").await.unwrap();
        view.send_user_message("second").await.unwrap();

        let seen = backend.seen.lock().unwrap();
        assert!(seen[0].conversation_id.is_none());
        assert_eq!(seen[1].conversation_id.as_deref(), Some("conv-1"));
    }

    #[test]
    fn test_close_drops_pending_completion() {
        let mut view = view(ScriptedBackend::with(vec![]));
        let ticket = view.begin_send("hello").unwrap();
        view.close();

        let outcome = view
            .complete_send(ticket, Ok(reply("late", Some(0.9), true)))
            .unwrap();
        assert!(matches!(outcome, SendOutcome::Stale));
        assert_eq!(view.messages().len(), 2);
        assert!(!view.crisis().is_active());
        assert_eq!(view.mood().category(), MoodCategory::Neutral);
        assert!(matches!(view.begin_send("again"), Err(SereneError::ViewClosed)));
    }

    #[tokio::test]
    async fn test_new_conversation_resets_state() {
        let backend = ScriptedBackend::with(vec![Ok(reply("hey", Some(0.8), true))]);
        let mut view = view(backend);
        view.send_user_message("hi").await.unwrap();

        view.new_conversation();
        assert!(view.session().id().is_none());
        assert_eq!(view.messages().len(), 1);
        assert!(!view.crisis().is_active());
        assert_eq!(view.mood().category(), MoodCategory::Neutral);
    }

    #[tokio::test]
    async fn test_dropped_send_returns_view_to_idle() {
        let mut view = ChatView::new(Arc::new(SilentBackend), Credentials::bearer("token"));

        let sent = tokio::time::timeout(Duration::from_millis(20), view.send_user_message("are you there?")).await;
        assert!(sent.is_err());

        assert!(!view.session().is_sending());
        assert_eq!(view.messages().len(), 3);
        assert_eq!(view.messages()[1].content, "are you there?");
        assert_eq!(view.messages()[2].content, fallback_notice());
        assert!(view.begin_send("hello again").is_ok());
    }

    #[test]
    fn test_abandon_after_close_is_ignored() {
        let mut view = view(ScriptedBackend::with(vec![]));
        let ticket = view.begin_send("hello").unwrap();
        view.close();

        assert!(!view.abandon_send(ticket));
        assert_eq!(view.messages().len(), 2);
    }
}
