//! Conversation session: the append-only message log for one chat and the
//! request/response cycle that feeds it.
//!
//! Sending is split in two so the host can own the network call:
//! [`ConversationSession::begin_send`] appends the user message and returns a
//! [`SendTicket`]; [`ConversationSession::complete_send`] applies the result,
//! or [`ConversationSession::abandon_send`] gives up on it.
//! Only one ticket can be outstanding at a time, which is what keeps replies
//! in send order.

use crate::mood::MoodIndicator;
use crate::{ErrorKind, Result, SereneError};
use serene_types::{ChatRequest, ChatResponse, CrisisSignal, Message, MoodAnalysis, hotline_resources};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Assistant text appended when a send fails for any reason other than
/// authentication. It lists the same hotlines as [`hotline_resources`].
pub fn fallback_notice() -> String {
    let mut notice = String::from(
        "## Connection Issue\n\n\
         I'm having trouble connecting right now. Please try again in a moment.\n\n\
         > **If you're in crisis**, please reach out immediately:\n",
    );
    for resource in hotline_resources() {
        notice.push_str(&format!("> - **{}** - {}\n", resource.contact, resource.name));
    }
    notice.push_str("\nI'll be here when you're ready to try again.");
    notice
}

/// The local message to append for a failed send, if any.
pub fn fallback_message(error: &SereneError) -> Option<Message> {
    match error.kind() {
        ErrorKind::Auth => None,
        ErrorKind::Transport | ErrorKind::Validation => Some(Message::assistant(fallback_notice())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendPhase {
    Idle,
    Awaiting { seq: u64 },
}

/// Proof of an outstanding send. Must be handed back to `complete_send`.
#[derive(Debug)]
pub struct SendTicket {
    view: Uuid,
    seq: u64,
    request: ChatRequest,
}

impl SendTicket {
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }

    pub(crate) fn key(&self) -> (Uuid, u64) {
        (self.view, self.seq)
    }
}

/// What a successful reply carried besides its text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Delivery {
    pub mood: Option<MoodAnalysis>,
    pub crisis: Option<CrisisSignal>,
}

#[derive(Debug)]
pub enum SendOutcome {
    /// The assistant reply was appended.
    Delivered(Delivery),
    /// The send failed; the safety notice was appended instead.
    Recovered(SereneError),
    /// The ticket belongs to a torn-down view or an older send; nothing changed.
    Stale,
}

/// Message log and session identity for one chat view.
#[derive(Debug)]
pub struct ConversationSession {
    view: Uuid,
    id: Option<String>,
    messages: Vec<Message>,
    phase: SendPhase,
    seq: u64,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSession {
    /// A fresh session seeded with the assistant greeting.
    pub fn new() -> Self {
        Self {
            view: Uuid::new_v4(),
            id: None,
            messages: vec![Message::greeting()],
            phase: SendPhase::Idle,
            seq: 0,
        }
    }

    /// Server-issued session id, once established.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.phase, SendPhase::Awaiting { .. })
    }

    /// Replace with a fresh session. Outstanding tickets become stale.
    pub fn restart(&mut self) {
        info!(target: "serene::chat", "Starting fresh session (previous: {:?})", self.id);
        *self = Self::new();
    }

    /// Validate and append the user message, then hand out the request to send.
    pub fn begin_send(&mut self, text: &str) -> Result<SendTicket> {
        if text.trim().is_empty() {
            return Err(SereneError::EmptyMessage);
        }
        if self.is_sending() {
            return Err(SereneError::SendInFlight);
        }

        self.messages.push(Message::user(text));
        self.seq += 1;
        self.phase = SendPhase::Awaiting { seq: self.seq };
        debug!(target: "serene::chat", "Sending message #{} (session: {:?})", self.seq, self.id);

        Ok(SendTicket {
            view: self.view,
            seq: self.seq,
            request: ChatRequest {
                message: text.to_string(),
                conversation_id: self.id.clone(),
            },
        })
    }

    /// Apply the result of a send.
    ///
    /// Auth failures are returned as errors and leave the log as it is; any
    /// other failure appends the safety notice.
    pub fn complete_send(&mut self, ticket: SendTicket, result: Result<ChatResponse>) -> Result<SendOutcome> {
        if !self.is_awaiting(ticket.key()) {
            debug!(target: "serene::chat", "Ignoring stale response for send #{}", ticket.seq);
            return Ok(SendOutcome::Stale);
        }
        self.phase = SendPhase::Idle;

        match result {
            Ok(response) => Ok(SendOutcome::Delivered(self.apply_response(response))),
            Err(e) => match fallback_message(&e) {
                None => {
                    warn!(target: "serene::chat", "Send rejected: {}", e);
                    Err(e)
                }
                Some(notice) => {
                    warn!(target: "serene::chat", "Send failed, showing safety notice: {}", e);
                    self.messages.push(notice);
                    Ok(SendOutcome::Recovered(e))
                }
            },
        }
    }

    /// Give up on a send whose result will never be applied.
    ///
    /// The session goes back to idle and the safety notice is appended, the
    /// same as for a transport failure. Returns `false` for a stale ticket.
    pub fn abandon_send(&mut self, ticket: SendTicket) -> bool {
        self.abandon(ticket.key())
    }

    pub(crate) fn abandon(&mut self, key: (Uuid, u64)) -> bool {
        if !self.is_awaiting(key) {
            return false;
        }
        self.phase = SendPhase::Idle;
        warn!(target: "serene::chat", "Send #{} abandoned, showing safety notice", key.1);
        self.messages
            .extend(fallback_message(&SereneError::Transport("send cancelled".into())));
        true
    }

    fn is_awaiting(&self, (view, seq): (Uuid, u64)) -> bool {
        view == self.view && self.phase == (SendPhase::Awaiting { seq })
    }

    fn apply_response(&mut self, response: ChatResponse) -> Delivery {
        let ChatResponse {
            conversation_id,
            message,
            mood_analysis,
            crisis_intervention,
        } = response;

        match (&self.id, conversation_id.filter(|id| !id.is_empty())) {
            (None, Some(issued)) => {
                info!(target: "serene::chat", "Session established: {}", issued);
                self.id = Some(issued);
            }
            (Some(current), Some(issued)) if *current != issued => {
                warn!(target: "serene::chat", "Server returned session {} for {}; keeping {}", issued, current, current);
            }
            _ => {}
        }

        let (mood, sentiment) = match &mood_analysis {
            Some(analysis) => (MoodIndicator::resolve(analysis), analysis.compound()),
            None => (None, None),
        };
        self.messages
            .push(Message::assistant(message).with_mood(mood, sentiment));

        Delivery {
            mood: mood_analysis,
            crisis: crisis_intervention.map(|c| c.into_signal()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serene_types::{ChatRole, CrisisIntervention, CrisisLevel, MoodCategory};

    fn reply(id: &str, text: &str) -> ChatResponse {
        ChatResponse {
            conversation_id: Some(id.to_string()),
            message: text.to_string(),
            mood_analysis: None,
            crisis_intervention: None,
        }
    }

    #[test]
    fn test_new_session_has_greeting() {
        let session = ConversationSession::new();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, ChatRole::Assistant);
        assert!(session.id().is_none());
        assert!(!session.is_sending());
    }

    #[test]
    fn test_rejects_blank_messages() {
        let mut session = ConversationSession::new();
        assert!(matches!(session.begin_send("   \n"), Err(SereneError::EmptyMessage)));
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_rejects_second_send_while_in_flight() {
        let mut session = ConversationSession::new();
        let _ticket = session.begin_send("first").unwrap();
        assert!(matches!(session.begin_send("second"), Err(SereneError::SendInFlight)));
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn test_first_request_has_no_id() {
        let mut session = ConversationSession::new();
        let ticket = session.begin_send("hello").unwrap();
        assert_eq!(ticket.request().message, "hello");
        assert!(ticket.request().conversation_id.is_none());
    }

    #[test]
    fn test_transport_failure_appends_notice() {
        let mut session = ConversationSession::new();
        let ticket = session.begin_send("hello").unwrap();
        let outcome = session
            .complete_send(ticket, Err(SereneError::Transport("connection refused".into())))
            .unwrap();

        assert!(matches!(outcome, SendOutcome::Recovered(_)));
        let new = &session.messages()[1..];
        assert_eq!(new.len(), 2);
        assert_eq!(new[0].content, "hello");
        assert_eq!(new[1].role, ChatRole::Assistant);
        assert!(new[1].content.contains("988"));
        assert!(new[1].content.contains("741741"));
        assert!(!session.is_sending());
    }

    #[test]
    fn test_auth_failure_appends_nothing() {
        let mut session = ConversationSession::new();
        let ticket = session.begin_send("hello").unwrap();
        let result = session.complete_send(ticket, Err(SereneError::Unauthorized));

        assert!(matches!(result, Err(SereneError::Unauthorized)));
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.last_message().unwrap().content, "hello");
        assert!(!session.is_sending());
    }

    #[test]
    fn test_session_id_is_adopted_once() {
        let mut session = ConversationSession::new();

        let ticket = session.begin_send("one").unwrap();
        session.complete_send(ticket, Ok(reply("abc", "first"))).unwrap();
        assert_eq!(session.id(), Some("abc"));

        let ticket = session.begin_send("two").unwrap();
        assert_eq!(ticket.request().conversation_id.as_deref(), Some("abc"));
        session.complete_send(ticket, Ok(reply("xyz", "second"))).unwrap();
        assert_eq!(session.id(), Some("abc"));
        assert_eq!(session.messages().len(), 5);
    }

    #[test]
    fn test_failed_first_send_leaves_id_absent() {
        let mut session = ConversationSession::new();
        let ticket = session.begin_send("one").unwrap();
        session
            .complete_send(ticket, Err(SereneError::Server { status: 500, body: String::new() }))
            .unwrap();
        assert!(session.id().is_none());
    }

    #[test]
    fn test_reply_carries_mood_and_crisis() {
        let mut session = ConversationSession::new();
        let ticket = session.begin_send("I can't go on").unwrap();
        let response = ChatResponse {
            conversation_id: Some("c1".into()),
            message: "I'm here with you.".into(),
            mood_analysis: Some(MoodAnalysis {
                mood_state: Some("very_negative".into()),
                sentiment_scores: None,
            }),
            crisis_intervention: Some(CrisisIntervention {
                level: "high".into(),
                resources: vec![],
                de_escalation_message: "You don't have to face this alone.".into(),
                immediate_actions: vec![],
            }),
        };

        let outcome = session.complete_send(ticket, Ok(response)).unwrap();
        let SendOutcome::Delivered(delivery) = outcome else {
            panic!("expected delivery");
        };
        assert_eq!(delivery.crisis.unwrap().level, CrisisLevel::High);
        assert!(delivery.mood.is_some());

        let last = session.last_message().unwrap();
        assert_eq!(last.content, "I'm here with you.");
        assert_eq!(last.mood, Some(MoodCategory::VeryNegative));
    }

    #[test]
    fn test_restart_makes_ticket_stale() {
        let mut session = ConversationSession::new();
        let ticket = session.begin_send("hello").unwrap();
        session.restart();

        let outcome = session.complete_send(ticket, Ok(reply("abc", "late"))).unwrap();
        assert!(matches!(outcome, SendOutcome::Stale));
        assert_eq!(session.messages().len(), 1);
        assert!(session.id().is_none());
    }

    #[test]
    fn test_fallback_is_pure_function_of_kind() {
        assert!(fallback_message(&SereneError::Unauthorized).is_none());
        let notice = fallback_message(&SereneError::Decode("bad json".into())).unwrap();
        assert_eq!(notice.content, fallback_notice());
    }

    #[test]
    fn test_fallback_notice_lists_every_hotline() {
        let notice = fallback_notice();
        for resource in hotline_resources() {
            assert!(notice.contains(&resource.contact), "missing {}", resource.contact);
            assert!(notice.contains(&resource.name), "missing {}", resource.name);
        }
    }

    #[test]
    fn test_abandoned_send_returns_to_idle_with_notice() {
        let mut session = ConversationSession::new();
        let ticket = session.begin_send("hello").unwrap();

        assert!(session.abandon_send(ticket));
        assert!(!session.is_sending());
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.last_message().unwrap().content, fallback_notice());
        assert!(session.begin_send("hello again").is_ok());
    }

    #[test]
    fn test_abandoning_stale_ticket_changes_nothing() {
        let mut session = ConversationSession::new();
        let ticket = session.begin_send("hello").unwrap();
        session.restart();

        assert!(!session.abandon_send(ticket));
        assert_eq!(session.messages().len(), 1);
        assert!(!session.is_sending());
    }
}
