//! Core chat, mood and exercise logic for Serene.

mod api;
mod backend;
mod clock;
mod conversation;
mod crisis;
mod error;
mod exercise;
mod mood;
mod timer;
mod view;

pub use api::ApiClient;
pub use backend::{ChatBackend, Credentials, MoodBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use conversation::{
    ConversationSession, Delivery, SendOutcome, SendTicket, fallback_message, fallback_notice,
};
pub use crisis::{CrisisAlert, CrisisController};
pub use error::{ErrorKind, SereneError};
pub use exercise::{
    BOX_BREATHING, BreathingExercise, CATALOG, FOUR_SEVEN_EIGHT, GroundingStep, GroundingStepper,
    POWER_BREATHING, find_exercise, parse_sequence,
};
pub use mood::{
    MAX_LOG_SCORE, MoodAggregate, MoodIndicator, MoodLog, MoodSample, MoodTracker, MoodTrend,
    TrendDirection, WellnessMetrics, Window, aggregate, analyze_trend, classify, classify_log_score,
    normalize_log_score,
};
pub use timer::{ExercisePhase, PhaseSequence, PhaseTimer, TimerEvent, TimerState};
pub use view::ChatView;

/// Result type for Serene operations.
pub type Result<T> = std::result::Result<T, SereneError>;
