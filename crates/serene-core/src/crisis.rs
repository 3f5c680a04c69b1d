//! Crisis alert state machine.
//!
//! ```text
//!   Idle --activate(signal)--> Alerting(signal)
//!   Alerting --activate(signal')--> Alerting(signal')   (newest wins)
//!   Alerting --dismiss()--> Idle
//! ```
//!
//! There is no timeout transition. An alert stays up until the user
//! closes it or the owning view is torn down.

use serene_types::{CrisisResource, CrisisSignal, hotline_resources};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CrisisAlert {
    #[default]
    Idle,
    Alerting(CrisisSignal),
}

impl CrisisAlert {
    pub fn is_active(&self) -> bool {
        matches!(self, CrisisAlert::Alerting(_))
    }

    pub fn signal(&self) -> Option<&CrisisSignal> {
        match self {
            CrisisAlert::Alerting(signal) => Some(signal),
            CrisisAlert::Idle => None,
        }
    }
}

/// Owns the alert state for one chat view.
#[derive(Debug, Default)]
pub struct CrisisController {
    alert: CrisisAlert,
    activations: u32,
}

impl CrisisController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alert(&self) -> &CrisisAlert {
        &self.alert
    }

    pub fn is_active(&self) -> bool {
        self.alert.is_active()
    }

    /// Number of signals received over the view's lifetime.
    pub fn activations(&self) -> u32 {
        self.activations
    }

    /// Enter (or stay in) the alerting state with `signal` as the payload.
    pub fn activate(&mut self, signal: CrisisSignal) {
        self.activations = self.activations.saturating_add(1);
        match &self.alert {
            CrisisAlert::Alerting(previous) => warn!(
                target: "serene::crisis",
                "Crisis alert replaced: {} -> {}",
                previous.level,
                signal.level
            ),
            CrisisAlert::Idle => warn!(
                target: "serene::crisis",
                "Crisis alert raised at level {}",
                signal.level
            ),
        }
        self.alert = CrisisAlert::Alerting(signal);
    }

    /// Explicit user close. Returns the dismissed signal, if any.
    pub fn dismiss(&mut self) -> Option<CrisisSignal> {
        match std::mem::take(&mut self.alert) {
            CrisisAlert::Alerting(signal) => {
                info!(target: "serene::crisis", "Crisis alert dismissed by user");
                Some(signal)
            }
            CrisisAlert::Idle => None,
        }
    }

    /// Resources to show: the signal's own list, or the standard hotlines if
    /// the signal arrived without any.
    pub fn resources(&self) -> Vec<CrisisResource> {
        match &self.alert {
            CrisisAlert::Alerting(signal) if !signal.resources.is_empty() => signal.resources.clone(),
            CrisisAlert::Alerting(_) => hotline_resources(),
            CrisisAlert::Idle => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serene_types::CrisisLevel;

    fn signal(level: CrisisLevel, message: &str) -> CrisisSignal {
        CrisisSignal {
            level,
            resources: vec![CrisisResource::new("Lifeline", "988")],
            message: message.to_string(),
            immediate_actions: vec![],
        }
    }

    #[test]
    fn test_starts_idle() {
        let controller = CrisisController::new();
        assert!(!controller.is_active());
        assert!(controller.alert().signal().is_none());
        assert!(controller.resources().is_empty());
    }

    #[test]
    fn test_latest_signal_wins_then_dismiss() {
        let mut controller = CrisisController::new();
        let a = signal(CrisisLevel::Critical, "A");
        let b = signal(CrisisLevel::High, "B");

        controller.activate(a);
        controller.activate(b.clone());
        assert_eq!(controller.alert(), &CrisisAlert::Alerting(b.clone()));
        assert_eq!(controller.activations(), 2);

        assert_eq!(controller.dismiss(), Some(b));
        assert_eq!(controller.alert(), &CrisisAlert::Idle);
        assert!(controller.alert().signal().is_none());
    }

    #[test]
    fn test_dismiss_when_idle_is_noop() {
        let mut controller = CrisisController::new();
        assert!(controller.dismiss().is_none());
        assert!(!controller.is_active());
    }

    #[test]
    fn test_empty_resources_fall_back_to_hotlines() {
        let mut controller = CrisisController::new();
        controller.activate(CrisisSignal {
            level: CrisisLevel::High,
            resources: vec![],
            message: String::new(),
            immediate_actions: vec![],
        });
        let resources = controller.resources();
        assert!(resources.iter().any(|r| r.contact.contains("988")));
    }
}
