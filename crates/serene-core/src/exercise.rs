//! Built-in guided exercises.

use crate::timer::{ExercisePhase, PhaseSequence};
use crate::{Result, SereneError};
use serde::Serialize;

/// A timed breathing exercise from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreathingExercise {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Total session length; `None` cycles until the user stops.
    pub session_secs: Option<u64>,
    phases: &'static [(&'static str, u32)],
}

impl BreathingExercise {
    pub fn sequence(&self) -> Result<PhaseSequence> {
        let phases = self
            .phases
            .iter()
            .map(|(name, secs)| ExercisePhase::new(*name, *secs))
            .collect();
        PhaseSequence::new(phases)
    }

    /// Instruction text for a phase name.
    pub fn instruction(phase: &str) -> &'static str {
        match phase {
            "inhale" => "Breathe in slowly",
            "hold" => "Hold your breath",
            "exhale" => "Exhale completely",
            "rest" => "Rest",
            _ => "",
        }
    }
}

pub const FOUR_SEVEN_EIGHT: BreathingExercise = BreathingExercise {
    id: "4-7-8-breathing",
    title: "4-7-8 Breathing",
    description: "Inhale for 4, hold for 7, exhale for 8 seconds.",
    session_secs: None,
    phases: &[("inhale", 4), ("hold", 7), ("exhale", 8), ("rest", 1)],
};

pub const BOX_BREATHING: BreathingExercise = BreathingExercise {
    id: "box-breathing",
    title: "Box Breathing",
    description: "A simple 4-4-4-4 breathing technique to reduce anxiety and promote calm.",
    session_secs: Some(300),
    phases: &[("inhale", 4), ("hold", 4), ("exhale", 4), ("hold", 4)],
};

pub const POWER_BREATHING: BreathingExercise = BreathingExercise {
    id: "power-breathing",
    title: "Power Breathing",
    description: "Energizing breath work to boost confidence and focus.",
    session_secs: Some(240),
    phases: &[("inhale", 2), ("exhale", 2)],
};

pub static CATALOG: [BreathingExercise; 3] = [FOUR_SEVEN_EIGHT, BOX_BREATHING, POWER_BREATHING];

/// Look up a breathing exercise by id.
pub fn find_exercise(id: &str) -> Option<&'static BreathingExercise> {
    CATALOG.iter().find(|e| e.id == id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroundingStep {
    pub count: u8,
    pub sense: &'static str,
    pub instruction: &'static str,
}

static GROUNDING_STEPS: [GroundingStep; 5] = [
    GroundingStep { count: 5, sense: "see", instruction: "Name 5 things you can see around you" },
    GroundingStep { count: 4, sense: "touch", instruction: "Name 4 things you can touch" },
    GroundingStep { count: 3, sense: "hear", instruction: "Name 3 things you can hear" },
    GroundingStep { count: 2, sense: "smell", instruction: "Name 2 things you can smell" },
    GroundingStep { count: 1, sense: "taste", instruction: "Name 1 thing you can taste" },
];

/// Self-paced 5-4-3-2-1 grounding exercise. The user advances each step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroundingStepper {
    InProgress { step: usize },
    Completed,
}

impl Default for GroundingStepper {
    fn default() -> Self {
        Self::new()
    }
}

impl GroundingStepper {
    pub fn new() -> Self {
        GroundingStepper::InProgress { step: 0 }
    }

    pub fn steps() -> &'static [GroundingStep] {
        &GROUNDING_STEPS
    }

    pub fn current(&self) -> Option<&'static GroundingStep> {
        match self {
            GroundingStepper::InProgress { step } => GROUNDING_STEPS.get(*step),
            GroundingStepper::Completed => None,
        }
    }

    /// Move to the next step; the last step completes the exercise.
    /// Returns true when this call completed it.
    pub fn advance(&mut self) -> bool {
        match *self {
            GroundingStepper::InProgress { step } if step + 1 < GROUNDING_STEPS.len() => {
                *self = GroundingStepper::InProgress { step: step + 1 };
                false
            }
            GroundingStepper::InProgress { .. } => {
                *self = GroundingStepper::Completed;
                true
            }
            GroundingStepper::Completed => false,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, GroundingStepper::Completed)
    }
}

/// Parse a custom sequence like `"inhale:4,hold:7,exhale:8"`.
pub fn parse_sequence(spec: &str) -> Result<PhaseSequence> {
    let pairs = spec
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (name, secs) = part.split_once(':').ok_or_else(|| SereneError::InvalidPhaseDuration {
                name: part.to_string(),
                seconds: 0,
            })?;
            let seconds = secs.trim().parse::<i64>().map_err(|_| SereneError::InvalidPhaseDuration {
                name: name.trim().to_string(),
                seconds: 0,
            })?;
            Ok((name.trim().to_string(), seconds))
        })
        .collect::<Result<Vec<_>>>()?;
    PhaseSequence::from_pairs(&pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sequences_are_valid() {
        for exercise in CATALOG.iter() {
            let seq = exercise.sequence().unwrap();
            assert!(!seq.is_empty(), "{}", exercise.id);
        }
        assert_eq!(FOUR_SEVEN_EIGHT.sequence().unwrap().cycle_secs(), 20);
        assert_eq!(BOX_BREATHING.sequence().unwrap().cycle_secs(), 16);
    }

    #[test]
    fn test_find_exercise() {
        assert_eq!(find_exercise("box-breathing").map(|e| e.title), Some("Box Breathing"));
        assert!(find_exercise("yoga").is_none());
    }

    #[test]
    fn test_grounding_walkthrough() {
        let mut stepper = GroundingStepper::new();
        assert_eq!(stepper.current().map(|s| s.count), Some(5));

        for _ in 0..4 {
            assert!(!stepper.advance());
        }
        assert_eq!(stepper.current().map(|s| s.sense), Some("taste"));

        assert!(stepper.advance());
        assert!(stepper.is_completed());
        assert!(stepper.current().is_none());
        assert!(!stepper.advance());
    }

    #[test]
    fn test_parse_sequence() {
        let seq = parse_sequence("inhale:4, hold:7 ,exhale:8").unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.phase(1).name, "hold");
        assert_eq!(seq.cycle_secs(), 19);

        assert!(parse_sequence("").is_err());
        assert!(parse_sequence("inhale").is_err());
        assert!(parse_sequence("inhale:x").is_err());
        assert!(parse_sequence("inhale:0").is_err());
    }
}
