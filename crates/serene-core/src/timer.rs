//! Phase timer for guided exercises.
//!
//! A [`PhaseTimer`] counts down through a cyclic [`PhaseSequence`]. Ticks
//! carry the wall time elapsed since the previous tick, so a host that
//! delivers ticks late (background tab, suspended laptop) still ends up in
//! the right phase: whole seconds are consumed across as many phase
//! transitions as needed and the sub-second remainder is carried forward.
//!
//! Invariant: across one full cycle the countdown consumes exactly the sum
//! of the phase durations, however the elapsed time was split into ticks.

use crate::clock::{Clock, SystemClock};
use crate::{Result, SereneError};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// One named, timed step of an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExercisePhase {
    pub name: String,
    pub duration_secs: u32,
}

impl ExercisePhase {
    pub fn new(name: impl Into<String>, duration_secs: u32) -> Self {
        Self {
            name: name.into(),
            duration_secs,
        }
    }
}

/// Ordered, non-empty, cyclic list of phases with positive durations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseSequence {
    phases: Vec<ExercisePhase>,
}

impl PhaseSequence {
    pub fn new(phases: Vec<ExercisePhase>) -> Result<Self> {
        if phases.is_empty() {
            return Err(SereneError::EmptySequence);
        }
        if let Some(bad) = phases.iter().find(|p| p.duration_secs == 0) {
            return Err(SereneError::InvalidPhaseDuration {
                name: bad.name.clone(),
                seconds: 0,
            });
        }
        Ok(Self { phases })
    }

    /// Build from `(name, seconds)` pairs, as read from user-supplied config.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[(S, i64)]) -> Result<Self> {
        let phases = pairs
            .iter()
            .map(|(name, seconds)| match u32::try_from(*seconds) {
                Ok(secs) if secs > 0 => Ok(ExercisePhase::new(name.as_ref(), secs)),
                _ => Err(SereneError::InvalidPhaseDuration {
                    name: name.as_ref().to_string(),
                    seconds: *seconds,
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(phases)
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Never true for a constructed sequence.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn phases(&self) -> &[ExercisePhase] {
        &self.phases
    }

    pub fn phase(&self, index: usize) -> &ExercisePhase {
        &self.phases[index % self.phases.len()]
    }

    /// Length of one full cycle in seconds.
    pub fn cycle_secs(&self) -> u64 {
        self.phases.iter().map(|p| u64::from(p.duration_secs)).sum()
    }
}

impl<'de> Deserialize<'de> for PhaseSequence {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let phases = Vec::<ExercisePhase>::deserialize(d)?;
        PhaseSequence::new(phases).map_err(serde::de::Error::custom)
    }
}

/// Something the host may want to react to (sound cue, animation change).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    PhaseChanged { index: usize, name: String },
    CycleCompleted { cycles: u32 },
    /// The session limit was reached; the timer is no longer running.
    Completed,
}

/// Countdown state for one exercise run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    sequence: PhaseSequence,
    phase_index: usize,
    remaining_secs: u32,
    running: bool,
    cycle_count: u32,
    elapsed_secs: u64,
    limit_secs: Option<u64>,
    completed: bool,
}

impl TimerState {
    fn new(sequence: PhaseSequence, running: bool, limit_secs: Option<u64>) -> Self {
        let remaining_secs = sequence.phase(0).duration_secs;
        Self {
            sequence,
            phase_index: 0,
            remaining_secs,
            running,
            cycle_count: 0,
            elapsed_secs: 0,
            limit_secs,
            completed: false,
        }
    }

    pub fn sequence(&self) -> &PhaseSequence {
        &self.sequence
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn phase(&self) -> &ExercisePhase {
        self.sequence.phase(self.phase_index)
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    /// Countdown seconds consumed since start or reset.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Seconds left in the session, if it has a limit.
    pub fn session_remaining_secs(&self) -> Option<u64> {
        self.limit_secs
            .map(|limit| limit.saturating_sub(self.elapsed_secs))
    }

    /// Consume `secs` whole seconds of countdown.
    fn consume(&mut self, secs: u64, events: &mut Vec<TimerEvent>) {
        let mut left = match self.session_remaining_secs() {
            Some(session_left) => secs.min(session_left),
            None => secs,
        };
        let finishes_session = self.session_remaining_secs() == Some(left) && left > 0;

        // Whole cycles from any position land back on the same position,
        // crossing the wrap exactly once each.
        let cycle = self.sequence.cycle_secs();
        let whole_cycles = left / cycle;
        if whole_cycles > 0 {
            let added = u32::try_from(whole_cycles).unwrap_or(u32::MAX);
            self.cycle_count = self.cycle_count.saturating_add(added);
            self.elapsed_secs += whole_cycles * cycle;
            left %= cycle;
            events.push(TimerEvent::CycleCompleted {
                cycles: self.cycle_count,
            });
        }

        while left > 0 {
            let step = left.min(u64::from(self.remaining_secs));
            // step <= remaining_secs, which is a u32
            self.remaining_secs -= step as u32;
            self.elapsed_secs += step;
            left -= step;

            if self.remaining_secs == 0 {
                self.advance_phase(events);
            }
        }

        if finishes_session {
            self.running = false;
            self.completed = true;
            events.push(TimerEvent::Completed);
        }
    }

    fn advance_phase(&mut self, events: &mut Vec<TimerEvent>) {
        self.phase_index = (self.phase_index + 1) % self.sequence.len();
        let phase = self.sequence.phase(self.phase_index);
        self.remaining_secs = phase.duration_secs;
        events.push(TimerEvent::PhaseChanged {
            index: self.phase_index,
            name: phase.name.clone(),
        });
        if self.phase_index == 0 {
            self.cycle_count = self.cycle_count.saturating_add(1);
            events.push(TimerEvent::CycleCompleted {
                cycles: self.cycle_count,
            });
        }
    }
}

/// Cancellable countdown engine driven by an injected clock.
///
/// `state()` is `None` until started and after `stop()`.
pub struct PhaseTimer<C: Clock = SystemClock> {
    clock: C,
    state: Option<TimerState>,
    last_tick: Option<Instant>,
    carry: Duration,
    limit_secs: Option<u64>,
}

impl PhaseTimer<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for PhaseTimer<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> PhaseTimer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            state: None,
            last_tick: None,
            carry: Duration::ZERO,
            limit_secs: None,
        }
    }

    /// Stop counting after `secs` seconds of countdown (per start/reset).
    pub fn with_session_limit(mut self, secs: u64) -> Self {
        self.limit_secs = (secs > 0).then_some(secs);
        self
    }

    pub fn state(&self) -> Option<&TimerState> {
        self.state.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.state.as_ref().is_some_and(TimerState::is_running)
    }

    /// Begin from phase 0. Restarts if already running.
    pub fn start(&mut self, sequence: PhaseSequence) {
        debug!(target: "serene::timer", "Starting sequence of {} phases", sequence.len());
        self.state = Some(TimerState::new(sequence, true, self.limit_secs));
        self.carry = Duration::ZERO;
        self.last_tick = Some(self.clock.now());
    }

    /// Like `start` but paused; the user must resume explicitly.
    pub fn reset(&mut self, sequence: PhaseSequence) {
        debug!(target: "serene::timer", "Resetting sequence of {} phases", sequence.len());
        self.state = Some(TimerState::new(sequence, false, self.limit_secs));
        self.carry = Duration::ZERO;
        self.last_tick = None;
    }

    pub fn pause(&mut self) {
        if let Some(state) = self.state.as_mut().filter(|s| s.running) {
            // Account for time up to the pause before freezing.
            let now = self.clock.now();
            let elapsed = self
                .last_tick
                .map(|prev| now.saturating_duration_since(prev))
                .unwrap_or_default();
            let mut events = Vec::new();
            Self::consume_elapsed(state, &mut self.carry, elapsed, &mut events);
            state.running = false;
            self.last_tick = None;
            debug!(target: "serene::timer", "Paused at phase {} ({}s left)", state.phase_index, state.remaining_secs);
        }
    }

    /// Resume a paused timer. A completed session stays stopped until reset.
    pub fn resume(&mut self) {
        if let Some(state) = self.state.as_mut().filter(|s| !s.running && !s.completed) {
            state.running = true;
            self.last_tick = Some(self.clock.now());
            debug!(target: "serene::timer", "Resumed at phase {}", state.phase_index);
        }
    }

    /// Terminate and discard all progress.
    pub fn stop(&mut self) {
        self.state = None;
        self.last_tick = None;
        self.carry = Duration::ZERO;
    }

    /// Consume the time elapsed on the clock since the previous tick.
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        if !self.is_running() {
            return Vec::new();
        }
        let now = self.clock.now();
        let elapsed = self
            .last_tick
            .map(|prev| now.saturating_duration_since(prev))
            .unwrap_or_default();
        self.last_tick = Some(now);
        self.advance(elapsed)
    }

    /// Consume an explicit elapsed duration. No-op when not running.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if let Some(state) = self.state.as_mut().filter(|s| s.running) {
            Self::consume_elapsed(state, &mut self.carry, elapsed, &mut events);
        }
        events
    }

    fn consume_elapsed(
        state: &mut TimerState,
        carry: &mut Duration,
        elapsed: Duration,
        events: &mut Vec<TimerEvent>,
    ) {
        let total = *carry + elapsed;
        let whole = total.as_secs();
        *carry = total - Duration::from_secs(whole);
        if whole > 0 {
            state.consume(whole, events);
        }
        if state.completed {
            *carry = Duration::ZERO;
        }
    }
}
