//! Plain-text rendering for the terminal.

use serene_core::{BreathingExercise, CrisisController, GroundingStep, MoodAggregate, MoodTrend, TimerState, TrendDirection};
use serene_types::{ChatRole, ContactKind, Message, MoodCategory};
use std::fmt::Write;

const BAR_WIDTH: usize = 20;

pub fn message(message: &Message) -> String {
    let speaker = match message.role {
        ChatRole::User => "You",
        ChatRole::Assistant => "Serene",
    };
    let mut out = format!("{}: {}", speaker, message.content);
    if let Some(mood) = message.mood {
        let _ = write!(out, "\n  [mood: {}]", mood.label());
    }
    out
}

/// Crisis banner with every resource and the de-escalation message.
pub fn crisis_banner(crisis: &CrisisController) -> Option<String> {
    let signal = crisis.alert().signal()?;
    let mut out = String::from("==================== YOU ARE NOT ALONE ====================\n");
    if !signal.message.is_empty() {
        let _ = writeln!(out, "{}\n", signal.message);
    }
    for resource in crisis.resources() {
        let verb = match resource.kind() {
            ContactKind::Call => "call",
            ContactKind::Text => "text",
        };
        let _ = writeln!(out, "  * {} ({}): {}", resource.name, verb, resource.contact);
    }
    out.push_str("Type /dismiss to close this notice.\n");
    out.push_str("===========================================================");
    Some(out)
}

pub fn mood_indicator(category: MoodCategory, sentiment: Option<f64>) -> String {
    match sentiment {
        Some(score) => format!("Current mood: {} ({:+.2})", category.label(), score),
        None => format!("Current mood: {}", category.label()),
    }
}

/// One-line countdown display: phase, seconds left, and cycle progress.
pub fn timer_line(state: &TimerState) -> String {
    let phase = state.phase();
    let total = phase.duration_secs.max(1) as usize;
    let done = total.saturating_sub(state.remaining_secs() as usize);
    let filled = done * BAR_WIDTH / total;
    let instruction = BreathingExercise::instruction(&phase.name);
    let label = if instruction.is_empty() { phase.name.as_str() } else { instruction };

    let mut line = format!(
        "[{}{}] {:<18} {:>3}s  cycle {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        label,
        state.remaining_secs(),
        state.cycle_count() + 1
    );
    if let Some(left) = state.session_remaining_secs() {
        let _ = write!(line, "  ({}:{:02} left)", left / 60, left % 60);
    }
    line
}

pub fn grounding_step(step: &GroundingStep, index: usize, total: usize) -> String {
    format!("Step {}/{}: {} [{}]", index + 1, total, step.instruction, step.sense)
}

pub fn week(aggregate: &MoodAggregate) -> String {
    let mut out = format!(
        "Week of {} to {}\n",
        aggregate.window.start().format("%b %-d"),
        aggregate.window.end().format("%b %-d, %Y")
    );
    for (day, category) in &aggregate.days {
        let label = category.map(MoodCategory::label).unwrap_or("-");
        let _ = writeln!(out, "  {}  {}", day.format("%a %d"), label);
    }
    match (aggregate.average, aggregate.average_category()) {
        (Some(avg), Some(category)) => {
            let _ = write!(
                out,
                "Average: {:.1}/10 ({}) over {} day(s)",
                avg,
                category.label(),
                aggregate.sample_count
            );
        }
        _ => out.push_str("No mood logged this week."),
    }
    out
}

pub fn trend(trend: &MoodTrend) -> String {
    match trend {
        MoodTrend::InsufficientData => "Trend: log a few more days to see a trend.".to_string(),
        MoodTrend::Analysis {
            direction,
            volatility,
            current,
            ..
        } => {
            let direction = match direction {
                TrendDirection::Improving => "improving",
                TrendDirection::Declining => "declining",
                TrendDirection::Stable => "stable",
            };
            format!(
                "Trend: {} (latest {}, volatility {:.2})",
                direction,
                current.label(),
                volatility
            )
        }
    }
}
