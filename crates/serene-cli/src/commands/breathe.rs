//! Guided breathing and grounding exercises.

use crate::render;
use anyhow::{Result, anyhow};
use serene_core::{CATALOG, GroundingStepper, PhaseSequence, PhaseTimer, TimerEvent, find_exercise, parse_sequence};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Display refresh rate. The timer itself tracks real elapsed time.
const REFRESH: Duration = Duration::from_millis(200);

pub struct BreatheArgs {
    pub exercise: String,
    pub phases: Option<String>,
    pub minutes: Option<u64>,
}

/// Resolve the sequence and session limit (seconds) to run.
pub fn plan(args: &BreatheArgs) -> Result<(String, PhaseSequence, Option<u64>)> {
    let limit = args
        .minutes
        .map(|m| m.checked_mul(60).ok_or_else(|| anyhow!("--minutes {} is too large", m)))
        .transpose()?;
    if let Some(spec) = &args.phases {
        return Ok(("Custom breathing".to_string(), parse_sequence(spec)?, limit));
    }
    let exercise = find_exercise(&args.exercise).ok_or_else(|| {
        let ids: Vec<&str> = CATALOG.iter().map(|e| e.id).collect();
        anyhow!("unknown exercise '{}' (available: {})", args.exercise, ids.join(", "))
    })?;
    Ok((exercise.title.to_string(), exercise.sequence()?, limit.or(exercise.session_secs)))
}

pub fn list() {
    for exercise in CATALOG.iter() {
        let length = match exercise.session_secs {
            Some(secs) => format!("{} min", secs / 60),
            None => "open-ended".to_string(),
        };
        println!("{:<18} {:<18} {:<11} {}", exercise.id, exercise.title, length, exercise.description);
    }
    println!("{:<18} {:<18} {:<11} 5-4-3-2-1 senses exercise (serene ground)", "grounding", "Grounding", "self-paced");
}

pub async fn run(args: BreatheArgs) -> Result<()> {
    let (title, sequence, limit) = plan(&args)?;
    info!(target: "serene::timer", "Starting {} ({} phases, limit {:?}s)", title, sequence.len(), limit);

    let mut timer = PhaseTimer::new();
    if let Some(secs) = limit {
        timer = timer.with_session_limit(secs);
    }
    timer.start(sequence);

    println!("{} - press Ctrl+C to stop\n", title);
    let mut interval = tokio::time::interval(REFRESH);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                for event in timer.tick() {
                    match event {
                        TimerEvent::PhaseChanged { index, name } => {
                            debug!(target: "serene::timer", "Phase {} ({})", index, name);
                        }
                        TimerEvent::CycleCompleted { cycles } => {
                            debug!(target: "serene::timer", "Cycle {} complete", cycles);
                        }
                        TimerEvent::Completed => {
                            info!(target: "serene::timer", "Session complete");
                        }
                    }
                }
                let Some(state) = timer.state() else { break };
                print!("\r{}   ", render::timer_line(state));
                std::io::stdout().flush()?;
                if state.is_completed() {
                    println!("\n\nWell done. Notice how you feel right now.");
                    break;
                }
            }
            _ = &mut ctrl_c => {
                let cycles = timer.state().map(|s| s.cycle_count()).unwrap_or_default();
                timer.stop();
                println!("\n\nStopped after {} full cycle(s).", cycles);
                break;
            }
        }
    }
    Ok(())
}

/// Walk the 5-4-3-2-1 grounding steps, advancing on Enter.
pub async fn ground() -> Result<()> {
    let mut stepper = GroundingStepper::new();
    let total = GroundingStepper::steps().len();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("5-4-3-2-1 Grounding. Take your time; press Enter for the next step.\n");
    let mut index = 0;
    while let Some(step) = stepper.current() {
        print!("{} ", render::grounding_step(step, index, total));
        std::io::stdout().flush()?;
        if lines.next_line().await?.is_none() {
            break;
        }
        stepper.advance();
        index += 1;
    }
    if stepper.is_completed() {
        println!("\nYou are here, right now. Well done.");
    }
    Ok(())
}
