//! Motion directive execution.
//!
//! The executor is stateless: it maps a [`MotionDirective`] onto two per-side
//! [`Actuator`] calls and arms the duration timer held in the caller's
//! [`DriveState`].
//!
//! | direction | left motor | right motor |
//! |-----------|------------|-------------|
//! | forward   | forward    | forward     |
//! | back      | backward   | backward    |
//! | left      | backward   | forward     |
//! | right     | forward    | backward    |
//! | stop      | stop       | stop        |
//!
//! ```rust
//! use rover_dispatch::executor::{execute, DriveState, ExecutionOutcome};
//! use rover_dispatch::hal::MockActuator;
//! use rover_dispatch::{Direction, MotionDirective};
//!
//! let mut actuator = MockActuator::new();
//! let mut drive = DriveState::default();
//!
//! let outcome = execute(&MotionDirective::new(Direction::Left, 2, 40), &mut actuator, &mut drive, 0).unwrap();
//! assert_eq!(outcome, ExecutionOutcome::Ran);
//! assert!(drive.driving);
//! assert_eq!(drive.duration_ms, 2000);
//! ```

use crate::commands::MotionDirective;
use crate::parsing::{parse_directive_with, CommandDefaults};
use crate::traits::{Actuator, MotorSide};

/// Timer and motion flags for the active directive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriveState {
    /// A directive's timer is armed.
    pub running: bool,
    /// The motors are in a non-stop state.
    pub driving: bool,
    /// Duration of the active directive (0 = no expiry).
    pub duration_ms: u32,
    /// Clock reading when the active directive started.
    pub started_ms: u64,
    /// The directive last applied to the motors.
    pub current: Option<MotionDirective>,
}

impl DriveState {
    /// Milliseconds since the active directive started.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_ms)
    }

    /// True when a timed directive has run its full duration.
    ///
    /// A zero duration never expires.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.running && self.duration_ms != 0 && self.elapsed_ms(now_ms) >= u64::from(self.duration_ms)
    }
}

/// What happened when a command was handed to the executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Actuator commanded and timer armed.
    Ran,
    /// The command did not parse; nothing was touched.
    BadCommand,
}

/// Apply `directive` to both motors and arm the timer.
///
/// If the actuator fails part way, both sides are sent a best-effort stop
/// and `drive` is cleared to idle before the error is returned.
pub fn execute<A: Actuator>(
    directive: &MotionDirective,
    actuator: &mut A,
    drive: &mut DriveState,
    now_ms: u64,
) -> Result<ExecutionOutcome, A::Error> {
    let direction = directive.direction();
    if let Err(err) = apply_sides(directive, actuator) {
        for side in MotorSide::BOTH {
            let _ = actuator.stop(side);
        }
        *drive = DriveState::default();
        tracing::error!(
            direction = direction.as_str(),
            "actuator fault, motors stopped"
        );
        return Err(err);
    }

    drive.driving = directive.is_motion();
    drive.duration_ms = directive.duration_ms();
    drive.started_ms = now_ms;
    drive.running = true;
    drive.current = Some(*directive);

    tracing::info!(
        direction = direction.as_str(),
        duration_s = directive.duration_s(),
        speed = directive.speed(),
        "executing directive"
    );

    Ok(ExecutionOutcome::Ran)
}

fn apply_sides<A: Actuator>(directive: &MotionDirective, actuator: &mut A) -> Result<(), A::Error> {
    for side in MotorSide::BOTH {
        match directive.direction().side_command(side) {
            Some(spin) => actuator.drive(side, spin, directive.speed())?,
            None => actuator.stop(side)?,
        }
    }
    Ok(())
}

/// Parse `raw` and execute it.
///
/// A parse failure returns [`ExecutionOutcome::BadCommand`] without touching
/// the actuator or `drive`.
pub fn execute_raw<A: Actuator>(
    raw: &str,
    defaults: &CommandDefaults,
    actuator: &mut A,
    drive: &mut DriveState,
    now_ms: u64,
) -> Result<ExecutionOutcome, A::Error> {
    match parse_directive_with(raw, defaults) {
        Ok(directive) => execute(&directive, actuator, drive, now_ms),
        Err(err) => {
            tracing::warn!(command = raw, %err, "rejecting command");
            Ok(ExecutionOutcome::BadCommand)
        }
    }
}
