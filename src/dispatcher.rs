//! Command scheduler tying the parser, queue and executor together.
//!
//! This module provides [`Dispatcher`], the single owned state machine that
//! accepts raw command strings and drives the motors.
//!
//! # Overview
//!
//! The dispatcher is either idle or running a timed directive:
//! - A queued command submitted while idle runs at once
//! - A queued command submitted while running waits in the ring buffer
//! - `!`-prefixed commands preempt whatever is running without touching the queue
//! - `*`-prefixed admin commands clear, reset or force-advance
//!
//! The host calls [`Dispatcher::tick`] periodically. When the active
//! directive's duration has elapsed, the next pending command runs; when
//! nothing is pending the motors are stopped and the dispatcher goes idle.
//!
//! # Example
//!
//! ```rust
//! use rover_dispatch::{Dispatcher, SubmitStatus, TickOutcome};
//! use rover_dispatch::hal::MockActuator;
//!
//! let mut dispatcher: Dispatcher<MockActuator> = Dispatcher::new(MockActuator::new());
//!
//! assert_eq!(dispatcher.submit("forward-1-50", 0).unwrap(), SubmitStatus::Ran);
//! assert_eq!(dispatcher.submit("left-2", 10).unwrap(), SubmitStatus::Queued);
//!
//! // Host loop
//! assert_eq!(dispatcher.tick(999).unwrap(), TickOutcome::Running);
//! assert_eq!(dispatcher.tick(1000).unwrap(), TickOutcome::Advanced);
//! assert_eq!(dispatcher.tick(3000).unwrap(), TickOutcome::Completed);
//! assert!(!dispatcher.is_running());
//! ```

use crate::commands::{AdminCommand, MotionDirective, SubmitStatus};
use crate::config::DispatcherConfig;
use crate::executor::{execute, execute_raw, DriveState, ExecutionOutcome};
use crate::parsing::{classify, CommandDefaults, Submission};
use crate::queue::{CommandQueue, QueueError, RawCommand, DEFAULT_QUEUE_CAPACITY};
use crate::traits::Actuator;

/// Result of a [`Dispatcher::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TickOutcome {
    /// Nothing is running.
    Idle,
    /// The active directive has time left (or never expires).
    Running,
    /// The active directive expired and the next queued command started.
    Advanced,
    /// The active directive expired with nothing left to run; motors stopped.
    Completed,
}

/// Snapshot of dispatcher state for UI/API.
///
/// # Example
///
/// ```rust
/// use rover_dispatch::{Dispatcher, Direction};
/// use rover_dispatch::hal::MockActuator;
///
/// let mut dispatcher: Dispatcher<MockActuator> = Dispatcher::new(MockActuator::new());
/// dispatcher.submit("back-3-40", 100).unwrap();
///
/// let state = dispatcher.state(1100);
/// assert!(state.running && state.driving);
/// assert_eq!(state.elapsed_ms, 1000);
/// assert_eq!(state.current.unwrap().direction(), Direction::Back);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatcherState {
    /// A directive's timer is armed.
    pub running: bool,
    /// The motors are moving.
    pub driving: bool,
    /// Duration of the active directive (0 = until replaced).
    pub duration_ms: u32,
    /// Time since the active directive started; 0 when idle.
    pub elapsed_ms: u64,
    /// Commands waiting in the queue.
    pub pending: usize,
    /// Queue capacity.
    pub capacity: usize,
    /// The active directive, if running.
    pub current: Option<MotionDirective>,
}

/// Remote command dispatcher for a two-motor rover.
///
/// # Type Parameters
///
/// - `A`: The motor driver ([`Actuator`] trait)
/// - `N`: Queue capacity, 20 by default
///
/// # Thread Safety
///
/// The dispatcher itself is not thread-safe. When several transports feed
/// it, wrap it in the `SharedDispatcher` from the services module.
pub struct Dispatcher<A: Actuator, const N: usize = DEFAULT_QUEUE_CAPACITY> {
    actuator: A,
    queue: CommandQueue<N>,
    drive: DriveState,
    defaults: CommandDefaults,
}

impl<A: Actuator, const N: usize> Dispatcher<A, N> {
    /// Create an idle dispatcher with the stock defaults (1 s, speed 25).
    pub fn new(actuator: A) -> Self {
        Self::with_defaults(actuator, CommandDefaults::default())
    }

    /// Create an idle dispatcher with custom parser defaults.
    pub fn with_defaults(actuator: A, defaults: CommandDefaults) -> Self {
        Self {
            actuator,
            queue: CommandQueue::new(),
            drive: DriveState::default(),
            defaults,
        }
    }

    /// Create an idle dispatcher from configuration.
    pub fn from_config(actuator: A, config: &DispatcherConfig) -> Self {
        Self::with_defaults(actuator, config.defaults())
    }

    /// Submit a raw command string.
    ///
    /// Returns the status the transport should report back:
    /// - `Ran` when a directive was applied to the motors
    /// - `Queued` when the command is waiting behind a running directive
    /// - `QueueFull`, `BadCommand`, `NoCommand` or `Unknown` otherwise
    ///
    /// Errors are actuator failures only.
    pub fn submit(&mut self, raw: &str, now_ms: u64) -> Result<SubmitStatus, A::Error> {
        let submission = classify(raw);
        tracing::debug!(raw, ?submission, "command submitted");

        match submission {
            Submission::Admin(Some(cmd)) => self.admin(cmd, now_ms),
            Submission::Admin(None) => {
                tracing::warn!(raw, "unknown admin command");
                Ok(SubmitStatus::Unknown)
            }
            Submission::Immediate(cmd) => self.run(cmd, now_ms),
            Submission::Queued(cmd) => self.enqueue(cmd, now_ms),
        }
    }

    /// Handle an admin command.
    pub fn admin(&mut self, cmd: AdminCommand, now_ms: u64) -> Result<SubmitStatus, A::Error> {
        tracing::info!(?cmd, "admin command");
        match cmd {
            AdminCommand::Clear => {
                self.queue.clear();
                Ok(SubmitStatus::Ran)
            }
            AdminCommand::Reset => {
                self.reset(now_ms)?;
                Ok(SubmitStatus::Ran)
            }
            AdminCommand::Next => self.run_next(now_ms),
        }
    }

    /// Advance on expiry. Call this from the host loop.
    pub fn tick(&mut self, now_ms: u64) -> Result<TickOutcome, A::Error> {
        if !self.drive.running {
            return Ok(TickOutcome::Idle);
        }
        if !self.drive.is_expired(now_ms) {
            return Ok(TickOutcome::Running);
        }

        tracing::info!(
            elapsed_ms = self.drive.elapsed_ms(now_ms),
            pending = self.queue.len(),
            "directive expired"
        );

        while let Some(status) = self.run_front(now_ms)? {
            if status == SubmitStatus::Ran {
                return Ok(TickOutcome::Advanced);
            }
        }

        self.halt(now_ms)?;
        tracing::info!("queue drained, stopped");
        Ok(TickOutcome::Completed)
    }

    /// Stop the motors, drop every pending command and go idle.
    ///
    /// The queue is emptied and the state goes idle even when the actuator
    /// reports an error.
    pub fn reset(&mut self, now_ms: u64) -> Result<(), A::Error> {
        self.queue.clear();
        self.halt(now_ms)?;
        tracing::info!("dispatcher reset");
        Ok(())
    }

    /// Get current state snapshot
    pub fn state(&self, now_ms: u64) -> DispatcherState {
        let running = self.drive.running;
        DispatcherState {
            running,
            driving: self.drive.driving,
            duration_ms: if running { self.drive.duration_ms } else { 0 },
            elapsed_ms: if running {
                self.drive.elapsed_ms(now_ms)
            } else {
                0
            },
            pending: self.queue.len(),
            capacity: N,
            current: if running { self.drive.current } else { None },
        }
    }

    /// Pending raw commands, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &str> + '_ {
        self.queue.iter()
    }

    /// Number of pending commands.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// True while a directive's timer is armed.
    pub fn is_running(&self) -> bool {
        self.drive.running
    }

    /// True while the motors are moving.
    pub fn is_driving(&self) -> bool {
        self.drive.driving
    }

    /// Parser defaults in effect.
    pub fn defaults(&self) -> CommandDefaults {
        self.defaults
    }

    /// Replace the parser defaults. Already queued commands pick them up
    /// when they run.
    pub fn set_defaults(&mut self, defaults: CommandDefaults) {
        self.defaults = defaults;
    }

    /// Get a reference to the actuator
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Get a mutable reference to the actuator
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    fn enqueue(&mut self, cmd: &str, now_ms: u64) -> Result<SubmitStatus, A::Error> {
        match self.queue.enqueue(cmd) {
            Ok(()) => {}
            Err(QueueError::Full) => {
                tracing::warn!(command = cmd, "command queue full");
                return Ok(SubmitStatus::QueueFull);
            }
            Err(QueueError::CommandTooLong) => {
                tracing::warn!(len = cmd.len(), "command too long to queue");
                return Ok(SubmitStatus::BadCommand);
            }
            Err(err @ QueueError::SlotOccupied(_)) => {
                tracing::warn!(%err, "command queue inconsistent");
                return Ok(SubmitStatus::Unknown);
            }
        }

        if self.drive.running {
            Ok(SubmitStatus::Queued)
        } else {
            self.run_next(now_ms)
        }
    }

    fn run_next(&mut self, now_ms: u64) -> Result<SubmitStatus, A::Error> {
        Ok(self.run_front(now_ms)?.unwrap_or(SubmitStatus::NoCommand))
    }

    /// Run the oldest pending command. It leaves the queue only once the
    /// actuator accepted it (or it failed to parse).
    fn run_front(&mut self, now_ms: u64) -> Result<Option<SubmitStatus>, A::Error> {
        let Some(raw) = self
            .queue
            .peek()
            .and_then(|cmd| RawCommand::try_from(cmd).ok())
        else {
            return Ok(None);
        };
        let status = self.run(&raw, now_ms)?;
        self.queue.dequeue();
        Ok(Some(status))
    }

    fn run(&mut self, cmd: &str, now_ms: u64) -> Result<SubmitStatus, A::Error> {
        let outcome = execute_raw(
            cmd,
            &self.defaults,
            &mut self.actuator,
            &mut self.drive,
            now_ms,
        )?;
        Ok(match outcome {
            ExecutionOutcome::Ran => SubmitStatus::Ran,
            ExecutionOutcome::BadCommand => SubmitStatus::BadCommand,
        })
    }

    fn halt(&mut self, now_ms: u64) -> Result<(), A::Error> {
        execute(
            &MotionDirective::stop(),
            &mut self.actuator,
            &mut self.drive,
            now_ms,
        )?;
        self.drive.running = false;
        self.drive.current = None;
        Ok(())
    }
}
