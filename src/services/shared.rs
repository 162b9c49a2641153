//! Unified shared state for all dispatcher services.
//!
//! `SharedDispatcher` provides thread-safe access to a single [`Dispatcher`]
//! that is shared between the tick loop, the console, web and MQTT.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rover_dispatch::hal::MockActuator;
//! use rover_dispatch::services::SharedDispatcher;
//! use rover_dispatch::{Dispatcher, SubmitStatus};
//!
//! let shared = Arc::new(SharedDispatcher::new(Dispatcher::new(MockActuator::new())));
//!
//! // Transports submit raw strings
//! assert_eq!(shared.submit("forward-2-40"), SubmitStatus::Ran);
//!
//! // The host loop ticks
//! shared.tick().unwrap();
//!
//! // Change detection for MQTT publishing
//! assert!(shared.check_changes().is_some());
//! assert!(shared.check_changes().is_none());
//! ```

use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::hal::SystemClock;
use crate::traits::{Actuator, Clock};
use crate::{Dispatcher, DispatcherState, SubmitStatus, TickOutcome};

// ============================================================================
// Change Detection
// ============================================================================

/// Tracks last published state for change detection (used by MQTT publishing)
#[derive(Clone, Debug, Default)]
pub struct ChangeDetection {
    /// Last published state, with `elapsed_ms` zeroed
    pub last_state: Option<DispatcherState>,
}

impl ChangeDetection {
    /// Record `state` and report whether it differs from the last one.
    ///
    /// Elapsed time alone never counts as a change.
    pub fn update(&mut self, state: &DispatcherState) -> bool {
        let key = DispatcherState {
            elapsed_ms: 0,
            ..state.clone()
        };
        if self.last_state.as_ref() == Some(&key) {
            false
        } else {
            self.last_state = Some(key);
            true
        }
    }
}

// ============================================================================
// Shared Dispatcher
// ============================================================================

/// Unified shared state for all services (console, web, MQTT, tick loop).
///
/// # Thread Safety
///
/// - Uses `Mutex` for dispatcher access: every operation mutates, so a
///   `RwLock` would buy nothing.
/// - Change detection has a separate lock to minimize contention during MQTT publishes.
/// - Every timestamp comes from the one [`Clock`] `C`, shared by all services.
/// - A poisoned lock is recovered rather than propagated.
pub struct SharedDispatcher<A: Actuator, C: Clock = SystemClock> {
    dispatcher: Mutex<Dispatcher<A>>,
    clock: C,
    change_detection: Mutex<ChangeDetection>,
}

impl<A> SharedDispatcher<A>
where
    A: Actuator,
    A::Error: Debug,
{
    /// Create new shared state wrapping a dispatcher, timed by a
    /// [`SystemClock`] started now.
    pub fn new(dispatcher: Dispatcher<A>) -> Self {
        Self::with_clock(dispatcher, SystemClock::new())
    }
}

impl<A, C> SharedDispatcher<A, C>
where
    A: Actuator,
    A::Error: Debug,
    C: Clock,
{
    /// Create new shared state wrapping a dispatcher, timed by `clock`.
    pub fn with_clock(dispatcher: Dispatcher<A>, clock: C) -> Self {
        Self {
            dispatcher: Mutex::new(dispatcher),
            clock,
            change_detection: Mutex::new(ChangeDetection::default()),
        }
    }

    /// Current timestamp in milliseconds from the shared clock.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// The clock timing this dispatcher.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Access the dispatcher with a mutable lock.
    ///
    /// The closure pattern prevents accidentally holding the lock across await points.
    pub fn with_dispatcher<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Dispatcher<A>) -> R,
    {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Submit a raw command and return its status.
    ///
    /// An actuator failure is logged and reported as [`SubmitStatus::Unknown`].
    pub fn submit(&self, raw: &str) -> SubmitStatus {
        let now_ms = self.now_ms();
        match self.lock().submit(raw, now_ms) {
            Ok(status) => {
                tracing::debug!(raw, code = status.code(), "submission handled");
                status
            }
            Err(err) => {
                tracing::warn!(raw, error = ?err, "actuator error during submit");
                SubmitStatus::Unknown
            }
        }
    }

    /// Advance on expiry. Call this from the host loop.
    pub fn tick(&self) -> Result<TickOutcome, A::Error> {
        let now_ms = self.now_ms();
        self.lock().tick(now_ms)
    }

    /// Stop, clear the queue and go idle.
    pub fn reset(&self) -> SubmitStatus {
        let now_ms = self.now_ms();
        match self.lock().reset(now_ms) {
            Ok(()) => SubmitStatus::Ran,
            Err(err) => {
                tracing::warn!(error = ?err, "actuator error during reset");
                SubmitStatus::Unknown
            }
        }
    }

    /// Get a state snapshot.
    pub fn state(&self) -> DispatcherState {
        let now_ms = self.now_ms();
        self.lock().state(now_ms)
    }

    /// Pending raw commands, oldest first.
    pub fn pending(&self) -> Vec<String> {
        self.lock().pending().map(ToString::to_string).collect()
    }

    /// Check for state changes since last check and update detection state.
    ///
    /// Returns `Some(DispatcherState)` if anything other than elapsed time
    /// changed since the last call.
    pub fn check_changes(&self) -> Option<DispatcherState> {
        let state = self.state();
        let mut detection = self
            .change_detection
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        detection.update(&state).then_some(state)
    }

    /// Get current change detection values (for debugging/testing).
    pub fn change_detection_state(&self) -> ChangeDetection {
        self.change_detection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock(&self) -> MutexGuard<'_, Dispatcher<A>> {
        self.dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
