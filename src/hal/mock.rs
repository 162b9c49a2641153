//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for the hardware and network traits,
//! enabling development and testing on desktop without a motor shield or
//! a broker.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockActuator`] | [`Actuator`] | Records every drive/stop call |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//! | [`MockMqtt`] | [`MqttClient`] | Captures pub/sub operations |
//!
//! # Example
//!
//! ```rust
//! use rover_dispatch::{Dispatcher, SubmitStatus};
//! use rover_dispatch::hal::MockActuator;
//! use rover_dispatch::traits::MotorSide;
//!
//! let mut dispatcher: Dispatcher<MockActuator> = Dispatcher::new(MockActuator::new());
//! assert_eq!(dispatcher.submit("forward-2-50", 0).unwrap(), SubmitStatus::Ran);
//!
//! let left = dispatcher.actuator().side(MotorSide::Left);
//! assert!(left.is_some());
//! ```
//!
//! [`Actuator`]: crate::traits::Actuator
//! [`Clock`]: crate::traits::Clock
//! [`MqttClient`]: crate::traits::MqttClient

extern crate alloc;
use alloc::string::String;
use core::cell::Cell;
use alloc::vec::Vec;

use crate::traits::{Actuator, Clock, MotorDirection, MotorSide, MqttClient, MqttMessage};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// One call made against a [`MockActuator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActuatorCall {
    /// `drive(side, direction, speed)`
    Drive(MotorSide, MotorDirection, u8),
    /// `stop(side)`
    Stop(MotorSide),
}

/// Mock motor actuator for testing.
///
/// Records every call in order and keeps the resulting per-side state.
/// Use the public fields to inspect what the dispatcher did.
///
/// # Example
///
/// ```rust
/// use rover_dispatch::hal::{ActuatorCall, MockActuator};
/// use rover_dispatch::traits::{Actuator, MotorDirection, MotorSide};
///
/// let mut actuator = MockActuator::new();
/// actuator.drive(MotorSide::Left, MotorDirection::Backward, 40).unwrap();
///
/// assert_eq!(actuator.left, Some((MotorDirection::Backward, 40)));
/// assert_eq!(actuator.right, None);
/// assert_eq!(
///     actuator.calls,
///     [ActuatorCall::Drive(MotorSide::Left, MotorDirection::Backward, 40)]
/// );
/// ```
#[derive(Debug, Default)]
pub struct MockActuator {
    /// Every call, oldest first.
    pub calls: Vec<ActuatorCall>,
    /// Left motor state; `None` when stopped.
    pub left: Option<(MotorDirection, u8)>,
    /// Right motor state; `None` when stopped.
    pub right: Option<(MotorDirection, u8)>,
    /// When set, every call fails without being recorded.
    pub fail: bool,
    /// When set, `drive` on this side fails; stops still succeed.
    pub fail_drive: Option<MotorSide>,
}

impl MockActuator {
    /// Creates a new mock actuator with both motors stopped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock actuator whose calls all fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Creates a mock actuator that cannot drive `side` but can stop it.
    pub fn failing_side(side: MotorSide) -> Self {
        Self {
            fail_drive: Some(side),
            ..Self::default()
        }
    }

    /// Current state of one side.
    pub fn side(&self, side: MotorSide) -> Option<(MotorDirection, u8)> {
        match side {
            MotorSide::Left => self.left,
            MotorSide::Right => self.right,
        }
    }

    /// True when both motors are stopped.
    pub fn is_stopped(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Number of `stop` calls made for `side`.
    pub fn stop_count(&self, side: MotorSide) -> usize {
        self.calls
            .iter()
            .filter(|call| **call == ActuatorCall::Stop(side))
            .count()
    }

    /// The most recent call, if any.
    pub fn last_call(&self) -> Option<&ActuatorCall> {
        self.calls.last()
    }

    fn slot(&mut self, side: MotorSide) -> &mut Option<(MotorDirection, u8)> {
        match side {
            MotorSide::Left => &mut self.left,
            MotorSide::Right => &mut self.right,
        }
    }
}

impl Actuator for MockActuator {
    type Error = ();

    fn drive(&mut self, side: MotorSide, direction: MotorDirection, speed: u8) -> Result<(), ()> {
        if self.fail || self.fail_drive == Some(side) {
            return Err(());
        }
        *self.slot(side) = Some((direction, speed));
        self.calls.push(ActuatorCall::Drive(side, direction, speed));
        Ok(())
    }

    fn stop(&mut self, side: MotorSide) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        *self.slot(side) = None;
        self.calls.push(ActuatorCall::Stop(side));
        Ok(())
    }
}

/// Mock clock for testing.
///
/// Provides a controllable time source for testing time-dependent behavior.
/// Time moves through a shared reference, so a borrowed clock can be handed
/// to a consumer and still be advanced by the test.
///
/// # Example
///
/// ```rust
/// use rover_dispatch::hal::MockClock;
/// use rover_dispatch::traits::Clock;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.set(1000);
/// assert_eq!(clock.now_ms(), 1000);
///
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_ms: Cell<u64>,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self {
            current_ms: Cell::new(0),
        }
    }

    /// Sets the current time in milliseconds.
    pub fn set(&self, ms: u64) {
        self.current_ms.set(ms);
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, ms: u64) {
        self.current_ms.set(self.current_ms.get() + ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms.get()
    }
}

// ============================================================================
// Network Mocks
// ============================================================================

/// Mock MQTT client for testing.
///
/// Records all publish/subscribe operations and allows injecting
/// incoming messages for testing message handling.
///
/// # Example
///
/// ```rust
/// use rover_dispatch::hal::MockMqtt;
///
/// let mut mqtt = MockMqtt::new();
///
/// // Queue incoming message
/// mqtt.queue_message("rover/command", b"forward-2".to_vec());
///
/// // Check subscriptions
/// mqtt.subscriptions.push("rover/command".into());
/// assert!(mqtt.is_subscribed("rover/command"));
///
/// // Check published messages
/// mqtt.published.push(("rover/status".into(), b"1".to_vec(), false));
/// assert_eq!(mqtt.published_to("rover/status").len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockMqtt {
    /// Messages that have been published (topic, payload, retain).
    pub published: Vec<(String, Vec<u8>, bool)>,
    /// Topics that have been subscribed to.
    pub subscriptions: Vec<String>,
    /// Queue of incoming messages to be returned by `try_recv()`.
    pub incoming: Vec<MqttMessage>,
    /// Whether the client is connected.
    pub connected: bool,
}

impl MockMqtt {
    /// Creates a new mock MQTT client in connected state.
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Default::default()
        }
    }

    /// Queue an incoming message
    pub fn queue_message(&mut self, topic: impl Into<String>, payload: impl Into<Vec<u8>>) {
        self.incoming.push(MqttMessage::new(topic, payload));
    }

    /// Check if a topic was subscribed to
    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.subscriptions.iter().any(|t| t == topic)
    }

    /// Get published messages for a topic
    pub fn published_to(&self, topic: &str) -> Vec<&(String, Vec<u8>, bool)> {
        self.published
            .iter()
            .filter(|(t, _, _)| t == topic)
            .collect()
    }
}

impl MqttClient for MockMqtt {
    type Error = ();

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), ()> {
        if !self.connected {
            return Err(());
        }
        self.published.push((topic.into(), payload.to_vec(), retain));
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), ()> {
        self.subscriptions.push(topic.into());
        Ok(())
    }

    fn try_recv(&mut self) -> Option<MqttMessage> {
        if self.incoming.is_empty() {
            None
        } else {
            Some(self.incoming.remove(0))
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

// ============================================================================
// Tests
// ============================================================================
