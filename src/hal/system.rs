//! Desktop implementations backed by the standard library.

use std::time::Instant;

use crate::traits::{Actuator, Clock, MotorDirection, MotorSide};

/// Monotonic clock measuring from its own creation.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Creates a clock reading 0 now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Actuator for hosts without motors: every call becomes a log line.
///
/// ```rust
/// use rover_dispatch::hal::LogActuator;
/// use rover_dispatch::traits::{Actuator, MotorDirection, MotorSide};
///
/// let mut actuator = LogActuator::new("desk");
/// actuator.drive(MotorSide::Left, MotorDirection::Forward, 25).unwrap();
/// actuator.stop_all().unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct LogActuator {
    name: String,
}

impl LogActuator {
    /// Creates a logging actuator labelled `name` in its log output.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LogActuator {
    fn default() -> Self {
        Self::new("rover")
    }
}

impl Actuator for LogActuator {
    type Error = core::convert::Infallible;

    fn drive(
        &mut self,
        side: MotorSide,
        direction: MotorDirection,
        speed: u8,
    ) -> Result<(), Self::Error> {
        tracing::info!(
            device = %self.name,
            side = side.as_str(),
            direction = direction.as_str(),
            speed,
            "motor drive"
        );
        Ok(())
    }

    fn stop(&mut self, side: MotorSide) -> Result<(), Self::Error> {
        tracing::info!(device = %self.name, side = side.as_str(), "motor stop");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn log_actuator_never_fails() {
        let mut actuator = LogActuator::default();
        assert!(actuator
            .drive(MotorSide::Right, MotorDirection::Backward, 100)
            .is_ok());
        assert!(actuator.stop_all().is_ok());
    }
}
