//! Hardware abstraction traits for the drive motors and the time source.
//!
//! This module defines the hardware interfaces the dispatcher drives. The
//! robot has one motor per side; each side is commanded independently.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`Actuator`] | Per-side motor drive/stop |
//! | [`Clock`] | Monotonic millisecond time source |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. On a desktop host without motors,
//! [`LogActuator`](crate::hal::LogActuator) logs every call instead.
//!
//! # Example
//!
//! ```rust
//! use rover_dispatch::traits::{Actuator, MotorDirection, MotorSide};
//! use rover_dispatch::hal::MockActuator;
//!
//! let mut actuator = MockActuator::new();
//! actuator.drive(MotorSide::Left, MotorDirection::Forward, 50).unwrap();
//! actuator.stop(MotorSide::Right).unwrap();
//!
//! assert_eq!(actuator.calls.len(), 2);
//! ```

/// One side of the differential drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MotorSide {
    /// Left-hand motor.
    Left,
    /// Right-hand motor.
    Right,
}

impl MotorSide {
    /// Both sides, left first. Directives are applied in this order.
    pub const BOTH: [MotorSide; 2] = [MotorSide::Left, MotorSide::Right];

    /// Returns the side as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            MotorSide::Left => "left",
            MotorSide::Right => "right",
        }
    }
}

/// Spin direction of a single motor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MotorDirection {
    /// Wheel turns so the robot moves forward.
    Forward,
    /// Wheel turns so the robot moves backward.
    Backward,
}

impl MotorDirection {
    /// Returns the direction as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            MotorDirection::Forward => "forward",
            MotorDirection::Backward => "backward",
        }
    }
}

/// Motor actuator trait - abstracts the per-side motor driver.
///
/// Implement this trait for your motor shield. Calls are fire-and-forget
/// from the dispatcher's point of view: a returned error is propagated to
/// the caller, but no retry is attempted.
///
/// # Implementation Notes
///
/// - `speed` is a percentage in `0..=100`; clamp before mapping to PWM
/// - `stop` must be safe to call repeatedly
///
/// # Example Implementation
///
/// ```rust,ignore
/// use rover_dispatch::traits::{Actuator, MotorDirection, MotorSide};
///
/// struct MyShield { /* PWM + direction pins */ }
///
/// impl Actuator for MyShield {
///     type Error = ();
///
///     fn drive(&mut self, side: MotorSide, dir: MotorDirection, speed: u8) -> Result<(), ()> {
///         let duty = u16::from(speed.min(100)) * 255 / 100;
///         // Set direction pin and PWM duty for `side`...
///         Ok(())
///     }
///
///     fn stop(&mut self, side: MotorSide) -> Result<(), ()> {
///         // Zero PWM for `side`...
///         Ok(())
///     }
/// }
/// ```
pub trait Actuator {
    /// Error type for motor operations.
    type Error;

    /// Drive one side in the given direction at `speed` percent (0-100).
    fn drive(
        &mut self,
        side: MotorSide,
        direction: MotorDirection,
        speed: u8,
    ) -> Result<(), Self::Error>;

    /// Stop one side.
    fn stop(&mut self, side: MotorSide) -> Result<(), Self::Error>;

    /// Convenience method to stop both sides, left first.
    fn stop_all(&mut self) -> Result<(), Self::Error> {
        for side in MotorSide::BOTH {
            self.stop(side)?;
        }
        Ok(())
    }
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for directive timing.
/// On desktop, [`SystemClock`](crate::hal::SystemClock) wraps
/// `std::time::Instant`. On embedded, use a hardware timer.
///
/// # Example
///
/// ```rust
/// use rover_dispatch::traits::Clock;
/// use rover_dispatch::hal::MockClock;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
