//! Command vocabulary for the dispatcher.
//!
//! This module defines the typed forms a raw command string turns into:
//!
//! - [`Direction`]: the five motion verbs (`forward`, `back`, `left`, `right`, `stop`)
//! - [`MotionDirective`]: a validated direction + duration + speed
//! - [`AdminCommand`]: control-plane instructions (`*c`, `*x`, `*n`)
//! - [`SubmitStatus`]: the small signed status code returned to transports
//!
//! # Wire Format
//!
//! ```text
//! ['@' <handle> ' ']? ['*' <admin-tag> | '!'? <direction> ['-' <duration> ['-' <speed>]]]
//! ```
//!
//! ```rust
//! use rover_dispatch::{Direction, MotionDirective};
//!
//! let directive = MotionDirective::new(Direction::Forward, 5, 100);
//! assert_eq!(directive.duration_ms(), 5000);
//! assert!(directive.is_motion());
//! ```

use crate::traits::{MotorDirection, MotorSide};

/// Largest accepted duration in seconds and largest speed percentage.
pub const MAX_FIELD_VALUE: u8 = 100;

/// Duration used when a command omits it (seconds).
pub const DEFAULT_DURATION_S: u8 = 1;

/// Speed used when a command omits it (percent).
pub const DEFAULT_SPEED: u8 = 25;

// ============================================================================
// Direction
// ============================================================================

/// Direction of robot motion.
///
/// # Default
///
/// Defaults to [`Stop`](Self::Stop) for safety.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Both wheels forward.
    Forward,
    /// Both wheels backward.
    Back,
    /// Spin left in place (left wheel back, right wheel forward).
    Left,
    /// Spin right in place (left wheel forward, right wheel back).
    Right,
    /// Both wheels stopped.
    #[default]
    Stop,
}

impl Direction {
    /// Returns the direction as its lowercase wire token.
    ///
    /// # Examples
    ///
    /// ```
    /// use rover_dispatch::Direction;
    ///
    /// assert_eq!(Direction::Forward.as_str(), "forward");
    /// assert_eq!(Direction::Back.as_str(), "back");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Back => "back",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Stop => "stop",
        }
    }

    /// Parse a direction token, case-insensitively.
    ///
    /// Only the five exact tokens are accepted; surrounding whitespace is
    /// not trimmed here because the tokenizer has already done so.
    ///
    /// ```
    /// use rover_dispatch::Direction;
    ///
    /// assert_eq!(Direction::from_token("FORWARD"), Some(Direction::Forward));
    /// assert_eq!(Direction::from_token("Stop"), Some(Direction::Stop));
    /// assert_eq!(Direction::from_token("backward"), None);
    /// ```
    pub fn from_token(token: &str) -> Option<Self> {
        [
            Direction::Forward,
            Direction::Back,
            Direction::Left,
            Direction::Right,
            Direction::Stop,
        ]
        .into_iter()
        .find(|dir| token.eq_ignore_ascii_case(dir.as_str()))
    }

    /// Per-side motor command for this direction.
    ///
    /// Returns `None` for [`Stop`](Self::Stop), meaning the side is stopped
    /// rather than driven.
    pub const fn side_command(&self, side: MotorSide) -> Option<MotorDirection> {
        use MotorDirection::{Backward, Forward};
        match (self, side) {
            (Direction::Forward, _) => Some(Forward),
            (Direction::Back, _) => Some(Backward),
            (Direction::Left, MotorSide::Left) => Some(Backward),
            (Direction::Left, MotorSide::Right) => Some(Forward),
            (Direction::Right, MotorSide::Left) => Some(Forward),
            (Direction::Right, MotorSide::Right) => Some(Backward),
            (Direction::Stop, _) => None,
        }
    }
}

// ============================================================================
// Motion Directive
// ============================================================================

/// A validated motion command.
///
/// Fields are private so a directive cannot be altered after construction;
/// values above [`MAX_FIELD_VALUE`] are clamped by [`new`](Self::new).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "DirectiveFields"))]
pub struct MotionDirective {
    direction: Direction,
    duration_s: u8,
    speed: u8,
}

/// Deserialized form of [`MotionDirective`], clamped on conversion.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct DirectiveFields {
    direction: Direction,
    duration_s: u8,
    speed: u8,
}

#[cfg(feature = "serde")]
impl From<DirectiveFields> for MotionDirective {
    fn from(fields: DirectiveFields) -> Self {
        Self::new(fields.direction, fields.duration_s, fields.speed)
    }
}

impl MotionDirective {
    /// Build a directive, clamping duration and speed to `0..=100`.
    pub const fn new(direction: Direction, duration_s: u8, speed: u8) -> Self {
        Self {
            direction,
            duration_s: clamp_field(duration_s),
            speed: clamp_field(speed),
        }
    }

    /// A stop directive with no timer.
    ///
    /// Used for the implicit stop at the end of the queue and by reset.
    pub const fn stop() -> Self {
        Self::new(Direction::Stop, 0, 0)
    }

    /// Direction of motion.
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Duration in seconds (0 = run until replaced or stopped).
    pub const fn duration_s(&self) -> u8 {
        self.duration_s
    }

    /// Speed percentage.
    pub const fn speed(&self) -> u8 {
        self.speed
    }

    /// Duration in milliseconds, as armed on the timer.
    pub const fn duration_ms(&self) -> u32 {
        self.duration_s as u32 * 1000
    }

    /// True for every direction except [`Direction::Stop`].
    pub const fn is_motion(&self) -> bool {
        !matches!(self.direction, Direction::Stop)
    }
}

const fn clamp_field(value: u8) -> u8 {
    if value > MAX_FIELD_VALUE {
        MAX_FIELD_VALUE
    } else {
        value
    }
}

// ============================================================================
// Admin Commands
// ============================================================================

/// Control-plane instruction, sent as `*<tag>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AdminCommand {
    /// `c` - empty the queue; the active directive keeps running.
    Clear,
    /// `x` - stop both motors, empty the queue, go idle.
    Reset,
    /// `n` - run the next queued command now, ignoring the timer.
    Next,
}

impl AdminCommand {
    /// Map a single-character tag to an admin command.
    ///
    /// Tags are case-sensitive, as on the wire.
    pub const fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'c' => Some(AdminCommand::Clear),
            'x' => Some(AdminCommand::Reset),
            'n' => Some(AdminCommand::Next),
            _ => None,
        }
    }

    /// The wire tag for this command.
    pub const fn tag(&self) -> char {
        match self {
            AdminCommand::Clear => 'c',
            AdminCommand::Reset => 'x',
            AdminCommand::Next => 'n',
        }
    }
}

// ============================================================================
// Status Codes
// ============================================================================

/// Result of a submission, as returned to the transport.
///
/// Negative codes are errors and positive codes are successes, so the value
/// can travel over channels that only carry a small integer.
///
/// ```rust
/// use rover_dispatch::SubmitStatus;
///
/// assert_eq!(SubmitStatus::Queued.code(), 2);
/// assert_eq!(i8::from(SubmitStatus::QueueFull), -2);
/// assert_eq!(SubmitStatus::try_from(-4), Ok(SubmitStatus::BadCommand));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(i8)]
pub enum SubmitStatus {
    /// Catch-all failure (actuator error, unknown admin tag, internal fault).
    Unknown = -1,
    /// The queue is at capacity; the command was dropped.
    QueueFull = -2,
    /// An advance was forced with nothing queued.
    NoCommand = -3,
    /// The command could not be parsed.
    BadCommand = -4,
    /// A directive was executed.
    Ran = 1,
    /// The command was queued behind the active directive.
    Queued = 2,
}

impl SubmitStatus {
    /// The integer code sent back to the transport.
    #[inline]
    pub const fn code(self) -> i8 {
        self as i8
    }

    /// True for the positive codes.
    #[inline]
    pub const fn is_success(self) -> bool {
        self.code() > 0
    }

    /// Short snake_case name for logs and JSON.
    pub const fn as_str(self) -> &'static str {
        match self {
            SubmitStatus::Unknown => "unknown",
            SubmitStatus::QueueFull => "queue_full",
            SubmitStatus::NoCommand => "no_command",
            SubmitStatus::BadCommand => "bad_command",
            SubmitStatus::Ran => "ran",
            SubmitStatus::Queued => "queued",
        }
    }
}

impl From<SubmitStatus> for i8 {
    fn from(status: SubmitStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i8> for SubmitStatus {
    type Error = i8;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(SubmitStatus::Unknown),
            -2 => Ok(SubmitStatus::QueueFull),
            -3 => Ok(SubmitStatus::NoCommand),
            -4 => Ok(SubmitStatus::BadCommand),
            1 => Ok(SubmitStatus::Ran),
            2 => Ok(SubmitStatus::Queued),
            other => Err(other),
        }
    }
}
