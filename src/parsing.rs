//! Raw command string parsing.
//!
//! Two stages, both pure:
//!
//! 1. [`classify`] strips an optional `@handle ` mention prefix and sorts the
//!    submission into admin (`*`), immediate (`!`) or queued.
//! 2. [`parse_directive`] turns `<direction>[-<duration>[-<speed>]]` into a
//!    [`MotionDirective`]. The dispatcher calls this only when a command is
//!    about to run, so queued entries stay as raw text until then.
//!
//! # Permissive numbers
//!
//! Numeric fields keep the firmware's forgiving behavior: the leading
//! digits are used, anything unparseable counts as `0`, and values above
//! 100 are clamped. `"forward-x-50"` therefore runs forward with no timer.
//!
//! ```rust
//! use rover_dispatch::parsing::{classify, parse_directive, Submission};
//! use rover_dispatch::{AdminCommand, Direction};
//!
//! let d = parse_directive("left-5").unwrap();
//! assert_eq!(d.direction(), Direction::Left);
//! assert_eq!(d.duration_s(), 5);
//! assert_eq!(d.speed(), 25);
//!
//! assert_eq!(classify("@rover !stop"), Submission::Immediate("stop"));
//! assert_eq!(classify("*x"), Submission::Admin(Some(AdminCommand::Reset)));
//! ```

use crate::commands::{
    AdminCommand, Direction, MotionDirective, DEFAULT_DURATION_S, DEFAULT_SPEED, MAX_FIELD_VALUE,
};

/// Field separator in a motion command.
pub const FIELD_SEPARATOR: char = '-';

/// Errors produced while parsing a motion command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The leading token is not one of forward/back/left/right/stop.
    #[error("unknown direction")]
    UnknownDirection,
}

/// Values used when a command omits its duration or speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandDefaults {
    /// Duration in seconds when the field is absent.
    pub duration_s: u8,
    /// Speed percentage when the field is absent.
    pub speed: u8,
}

impl Default for CommandDefaults {
    fn default() -> Self {
        Self {
            duration_s: DEFAULT_DURATION_S,
            speed: DEFAULT_SPEED,
        }
    }
}

/// How a raw submission should be handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Submission<'a> {
    /// `*<tag>`; `None` when the tag is missing or unrecognized.
    Admin(Option<AdminCommand>),
    /// `!<command>`; bypasses the queue.
    Immediate(&'a str),
    /// Anything else; goes through the queue.
    Queued(&'a str),
}

/// Remove a leading `@handle ` mention.
///
/// Everything up to and including the first space is dropped. A mention
/// with no space is returned unchanged and will later fail to parse.
pub fn strip_mention(raw: &str) -> &str {
    if !raw.starts_with('@') {
        return raw;
    }
    match raw.split_once(' ') {
        Some((_, rest)) => rest,
        None => raw,
    }
}

/// Sort a raw submission into admin, immediate or queued.
pub fn classify(raw: &str) -> Submission<'_> {
    let cmd = strip_mention(raw).trim();

    if let Some(tag) = cmd.strip_prefix('*') {
        return Submission::Admin(tag.chars().next().and_then(AdminCommand::from_tag));
    }

    match cmd.strip_prefix('!') {
        Some(rest) => Submission::Immediate(rest),
        None => Submission::Queued(cmd),
    }
}

/// Parse a motion command with the stock defaults (1 s, speed 25).
pub fn parse_directive(raw: &str) -> Result<MotionDirective, ParseError> {
    parse_directive_with(raw, &CommandDefaults::default())
}

/// Parse a motion command, filling absent fields from `defaults`.
pub fn parse_directive_with(
    raw: &str,
    defaults: &CommandDefaults,
) -> Result<MotionDirective, ParseError> {
    let mut fields = raw.trim().splitn(3, FIELD_SEPARATOR);

    let direction = fields
        .next()
        .and_then(Direction::from_token)
        .ok_or(ParseError::UnknownDirection)?;

    let duration_s = fields.next().map_or(defaults.duration_s, leading_number);
    let speed = fields.next().map_or(defaults.speed, leading_number);

    Ok(MotionDirective::new(direction, duration_s, speed))
}

/// Value of the leading ASCII digits of `field`, clamped to 100.
///
/// Returns 0 when the field does not start with a digit.
fn leading_number(field: &str) -> u8 {
    let value = field
        .trim_start()
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |acc, digit| {
            (acc * 10 + u32::from(digit - b'0')).min(u32::from(MAX_FIELD_VALUE) + 1)
        });
    value.min(u32::from(MAX_FIELD_VALUE)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // parse_directive
    // =========================================================================

    #[test]
    fn parse_direction_only_uses_defaults() {
        let d = parse_directive("forward").unwrap();
        assert_eq!(d.direction(), Direction::Forward);
        assert_eq!(d.duration_s(), 1);
        assert_eq!(d.speed(), 25);
    }

    #[test]
    fn parse_stop_defaults() {
        let d = parse_directive("stop").unwrap();
        assert_eq!(d.direction(), Direction::Stop);
        assert_eq!(d.duration_s(), 1);
        assert_eq!(d.speed(), 25);
    }

    #[test]
    fn parse_direction_and_duration() {
        let d = parse_directive("left-5").unwrap();
        assert_eq!(d.direction(), Direction::Left);
        assert_eq!(d.duration_s(), 5);
        assert_eq!(d.speed(), 25);
    }

    #[test]
    fn parse_all_fields() {
        let d = parse_directive("right-10-80").unwrap();
        assert_eq!(d.direction(), Direction::Right);
        assert_eq!(d.duration_s(), 10);
        assert_eq!(d.speed(), 80);
    }

    #[test]
    fn parse_case_insensitive_direction() {
        assert_eq!(
            parse_directive("BACK-2").unwrap().direction(),
            Direction::Back
        );
    }

    #[test]
    fn parse_trims_whitespace() {
        let d = parse_directive("  forward-3-40 \n").unwrap();
        assert_eq!(d.duration_s(), 3);
        assert_eq!(d.speed(), 40);
    }

    #[test]
    fn parse_unknown_direction() {
        assert_eq!(parse_directive("sideways-1"), Err(ParseError::UnknownDirection));
        assert_eq!(parse_directive(""), Err(ParseError::UnknownDirection));
        assert_eq!(parse_directive("-5-5"), Err(ParseError::UnknownDirection));
    }

    #[test]
    fn parse_non_numeric_fields_become_zero() {
        let d = parse_directive("forward-abc-xyz").unwrap();
        assert_eq!(d.duration_s(), 0);
        assert_eq!(d.speed(), 0);
    }

    #[test]
    fn parse_empty_fields_become_zero() {
        let d = parse_directive("forward-").unwrap();
        assert_eq!(d.duration_s(), 0);
        assert_eq!(d.speed(), 25);

        let d = parse_directive("forward-2-").unwrap();
        assert_eq!(d.duration_s(), 2);
        assert_eq!(d.speed(), 0);
    }

    #[test]
    fn parse_uses_leading_digits() {
        let d = parse_directive("forward-7s-50%").unwrap();
        assert_eq!(d.duration_s(), 7);
        assert_eq!(d.speed(), 50);
    }

    #[test]
    fn parse_extra_fields_ignored() {
        let d = parse_directive("forward-1-50-9").unwrap();
        assert_eq!(d.duration_s(), 1);
        assert_eq!(d.speed(), 50);
    }

    #[test]
    fn parse_clamps_large_values() {
        let d = parse_directive("forward-250-99999999999999").unwrap();
        assert_eq!(d.duration_s(), 100);
        assert_eq!(d.speed(), 100);
    }

    #[test]
    fn parse_with_custom_defaults() {
        let defaults = CommandDefaults {
            duration_s: 3,
            speed: 60,
        };
        let d = parse_directive_with("back", &defaults).unwrap();
        assert_eq!(d.duration_s(), 3);
        assert_eq!(d.speed(), 60);
    }

    // =========================================================================
    // classify / strip_mention
    // =========================================================================

    #[test]
    fn strip_mention_removes_handle() {
        assert_eq!(strip_mention("@egotweetcar forward-2"), "forward-2");
        assert_eq!(strip_mention("forward-2"), "forward-2");
    }

    #[test]
    fn strip_mention_without_space_is_unchanged() {
        assert_eq!(strip_mention("@handle"), "@handle");
    }

    #[test]
    fn classify_queued() {
        assert_eq!(classify("forward-2-50"), Submission::Queued("forward-2-50"));
        assert_eq!(classify("  left \r\n"), Submission::Queued("left"));
    }

    #[test]
    fn classify_immediate() {
        assert_eq!(classify("!forward-2-50"), Submission::Immediate("forward-2-50"));
        assert_eq!(classify("@bot !stop"), Submission::Immediate("stop"));
    }

    #[test]
    fn classify_admin() {
        assert_eq!(classify("*c"), Submission::Admin(Some(AdminCommand::Clear)));
        assert_eq!(classify("*x"), Submission::Admin(Some(AdminCommand::Reset)));
        assert_eq!(classify("*next"), Submission::Admin(Some(AdminCommand::Next)));
        assert_eq!(classify("@bot *n"), Submission::Admin(Some(AdminCommand::Next)));
    }

    #[test]
    fn classify_unknown_admin() {
        assert_eq!(classify("*z"), Submission::Admin(None));
        assert_eq!(classify("*"), Submission::Admin(None));
    }

    #[test]
    fn classify_empty_is_queued_empty() {
        assert_eq!(classify(""), Submission::Queued(""));
        assert_eq!(classify("@handle "), Submission::Queued(""));
    }
}
