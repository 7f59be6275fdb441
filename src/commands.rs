//! Command validation and IR token encoding.
//!
//! This module is the contract between untrusted request parameters and the
//! LIRC `irsend` tool. Raw strings enter through [`validate_channel`] and
//! [`validate_speed`]; only the resulting [`Channel`] and [`Speed`] values can
//! reach the encoder, so every [`CommandToken`] produced here is well formed.
//!
//! # Token Grammar
//!
//! | Command | Token |
//! |---------|-------|
//! | Forward / zero speed | `<channel>_<speed>` |
//! | Reverse speed | `<channel>_M<abs(speed)>` |
//! | Brake | `<channel>_BRAKE` |
//!
//! # Example
//!
//! ```rust
//! use ir_trainz::commands::{encode_speed, encode_stop, validate_channel, validate_speed};
//!
//! let channel = validate_channel("2R").unwrap();
//! let speed = validate_speed("-3").unwrap();
//!
//! assert_eq!(encode_speed(channel, speed), "2R_M3");
//! assert_eq!(encode_stop(channel), "2R_BRAKE");
//! ```

use alloc::string::String;
use core::fmt::{self, Write};
use core::str::FromStr;

use heapless::String as HString;

// ============================================================================
// Channel
// ============================================================================

/// Output circuit addressed by an IR command.
///
/// A LEGO Power Functions receiver listens on one of four channels and has a
/// blue and a red output. The set is closed: these four tokens are the only
/// channels the IR remote definition knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    /// Channel 1, blue output.
    #[cfg_attr(feature = "serde", serde(rename = "1B"))]
    OneB,
    /// Channel 2, blue output.
    #[cfg_attr(feature = "serde", serde(rename = "2B"))]
    TwoB,
    /// Channel 1, red output.
    #[cfg_attr(feature = "serde", serde(rename = "1R"))]
    OneR,
    /// Channel 2, red output.
    #[cfg_attr(feature = "serde", serde(rename = "2R"))]
    TwoR,
}

impl Channel {
    /// Every legal channel, in wire order.
    pub const ALL: [Channel; 4] = [Channel::OneB, Channel::TwoB, Channel::OneR, Channel::TwoR];

    /// Returns the wire token for this channel.
    ///
    /// ```
    /// use ir_trainz::Channel;
    ///
    /// assert_eq!(Channel::OneB.as_str(), "1B");
    /// assert_eq!(Channel::TwoR.as_str(), "2R");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Channel::OneB => "1B",
            Channel::TwoB => "2B",
            Channel::OneR => "1R",
            Channel::TwoR => "2R",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = InvalidChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_channel(s)
    }
}

// ============================================================================
// Speed
// ============================================================================

/// Signed throttle step in the range `-7..=7`.
///
/// The sign selects the direction (negative is reverse) and the magnitude the
/// PWM step. Zero is "float": no drive, but not braked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i8", into = "i8"))]
pub struct Speed(i8);

impl Speed {
    /// Full reverse.
    pub const MIN: i8 = -7;
    /// Full forward.
    pub const MAX: i8 = 7;

    /// Creates a speed, returning `None` outside `-7..=7`.
    ///
    /// ```
    /// use ir_trainz::Speed;
    ///
    /// assert!(Speed::new(7).is_some());
    /// assert!(Speed::new(-8).is_none());
    /// ```
    pub const fn new(value: i8) -> Option<Self> {
        if value >= Self::MIN && value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Signed value.
    #[inline]
    pub const fn value(&self) -> i8 {
        self.0
    }

    /// Throttle step without direction.
    #[inline]
    pub const fn magnitude(&self) -> u8 {
        self.0.unsigned_abs()
    }

    /// True for negative (reverse) speeds.
    #[inline]
    pub const fn is_reverse(&self) -> bool {
        self.0 < 0
    }
}

impl TryFrom<i8> for Speed {
    type Error = InvalidSpeedValue;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Speed::new(value).ok_or(InvalidSpeedValue(value))
    }
}

impl From<Speed> for i8 {
    fn from(speed: Speed) -> Self {
        speed.0
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Speed {
    type Err = InvalidSpeed;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_speed(s)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// A channel string outside the legal set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidChannel {
    /// The rejected input, verbatim.
    pub received: String,
}

impl fmt::Display for InvalidChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Not a valid channel ({})", self.received)
    }
}

/// A speed string that is not an integer in `-7..=7`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidSpeed {
    /// The rejected input, verbatim.
    pub received: String,
}

impl fmt::Display for InvalidSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Not a valid speed ({})", self.received)
    }
}

/// Out-of-range numeric speed (used by `TryFrom<i8>`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidSpeedValue(pub i8);

impl fmt::Display for InvalidSpeedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "speed {} outside {}..={}", self.0, Speed::MIN, Speed::MAX)
    }
}

/// First validation failure for a train request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandError {
    /// Channel was rejected.
    Channel(InvalidChannel),
    /// Speed was rejected (channel was valid).
    Speed(InvalidSpeed),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Channel(e) => fmt::Display::fmt(e, f),
            CommandError::Speed(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl From<InvalidChannel> for CommandError {
    fn from(e: InvalidChannel) -> Self {
        CommandError::Channel(e)
    }
}

impl From<InvalidSpeed> for CommandError {
    fn from(e: InvalidSpeed) -> Self {
        CommandError::Speed(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidChannel {}
#[cfg(feature = "std")]
impl std::error::Error for InvalidSpeed {}
#[cfg(feature = "std")]
impl std::error::Error for InvalidSpeedValue {}
#[cfg(feature = "std")]
impl std::error::Error for CommandError {}

// ============================================================================
// Validation
// ============================================================================

/// Accepts exactly `"1B"`, `"2B"`, `"1R"` or `"2R"`.
///
/// Matching is case-sensitive and the input is not trimmed.
pub fn validate_channel(input: &str) -> Result<Channel, InvalidChannel> {
    Channel::ALL
        .into_iter()
        .find(|c| c.as_str() == input)
        .ok_or_else(|| InvalidChannel {
            received: String::from(input),
        })
}

/// Accepts a base-10 integer in `-7..=7` with an optional leading `-`.
///
/// Empty input, whitespace, a `+` sign, fractions and any other stray
/// character are rejected, as is anything that overflows while parsing.
pub fn validate_speed(input: &str) -> Result<Speed, InvalidSpeed> {
    let invalid = || InvalidSpeed {
        received: String::from(input),
    };

    let digits = input.strip_prefix('-').unwrap_or(input);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    input
        .parse::<i32>()
        .ok()
        .and_then(|v| i8::try_from(v).ok())
        .and_then(Speed::new)
        .ok_or_else(invalid)
}

// ============================================================================
// Encoding
// ============================================================================

/// Maximum token length (`"1B_BRAKE"`).
pub const MAX_TOKEN_LEN: usize = 8;

/// Canonical `irsend` key name for one command.
///
/// Only produced by the encoder, so it is always one of the names in the
/// `LEGO_Single_Output` remote definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CommandToken(HString<MAX_TOKEN_LEN>);

impl CommandToken {
    /// The token text.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CommandToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CommandToken {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for CommandToken {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for CommandToken {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Encodes a drive command: `1B_5`, `2R_M3`, `1R_0`.
pub fn encode_speed(channel: Channel, speed: Speed) -> CommandToken {
    let mut token = HString::new();
    let marker = if speed.is_reverse() { "M" } else { "" };
    // At most 5 bytes, always fits.
    let _ = write!(token, "{}_{}{}", channel.as_str(), marker, speed.magnitude());
    CommandToken(token)
}

/// Encodes a brake command: `2B_BRAKE`.
///
/// Braking is a separate key from speed zero.
pub fn encode_stop(channel: Channel) -> CommandToken {
    let mut token = HString::new();
    let _ = token.push_str(channel.as_str());
    let _ = token.push_str("_BRAKE");
    CommandToken(token)
}

// ============================================================================
// Train Commands
// ============================================================================

/// A validated train request, ready to encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainCommand {
    /// Drive the output at a signed speed.
    SetSpeed {
        /// Target output.
        channel: Channel,
        /// Signed throttle step.
        speed: Speed,
    },
    /// Brake the output.
    Stop {
        /// Target output.
        channel: Channel,
    },
}

impl TrainCommand {
    /// Validates raw request parameters.
    ///
    /// The channel is checked first; a `None` speed means stop. The first
    /// failure is returned and the speed is not looked at after a bad channel.
    ///
    /// ```
    /// use ir_trainz::{TrainCommand, CommandError};
    ///
    /// let cmd = TrainCommand::from_request("1B", Some("5")).unwrap();
    /// assert_eq!(cmd.encode(), "1B_5");
    ///
    /// let err = TrainCommand::from_request("9X", Some("99")).unwrap_err();
    /// assert!(matches!(err, CommandError::Channel(_)));
    /// ```
    pub fn from_request(channel: &str, speed: Option<&str>) -> Result<Self, CommandError> {
        let channel = validate_channel(channel)?;
        match speed {
            Some(raw) => Ok(TrainCommand::SetSpeed {
                channel,
                speed: validate_speed(raw)?,
            }),
            None => Ok(TrainCommand::Stop { channel }),
        }
    }

    /// The addressed channel.
    pub fn channel(&self) -> Channel {
        match self {
            TrainCommand::SetSpeed { channel, .. } | TrainCommand::Stop { channel } => *channel,
        }
    }

    /// Encodes this command into its IR token.
    pub fn encode(&self) -> CommandToken {
        match *self {
            TrainCommand::SetSpeed { channel, speed } => encode_speed(channel, speed),
            TrainCommand::Stop { channel } => encode_stop(channel),
        }
    }
}
