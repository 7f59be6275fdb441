//! # ir-trainz
//!
//! An HTTP to infrared bridge for LEGO Power Functions train receivers.
//!
//! Requests like `GET /api/train/2R/speed/-3` are validated, encoded into
//! LIRC button tokens (`2R_M3`) and handed to `irsend`. The server also
//! watches two GPIO inputs and reports their level changes.
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `commands` - Channel and speed validation, IR token encoding (no_std)
//! - `config` - Server configuration with environment overrides (no_std)
//! - `traits` - Transmitter and input event abstractions
//! - `hal` - Concrete implementations (`irsend`, sysfs GPIO, mocks)
//! - `services` - Shared state, pin monitor and the HTTP API
//!
//! ## Example
//!
//! ```rust
//! use ir_trainz::{TrainCommand, CommandError};
//!
//! let cmd = TrainCommand::from_request("2R", Some("-3")).unwrap();
//! assert_eq!(cmd.encode(), "2R_M3");
//!
//! let cmd = TrainCommand::from_request("1B", None).unwrap();
//! assert_eq!(cmd.encode(), "1B_BRAKE");
//!
//! let err = TrainCommand::from_request("1B", Some("8")).unwrap_err();
//! assert_eq!(err.to_string(), "Not a valid speed (8)");
//! assert!(matches!(err, CommandError::Speed(_)));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Channel and speed validation, and IR token encoding.
pub mod commands;

/// Server configuration.
pub mod config;

/// Hardware abstraction layer: `irsend`, sysfs GPIO and mocks.
#[cfg(feature = "std")]
pub mod hal;

/// Trait definitions for the transmitter and input boundaries.
#[cfg(feature = "std")]
pub mod traits;

/// Shared state, pin monitor and HTTP API.
#[cfg(feature = "std")]
pub mod services;

// Re-export main types at crate root
pub use commands::{
    encode_speed, encode_stop, validate_channel, validate_speed, Channel, CommandError,
    CommandToken, InvalidChannel, InvalidSpeed, InvalidSpeedValue, Speed, TrainCommand,
    MAX_TOKEN_LEN,
};

pub use config::{
    Config, ConfigError, DeliveryConfig, GpioConfig, IrConfig, WebConfig, DEFAULT_PORT,
};

#[cfg(feature = "std")]
pub use traits::{Delivery, InputEvents, PinEvent, TransmitError, Transmitter};
