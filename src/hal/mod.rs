//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `irsend`: LIRC `irsend` process transmitter
//! - `sysfs`: Linux sysfs GPIO inputs (requires `gpio` feature)

pub mod irsend;
pub mod mock;

#[cfg(feature = "gpio")]
pub mod sysfs;

pub use irsend::*;
pub use mock::*;

#[cfg(feature = "gpio")]
pub use sysfs::*;
