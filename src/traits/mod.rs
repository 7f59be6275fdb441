//! Trait definitions for the hardware boundaries.
//!
//! The command core is pure; everything with side effects sits behind one of
//! these traits so the HTTP service can be tested without an IR blaster or
//! GPIO header attached.
//!
//! # Submodules
//!
//! - `transmitter`: IR token sink with one-shot delivery notification
//! - `inputs`: blocking source of GPIO edge events

pub mod inputs;
pub mod transmitter;

pub use inputs::*;
pub use transmitter::*;
