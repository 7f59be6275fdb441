//! Input pin abstraction for edge events.
//!
//! The server watches two digital inputs and reports level changes. The pins
//! are unrelated to train commands; the events are logged and their last
//! level is kept for inspection.

/// A monitored pin changed level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinEvent {
    /// Pin number as understood by the event source.
    pub pin: u64,
    /// New level (0 or 1).
    pub value: u8,
}

impl PinEvent {
    /// Creates an event.
    pub const fn new(pin: u64, value: u8) -> Self {
        Self { pin, value }
    }
}

/// Blocking source of pin events.
///
/// `next_event` blocks until a pin changes and returns `None` once the source
/// is exhausted or has failed permanently. Run it on a blocking thread.
pub trait InputEvents: Send + 'static {
    /// Waits for the next pin change.
    fn next_event(&mut self) -> Option<PinEvent>;
}
