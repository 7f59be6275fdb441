//! Input pin monitor.
//!
//! Drains an [`InputEvents`] source, logs every level change and stores the
//! last level per pin in the shared state.
//!
//! # Usage
//!
//! ```ignore
//! use ir_trainz::hal::SysfsInputs;
//! use ir_trainz::services::{spawn_pin_monitor, SharedState};
//!
//! let state = Arc::new(SharedState::new(transmitter));
//! let inputs = SysfsInputs::from_config(&config.gpio)?;
//! let monitor = spawn_pin_monitor(inputs, Arc::clone(&state));
//! ```

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::traits::{InputEvents, Transmitter};

use super::shared::SharedState;

/// Forwards pin events from a source into shared state.
pub struct PinMonitor<T: Transmitter, I: InputEvents> {
    state: Arc<SharedState<T>>,
    source: I,
    seen: u64,
}

impl<T: Transmitter, I: InputEvents> PinMonitor<T, I> {
    /// Create a monitor reading from `source`.
    pub fn new(state: Arc<SharedState<T>>, source: I) -> Self {
        Self {
            state,
            source,
            seen: 0,
        }
    }

    /// Handle one event. Returns false once the source is exhausted.
    ///
    /// Blocks until the source produces an event.
    pub fn poll(&mut self) -> bool {
        let Some(event) = self.source.next_event() else {
            return false;
        };
        log::info!("pin {} value is now {}", event.pin, event.value);
        self.state.record_pin(event);
        self.seen += 1;
        true
    }

    /// Handle events until the source is exhausted.
    ///
    /// Returns the number of events handled.
    pub fn run(mut self) -> u64 {
        while self.poll() {}
        log::info!("pin monitor stopped after {} events", self.seen);
        self.seen
    }

    /// Events handled so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }
}

/// Run `source` on a blocking thread, recording its events in `state`.
///
/// The task ends when the source returns `None`; its output is the number
/// of events handled.
pub fn spawn_pin_monitor<T, I>(source: I, state: Arc<SharedState<T>>) -> JoinHandle<u64>
where
    T: Transmitter + 'static,
    I: InputEvents,
{
    tokio::task::spawn_blocking(move || PinMonitor::new(state, source).run())
}
