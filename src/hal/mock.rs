//! Mock implementations for testing without hardware.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockTransmitter`] | [`Transmitter`] | Records tokens, scripted outcome |
//! | [`MockInputs`] | [`InputEvents`] | Queued pin events |
//!
//! # Example
//!
//! ```rust
//! use ir_trainz::commands::{encode_speed, Channel, Speed};
//! use ir_trainz::hal::MockTransmitter;
//! use ir_trainz::traits::Transmitter;
//!
//! let tx = MockTransmitter::new();
//! let _delivery = tx.send(encode_speed(Channel::TwoB, Speed::new(7).unwrap()));
//!
//! assert_eq!(tx.call_count(), 1);
//! assert_eq!(tx.last().unwrap(), "2B_7");
//! ```
//!
//! [`Transmitter`]: crate::traits::Transmitter
//! [`InputEvents`]: crate::traits::InputEvents

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::commands::CommandToken;
use crate::traits::{
    Delivery, DeliverySender, InputEvents, PinEvent, TransmitError, TransmitResult, Transmitter,
};

// ============================================================================
// Transmitter Mock
// ============================================================================

/// How a [`MockTransmitter`] resolves each delivery.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MockOutcome {
    /// Every send succeeds immediately.
    #[default]
    Succeed,
    /// Every send fails immediately with this error.
    Fail(TransmitError),
    /// Sends stay in flight until [`MockTransmitter::complete_pending`].
    Hold,
}

/// Mock transmitter that records every token it is given.
#[derive(Debug, Default)]
pub struct MockTransmitter {
    outcome: MockOutcome,
    sent: Mutex<Vec<CommandToken>>,
    held: Mutex<Vec<DeliverySender>>,
}

impl MockTransmitter {
    /// Creates a mock whose sends always succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock whose sends always fail with `err`.
    pub fn failing(err: TransmitError) -> Self {
        Self {
            outcome: MockOutcome::Fail(err),
            ..Self::default()
        }
    }

    /// Creates a mock whose sends never complete on their own.
    pub fn holding() -> Self {
        Self {
            outcome: MockOutcome::Hold,
            ..Self::default()
        }
    }

    /// Tokens sent so far, oldest first.
    pub fn tokens(&self) -> Vec<CommandToken> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Tokens sent so far as plain strings.
    pub fn sent(&self) -> Vec<String> {
        self.tokens().iter().map(|t| t.to_string()).collect()
    }

    /// Most recent token, if any.
    pub fn last(&self) -> Option<CommandToken> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Number of `send` calls.
    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Resolves every held delivery with `result`. Returns how many were held.
    pub fn complete_pending(&self, result: TransmitResult) -> usize {
        let held: Vec<_> = self
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        let count = held.len();
        for tx in held {
            let _ = tx.send(result.clone());
        }
        count
    }

    /// Drops every held delivery without reporting.
    pub fn abandon_pending(&self) -> usize {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        let count = held.len();
        held.clear();
        count
    }
}

impl Transmitter for MockTransmitter {
    fn send(&self, token: CommandToken) -> Delivery {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(token);

        match &self.outcome {
            MockOutcome::Succeed => Delivery::ready(Ok(())),
            MockOutcome::Fail(err) => Delivery::ready(Err(err.clone())),
            MockOutcome::Hold => {
                let (tx, delivery) = Delivery::channel();
                self.held
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(tx);
                delivery
            }
        }
    }
}

// ============================================================================
// Input Mock
// ============================================================================

/// Mock pin source that replays queued events and then ends.
#[derive(Debug, Default)]
pub struct MockInputs {
    /// Events still to be returned.
    pub queue: VecDeque<PinEvent>,
}

impl MockInputs {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an event.
    pub fn with_event(mut self, pin: u64, value: u8) -> Self {
        self.queue.push_back(PinEvent::new(pin, value));
        self
    }
}

impl InputEvents for MockInputs {
    fn next_event(&mut self) -> Option<PinEvent> {
        self.queue.pop_front()
    }
}
