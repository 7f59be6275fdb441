//! Transmitter abstraction for handing encoded tokens to the IR hardware.
//!
//! A [`Transmitter`] accepts a [`CommandToken`] and returns immediately with a
//! [`Delivery`]: a one-shot notification that resolves once the underlying
//! transmission has finished. Callers that only care about intent can drop the
//! `Delivery`; callers that want the outcome can `.wait()` on it.
//!
//! # Implementations
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`IrSendTransmitter`] | Spawns LIRC `irsend` per token |
//! | [`MockTransmitter`] | Records tokens for tests |
//!
//! # Example
//!
//! ```rust
//! use ir_trainz::commands::{encode_stop, Channel};
//! use ir_trainz::hal::MockTransmitter;
//! use ir_trainz::traits::Transmitter;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let tx = MockTransmitter::new();
//! let delivery = tx.send(encode_stop(Channel::OneB));
//!
//! assert!(delivery.wait().await.is_ok());
//! assert_eq!(tx.sent(), vec!["1B_BRAKE".to_string()]);
//! # });
//! ```
//!
//! [`IrSendTransmitter`]: crate::hal::IrSendTransmitter
//! [`MockTransmitter`]: crate::hal::MockTransmitter

use core::fmt;

use tokio::sync::oneshot;

use crate::commands::CommandToken;

/// Why a transmission did not complete successfully.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransmitError {
    /// The transmit process could not be started.
    Spawn(String),
    /// The transmit process exited unsuccessfully.
    Exit {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },
    /// The transmitter dropped the notification without reporting.
    Abandoned,
}

impl fmt::Display for TransmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransmitError::Spawn(msg) => write!(f, "failed to start transmitter: {}", msg),
            TransmitError::Exit { code: Some(code), stderr } if stderr.is_empty() => {
                write!(f, "transmitter exited with status {}", code)
            }
            TransmitError::Exit { code: Some(code), stderr } => {
                write!(f, "transmitter exited with status {}: {}", code, stderr)
            }
            TransmitError::Exit { code: None, .. } => {
                write!(f, "transmitter terminated by signal")
            }
            TransmitError::Abandoned => write!(f, "transmission abandoned without a result"),
        }
    }
}

impl std::error::Error for TransmitError {}

/// Outcome reported through a [`Delivery`].
pub type TransmitResult = Result<(), TransmitError>;

/// Sending half of a delivery notification, held by the transmitter.
pub type DeliverySender = oneshot::Sender<TransmitResult>;

/// Pending completion of one transmission.
///
/// Dropping a `Delivery` does not cancel the transmission.
#[derive(Debug)]
pub struct Delivery {
    rx: oneshot::Receiver<TransmitResult>,
}

impl Delivery {
    /// Creates a linked sender/delivery pair.
    pub fn channel() -> (DeliverySender, Delivery) {
        let (tx, rx) = oneshot::channel();
        (tx, Delivery { rx })
    }

    /// A delivery that is already resolved.
    pub fn ready(result: TransmitResult) -> Delivery {
        let (tx, delivery) = Self::channel();
        let _ = tx.send(result);
        delivery
    }

    /// Waits for the transmission to finish.
    ///
    /// A transmitter that drops its sender without reporting yields
    /// [`TransmitError::Abandoned`].
    pub async fn wait(self) -> TransmitResult {
        self.rx.await.unwrap_or(Err(TransmitError::Abandoned))
    }

    /// Non-blocking check. `None` while still in flight.
    pub fn try_result(&mut self) -> Option<TransmitResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(TransmitError::Abandoned)),
        }
    }
}

/// Fire-and-forget sink for IR command tokens.
///
/// Implementations must not block: `send` starts the transmission and returns.
/// Successive sends are independent and may complete in any order.
pub trait Transmitter: Send + Sync {
    /// Starts transmitting `token`.
    fn send(&self, token: CommandToken) -> Delivery;
}

impl<T: Transmitter + ?Sized> Transmitter for std::sync::Arc<T> {
    fn send(&self, token: CommandToken) -> Delivery {
        (**self).send(token)
    }
}

impl<T: Transmitter + ?Sized> Transmitter for Box<T> {
    fn send(&self, token: CommandToken) -> Delivery {
        (**self).send(token)
    }
}
