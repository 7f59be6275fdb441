//! HTTP API handler logic, independent of the web framework.
//!
//! `HttpApiHandler` turns raw path parameters into replies. It validates,
//! encodes and dispatches; the axum layer in [`web`](super::web) only
//! extracts parameters and serializes the result.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ir_trainz::hal::MockTransmitter;
//! use ir_trainz::services::{ApiReply, HttpApiHandler, SharedState};
//!
//! let state = Arc::new(SharedState::new(MockTransmitter::new()));
//! let handler = HttpApiHandler::new(Arc::clone(&state));
//!
//! let reply = handler.handle_stop("9X");
//! assert_eq!(reply, ApiReply::error("Not a valid channel (9X)"));
//! assert_eq!(state.transmitter().call_count(), 0);
//! ```

use std::sync::Arc;

use crate::commands::TrainCommand;
use crate::traits::Transmitter;

use super::api::{ApiReply, DeliveriesResponse, PinsResponse, UsageResponse};
use super::shared::SharedState;

/// Business logic for every API endpoint.
pub struct HttpApiHandler<T: Transmitter> {
    state: Arc<SharedState<T>>,
}

impl<T: Transmitter + 'static> HttpApiHandler<T> {
    /// Create a new handler over shared state.
    pub fn new(state: Arc<SharedState<T>>) -> Self {
        Self { state }
    }

    /// GET /api/train/{channel}/speed/{speed}
    ///
    /// The message echoes `speed` exactly as received.
    pub fn handle_set_speed(&self, channel: &str, speed: &str) -> ApiReply {
        self.run(channel, Some(speed), || {
            format!("Train speed set to {}", speed)
        })
    }

    /// GET /api/train/{channel}/stop
    pub fn handle_stop(&self, channel: &str) -> ApiReply {
        self.run(channel, None, || "Train stopped".to_string())
    }

    /// GET /api
    pub fn handle_usage(&self) -> UsageResponse {
        UsageResponse::default()
    }

    /// GET /api/deliveries
    pub fn handle_deliveries(&self) -> DeliveriesResponse {
        DeliveriesResponse {
            deliveries: self.state.deliveries(),
        }
    }

    /// GET /api/pins
    pub fn handle_pins(&self) -> PinsResponse {
        PinsResponse {
            pins: self.state.pins(),
        }
    }

    fn run(&self, channel: &str, speed: Option<&str>, message: impl FnOnce() -> String) -> ApiReply {
        let command = match TrainCommand::from_request(channel, speed) {
            Ok(command) => command,
            Err(e) => {
                log::warn!("{}", e);
                return ApiReply::error(e.to_string());
            }
        };

        let token = command.encode();
        let id = self.state.dispatch(token.clone());
        log::debug!("{:?} dispatched as {} (delivery {})", command, token, id);

        ApiReply::message(message())
    }
}
