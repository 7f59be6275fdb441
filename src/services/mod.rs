//! Services built on the command core: HTTP API and input pin monitoring.
//!
//! - `std` feature: shared state, delivery tracking and the pin monitor
//! - `web` feature: Axum-based HTTP API server with JSON endpoints
//!
//! Both services share a single `SharedState<T>` wrapped in `Arc`:
//!
//! ```ignore
//! use std::sync::Arc;
//! use ir_trainz::services::{build_router, spawn_pin_monitor, SharedState};
//!
//! let state = Arc::new(SharedState::new(transmitter));
//!
//! let monitor = spawn_pin_monitor(inputs, Arc::clone(&state));
//! let router = build_router(Arc::clone(&state), &web_config);
//! ```

pub mod monitor;
pub mod shared;

// API types and handler logic
#[cfg(feature = "web")]
pub mod api;

#[cfg(feature = "web")]
pub mod http_handler;

#[cfg(feature = "web")]
pub mod web;

// Re-exports
pub use monitor::*;
pub use shared::*;

#[cfg(feature = "web")]
pub use api::*;

#[cfg(feature = "web")]
pub use http_handler::*;

#[cfg(feature = "web")]
pub use web::*;
