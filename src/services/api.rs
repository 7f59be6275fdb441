//! API response types for the HTTP service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::shared::DeliveryRecord;

/// Usage hint returned by `GET /api`.
pub const USAGE: &str = "train/{channel}/speed/{-7 to 7} | train/{channel}/stop";

// ============================================================================
// Response Types
// ============================================================================

/// Body of every train command response.
///
/// Serializes as `{"message": ...}` on success and `{"error": ...}` on
/// rejection. Both are sent with HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiReply {
    /// The command was accepted and handed to the transmitter.
    Message(String),
    /// The command was rejected before anything was sent.
    Error(String),
}

impl ApiReply {
    /// Create a success reply
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }

    /// Create an error reply
    pub fn error(text: impl Into<String>) -> Self {
        Self::Error(text.into())
    }

    /// Whether this is a success reply
    pub fn is_message(&self) -> bool {
        matches!(self, Self::Message(_))
    }

    /// The reply text
    pub fn text(&self) -> &str {
        match self {
            Self::Message(text) | Self::Error(text) => text,
        }
    }
}

/// `GET /api` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageResponse {
    /// Route summary
    pub usage: String,
}

impl Default for UsageResponse {
    fn default() -> Self {
        Self {
            usage: USAGE.to_string(),
        }
    }
}

/// `GET /api/deliveries` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveriesResponse {
    /// Recent transmissions, oldest first
    pub deliveries: Vec<DeliveryRecord>,
}

/// `GET /api/pins` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinsResponse {
    /// Last known level per pin
    pub pins: BTreeMap<u64, u8>,
}
