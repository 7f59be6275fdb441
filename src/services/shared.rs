//! Shared state for the HTTP and pin monitoring services.
//!
//! `SharedState` owns the transmitter, a bounded history of transmission
//! outcomes and the last known level of each monitored pin. It is wrapped in
//! `Arc` and handed to every service.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ir_trainz::services::SharedState;
//!
//! let state = Arc::new(SharedState::new(transmitter));
//!
//! // Web handlers dispatch tokens; the response does not wait for delivery
//! let id = state.dispatch(token);
//!
//! // Later, the outcome shows up in the delivery log
//! let records = state.deliveries();
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;

use crate::commands::CommandToken;
use crate::traits::{Delivery, PinEvent, TransmitResult, Transmitter};

/// Default number of delivery records kept.
pub const DEFAULT_HISTORY: usize = 64;

// ============================================================================
// Delivery Log
// ============================================================================

/// State of one transmission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DeliveryOutcome {
    /// Handed to the transmitter, no result yet.
    Pending,
    /// Transmitter reported success.
    Sent,
    /// Transmitter reported a failure, or dropped the notification.
    Failed,
}

/// One entry in the delivery log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeliveryRecord {
    /// Monotonic id, starting at 1.
    pub id: u64,
    /// Token that was sent.
    pub token: String,
    /// Current outcome.
    pub outcome: DeliveryOutcome,
    /// Failure description.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub detail: Option<String>,
}

/// Bounded, oldest-first history of transmissions.
#[derive(Debug)]
pub struct DeliveryLog {
    records: VecDeque<DeliveryRecord>,
    capacity: usize,
    next_id: u64,
}

impl DeliveryLog {
    /// Creates a log keeping at most `capacity` records.
    ///
    /// Storage grows with use, up to `capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity,
            next_id: 1,
        }
    }

    /// Records a new pending transmission and returns its id.
    ///
    /// The oldest record is evicted once the log is full.
    pub fn begin(&mut self, token: &CommandToken) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        if self.capacity == 0 {
            return id;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(DeliveryRecord {
            id,
            token: token.to_string(),
            outcome: DeliveryOutcome::Pending,
            detail: None,
        });
        id
    }

    /// Stores the outcome for `id`. Returns false if it was already evicted.
    pub fn finish(&mut self, id: u64, result: &TransmitResult) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        match result {
            Ok(()) => {
                record.outcome = DeliveryOutcome::Sent;
                record.detail = None;
            }
            Err(e) => {
                record.outcome = DeliveryOutcome::Failed;
                record.detail = Some(e.to_string());
            }
        }
        true
    }

    /// Looks up a record by id.
    pub fn get(&self, id: u64) -> Option<&DeliveryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Copies out all records, oldest first.
    pub fn snapshot(&self) -> Vec<DeliveryRecord> {
        self.records.iter().cloned().collect()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Shared State
// ============================================================================

/// Shared state for all services.
///
/// Locks are held only for bookkeeping and never across an `.await`.
pub struct SharedState<T: Transmitter> {
    /// IR transmitter
    transmitter: T,

    /// Recent transmissions and their outcomes
    deliveries: Mutex<DeliveryLog>,

    /// Last known level per monitored pin
    pins: Mutex<BTreeMap<u64, u8>>,
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Transmitter> SharedState<T> {
    /// Create new shared state around a transmitter.
    pub fn new(transmitter: T) -> Self {
        Self::with_history(transmitter, DEFAULT_HISTORY)
    }

    /// Create new shared state keeping `history` delivery records.
    pub fn with_history(transmitter: T, history: usize) -> Self {
        Self {
            transmitter,
            deliveries: Mutex::new(DeliveryLog::new(history)),
            pins: Mutex::new(BTreeMap::new()),
        }
    }

    /// The wrapped transmitter.
    pub fn transmitter(&self) -> &T {
        &self.transmitter
    }

    /// All delivery records, oldest first.
    pub fn deliveries(&self) -> Vec<DeliveryRecord> {
        lock(&self.deliveries).snapshot()
    }

    /// One delivery record.
    pub fn delivery(&self, id: u64) -> Option<DeliveryRecord> {
        lock(&self.deliveries).get(id).cloned()
    }

    /// Stores the level reported by a pin event.
    pub fn record_pin(&self, event: PinEvent) {
        lock(&self.pins).insert(event.pin, event.value);
    }

    /// Last known level per pin.
    pub fn pins(&self) -> BTreeMap<u64, u8> {
        lock(&self.pins).clone()
    }

    /// Stores the result of delivery `id`.
    pub fn finish_delivery(&self, id: u64, result: &TransmitResult) -> bool {
        lock(&self.deliveries).finish(id, result)
    }
}

impl<T: Transmitter + 'static> SharedState<T> {
    /// Sends `token` and tracks its outcome in the background.
    ///
    /// Returns the delivery id immediately. When called outside a tokio
    /// runtime the record stays pending, since nothing can await it.
    pub fn dispatch(self: &Arc<Self>, token: CommandToken) -> u64 {
        let id = lock(&self.deliveries).begin(&token);
        let delivery = self.transmitter.send(token.clone());

        match Handle::try_current() {
            Ok(handle) => {
                let state = Arc::clone(self);
                handle.spawn(async move {
                    state.track(id, token, delivery).await;
                });
            }
            Err(_) => log::warn!("no runtime to track delivery {} ({})", id, token),
        }
        id
    }

    async fn track(&self, id: u64, token: CommandToken, delivery: Delivery) {
        let result = delivery.wait().await;
        match &result {
            Ok(()) => log::info!("delivery {} ({}) sent", id, token),
            Err(e) => log::warn!("delivery {} ({}) failed: {}", id, token, e),
        }
        self.finish_delivery(id, &result);
    }
}
