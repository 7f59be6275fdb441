//! Linux sysfs GPIO input source.
//!
//! Exports each configured pin, configures it as an input with interrupts on
//! both edges and polls the pins in turn.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sysfs_gpio::{Direction, Edge, Pin, PinPoller};

use crate::config::{GpioConfig, POLL_TIMEOUT_RANGE_MS};
use crate::traits::{InputEvents, PinEvent};

/// Edge-triggered GPIO inputs via `/sys/class/gpio`.
pub struct SysfsInputs {
    pollers: Vec<(u64, PinPoller)>,
    timeout_ms: isize,
    next: usize,
    stop: Arc<AtomicBool>,
}

impl SysfsInputs {
    /// Exports and configures `pins`.
    ///
    /// `poll_timeout_ms` bounds how long one pin is watched before the next
    /// one gets a turn.
    pub fn open(pins: &[u64], poll_timeout_ms: u32) -> Result<Self, sysfs_gpio::Error> {
        let mut pollers = Vec::with_capacity(pins.len());
        for &number in pins {
            let pin = Pin::new(number);
            pin.export()?;
            pin.set_direction(Direction::In)?;
            pin.set_edge(Edge::BothEdges)?;
            pollers.push((number, pin.get_poller()?));
            log::debug!("gpio{} exported as input, both edges", number);
        }

        Ok(Self {
            pollers,
            timeout_ms: poll_timeout(poll_timeout_ms),
            next: 0,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Create from shared GpioConfig
    pub fn from_config(config: &GpioConfig) -> Result<Self, sysfs_gpio::Error> {
        Self::open(&config.pins, config.effective_poll_timeout_ms())
    }

    /// Flag that ends the event stream once set.
    ///
    /// Checked between polls, so the source stops within one poll timeout.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }
}

// Negative timeouts block forever in poll(2), zero spins.
fn poll_timeout(ms: u32) -> isize {
    let ms = ms.clamp(*POLL_TIMEOUT_RANGE_MS.start(), *POLL_TIMEOUT_RANGE_MS.end());
    isize::try_from(ms).unwrap_or(isize::MAX)
}

impl InputEvents for SysfsInputs {
    fn next_event(&mut self) -> Option<PinEvent> {
        if self.pollers.is_empty() {
            return None;
        }

        loop {
            if self.stop.load(Ordering::Relaxed) {
                return None;
            }

            let index = self.next;
            self.next = (self.next + 1) % self.pollers.len();

            let (pin, poller) = &mut self.pollers[index];
            match poller.poll(self.timeout_ms) {
                Ok(Some(value)) => return Some(PinEvent::new(*pin, value)),
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("gpio{} poll failed: {}", pin, e);
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_timeout_stays_positive_and_bounded() {
        assert_eq!(poll_timeout(0), 1);
        assert_eq!(poll_timeout(100), 100);
        assert_eq!(poll_timeout(u32::MAX), 10_000);
        assert_eq!(poll_timeout(i32::MAX as u32 + 1), 10_000);
    }
}
