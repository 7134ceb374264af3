//! Last-writer-wins bookkeeping for overlapping requests.
//!
//! Each logical query (search around a center, route between a pair) owns one
//! [`Generation`]. Issue a ticket before starting a request and hand the result
//! back through [`Generation::accept`]; anything answered after a newer ticket
//! was issued is dropped, however late or early it arrives.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Generation {
    current: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Ticket {
    fn from(value: u64) -> Self {
        Ticket(value)
    }
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }

    /// Passes `value` through if `ticket` is still the latest, otherwise drops it.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_current(&ticket) {
            Some(value)
        } else {
            log::debug!(
                "Discarding stale response for generation {} (current {})",
                ticket.0,
                self.current.load(Ordering::SeqCst)
            );
            None
        }
    }
}
