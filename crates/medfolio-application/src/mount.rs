//! Discarding results that arrive after a view was left.
//!
//! A view takes a [`Ticket`] before awaiting a request and applies the
//! result only if the ticket is still current. Leaving the view invalidates
//! outstanding tickets. The request itself is not cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Default)]
pub struct MountGuard {
    generation: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl MountGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> Ticket {
        Ticket(self.generation.load(Ordering::SeqCst))
    }

    /// Invalidates every ticket handed out so far.
    pub fn unmount(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }
}
