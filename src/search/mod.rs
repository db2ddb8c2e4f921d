//! Debounced live search for the admin tables.
//!
//! Every keystroke takes a ticket for its session. A ticket only fires after
//! the quiet window passes without a newer ticket, and its result is only
//! applied if it is still the newest once the backend answers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;

/// Sequence number of one search request within its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Per-session debounce and stale-response guard.
pub struct SearchCoalescer {
    window: Duration,
    next: AtomicU64,
    latest: Mutex<HashMap<String, Ticket>>,
}

impl SearchCoalescer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            next: AtomicU64::new(1),
            latest: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Take a new ticket, superseding any earlier one of the session.
    pub async fn issue(&self, session: &str) -> Ticket {
        let ticket = Ticket(self.next.fetch_add(1, Ordering::Relaxed));
        self.latest.lock().await.insert(session.to_string(), ticket);
        ticket
    }

    /// Whether `ticket` is still the newest of its session.
    pub async fn is_current(&self, session: &str, ticket: Ticket) -> bool {
        self.latest.lock().await.get(session) == Some(&ticket)
    }

    /// Issue a ticket and wait out the quiet window.
    ///
    /// Returns `None` when a newer keystroke arrived meanwhile.
    pub async fn settle(&self, session: &str) -> Option<Ticket> {
        let ticket = self.issue(session).await;
        tokio::time::sleep(self.window).await;
        if self.is_current(session, ticket).await {
            Some(ticket)
        } else {
            tracing::debug!(ticket = ticket.value(), "search superseded during debounce");
            None
        }
    }

    /// Accept a finished request's result if nothing newer was issued.
    ///
    /// Forgets the session on success so idle sessions do not pile up.
    pub async fn complete(&self, session: &str, ticket: Ticket) -> bool {
        let mut latest = self.latest.lock().await;
        if latest.get(session) == Some(&ticket) {
            latest.remove(session);
            true
        } else {
            tracing::debug!(ticket = ticket.value(), "discarding stale search response");
            false
        }
    }

    #[cfg(test)]
    pub(crate) async fn tracked_sessions(&self) -> usize {
        self.latest.lock().await.len()
    }
}
