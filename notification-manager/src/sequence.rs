//! Monotonic notification sequence
//!
//! Every render request takes the next number. A render is applied only if
//! its number is still the latest one issued; invalidating bumps the counter
//! so that anything in flight is discarded on arrival.

/// Strictly increasing counter of notification render requests
#[derive(Debug, Default, Clone)]
pub struct NotificationSequence {
    latest: u64,
}

impl NotificationSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the number for a new render request
    pub fn next(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Discard every render issued so far
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_latest(&self, sequence: u64) -> bool {
        sequence == self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}
