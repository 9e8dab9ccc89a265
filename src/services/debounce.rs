use std::time::{Duration, Instant};

/// Single-slot deadline: scheduling replaces whatever was pending.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// A delay too large for the clock fires on the next poll.
    pub fn schedule(&mut self, key: impl Into<String>, now: Instant) {
        let due = now.checked_add(self.delay).unwrap_or(now);
        self.pending = Some((key.into(), due));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_ref().map(|(k, _)| k.as_str())
    }

    /// Returns the key once its deadline has passed, clearing the slot.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, due)) if now >= *due => self.pending.take().map(|(k, _)| k),
            _ => None,
        }
    }

    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(_, due)| due.saturating_duration_since(now))
    }
}
