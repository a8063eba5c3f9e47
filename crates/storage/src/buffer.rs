// Path: crates/storage/src/buffer.rs

//! The recency buffer: write arrival order, used only to drive trimming.

use hkv_api::kv::StateKey;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A FIFO of `(arrival time, key)` pairs.
#[derive(Debug, Default)]
pub(crate) struct RecencyBuffer {
    entries: VecDeque<(Instant, StateKey)>,
}

impl RecencyBuffer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, at: Instant, key: StateKey) {
        self.entries.push_back((at, key));
    }

    /// Pops the head if it arrived at least `min_age` before `now`.
    pub(crate) fn pop_aged(&mut self, now: Instant, min_age: Duration) -> Option<StateKey> {
        let (at, _) = self.entries.front()?;
        if now.saturating_duration_since(*at) < min_age {
            return None;
        }
        self.entries.pop_front().map(|(_, key)| key)
    }

    pub(crate) fn pop_front(&mut self) -> Option<StateKey> {
        self.entries.pop_front().map(|(_, key)| key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn key(s: &str) -> StateKey {
        Arc::from(s.as_bytes())
    }

    #[test]
    fn test_pop_aged_only_returns_old_heads() {
        let start = Instant::now();
        let mut buf = RecencyBuffer::with_capacity(4);
        buf.push(start, key("a"));
        buf.push(start + Duration::from_secs(5), key("b"));

        let now = start + Duration::from_secs(6);
        let min_age = Duration::from_secs(3);
        assert_eq!(buf.pop_aged(now, min_age), Some(key("a")));
        // "b" is only 1s old.
        assert_eq!(buf.pop_aged(now, min_age), None);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.pop_front(), Some(key("b")));
        assert_eq!(buf.pop_aged(now, Duration::ZERO), None);
    }
}
