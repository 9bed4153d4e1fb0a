//! Deadline queue for deferred work
//!
//! Every timer in the game (spawn sequences, queue stagger, chaos re-arming)
//! is an entry in a `Timeline`, polled from the tick loop. Entries are ordered
//! by `(at_ms, sequence)` so ties fire in scheduling order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct Scheduled<T> {
    at_ms: u64,
    sequence: u64,
    item: T,
}

// BinaryHeap is a max-heap; reverse so the earliest entry is on top.
impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.at_ms == other.at_ms && self.sequence == other.sequence
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at_ms
            .cmp(&self.at_ms)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Min-heap of items keyed by their fire time
#[derive(Debug, Clone)]
pub struct Timeline<T> {
    heap: BinaryHeap<Scheduled<T>>,
    next_sequence: u64,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at_ms: u64, item: T) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Scheduled {
            at_ms,
            sequence,
            item,
        });
    }

    /// Fire time of the earliest entry
    pub fn peek_time(&self) -> Option<u64> {
        self.heap.peek().map(|s| s.at_ms)
    }

    /// Pop the earliest entry if it is due at `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<T> {
        if self.heap.peek().is_some_and(|s| s.at_ms <= now_ms) {
            self.heap.pop().map(|s| s.item)
        } else {
            None
        }
    }

    /// Pop every entry due at `now_ms`, earliest first
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<T> {
        let mut due = Vec::new();
        while let Some(item) = self.pop_due(now_ms) {
            due.push(item);
        }
        due
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_time_then_sequence_order() {
        let mut timeline = Timeline::new();
        timeline.schedule(200, "late");
        timeline.schedule(100, "first");
        timeline.schedule(100, "second");

        assert_eq!(timeline.pop_due(50), None);
        assert_eq!(timeline.drain_due(150), vec!["first", "second"]);
        assert_eq!(timeline.peek_time(), Some(200));
        assert_eq!(timeline.pop_due(200), Some("late"));
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut timeline = Timeline::new();
        timeline.schedule(10, 1);
        timeline.schedule(20, 2);
        timeline.clear();
        assert_eq!(timeline.len(), 0);
        assert_eq!(timeline.pop_due(u64::MAX), None);
    }
}
