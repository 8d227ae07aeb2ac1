//! Deferred first expand/collapse resolution
//!
//! Every node gets one resolution a fixed delay after construction. The
//! queue is owned by the forest and emptied on rebuild, so a resolution never
//! runs against a torn-down node.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::domain::node::NodeKey;

/// Delay between construction and the first resolution of a node.
pub const RESOLUTION_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
struct Pending {
    key: NodeKey,
    due: Instant,
}

#[derive(Debug, Default)]
pub(crate) struct ResolutionQueue {
    entries: VecDeque<Pending>,
}

impl ResolutionQueue {
    pub(crate) fn schedule(&mut self, key: NodeKey, due: Instant) {
        self.entries.push_back(Pending { key, due });
    }

    /// Next entry, in scheduling order, whose due time has passed.
    pub(crate) fn pop_due(&mut self, now: Instant) -> Option<NodeKey> {
        let position = self.entries.iter().position(|p| p.due <= now)?;
        self.entries.remove(position).map(|p| p.key)
    }

    pub(crate) fn pop(&mut self) -> Option<NodeKey> {
        self.entries.pop_front().map(|p| p.key)
    }

    /// Drop everything pending; returns how many entries were cancelled.
    pub(crate) fn cancel_all(&mut self) -> usize {
        let cancelled = self.entries.len();
        self.entries.clear();
        cancelled
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use generational_arena::Arena;

    fn keys(n: usize) -> Vec<NodeKey> {
        let mut arena = Arena::new();
        (0..n).map(|i| NodeKey(arena.insert(i))).collect()
    }

    #[test]
    fn given_entries_not_due_when_popping_due_then_none() {
        let k = keys(1);
        let now = Instant::now();
        let mut queue = ResolutionQueue::default();
        queue.schedule(k[0], now + RESOLUTION_DELAY);

        assert_eq!(queue.pop_due(now), None);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_due(now + RESOLUTION_DELAY), Some(k[0]));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn given_mixed_due_times_when_popping_due_then_skips_later_entries() {
        let k = keys(2);
        let now = Instant::now();
        let mut queue = ResolutionQueue::default();
        queue.schedule(k[0], now + Duration::from_secs(10));
        queue.schedule(k[1], now);

        assert_eq!(queue.pop_due(now), Some(k[1]));
        assert_eq!(queue.pop_due(now), None);
        assert_eq!(queue.pop(), Some(k[0]));
    }

    #[test]
    fn given_pending_entries_when_cancelling_then_queue_empty() {
        let k = keys(3);
        let now = Instant::now();
        let mut queue = ResolutionQueue::default();
        for key in &k {
            queue.schedule(*key, now);
        }

        assert_eq!(queue.cancel_all(), 3);
        assert_eq!(queue.pop(), None);
    }
}
