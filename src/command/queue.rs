//! Per-kind event queues drained on a timer
//!
//! Each action kind has its own FIFO. A drain pops one event from every
//! non-empty queue and staggers them so distinct kinds land on distinct
//! ticks.

use std::collections::VecDeque;

use crate::sim::{ActionKind, EventEnvelope, GameEvent, Timeline};

/// Delay between events released by one drain
pub const STAGGER_MS: u64 = 500;

/// Outcome of `enqueue`
#[derive(Debug, Clone, PartialEq)]
pub enum Enqueued {
    /// Appended; carries the new length of that kind's queue
    Queued { kind: ActionKind, len: usize },
    /// Commentary bypasses the queue and is shown immediately
    Toast(String),
    /// Kind is disabled by config
    Dropped(ActionKind),
}

#[derive(Debug, Default)]
pub struct EventQueue {
    /// Kinds in first-seen order
    queues: Vec<(ActionKind, VecDeque<EventEnvelope>)>,
    disabled: Vec<ActionKind>,
    staggered: Timeline<EventEnvelope>,
}

impl EventQueue {
    pub fn new(disabled: Vec<ActionKind>) -> Self {
        Self {
            disabled,
            ..Default::default()
        }
    }

    pub fn set_disabled(&mut self, disabled: Vec<ActionKind>) {
        self.disabled = disabled;
    }

    pub fn enqueue(&mut self, envelope: EventEnvelope) -> Enqueued {
        let kind = envelope.event.kind();
        if let GameEvent::Commentary(text) = envelope.event {
            return Enqueued::Toast(text);
        }
        if self.disabled.contains(&kind) {
            log::debug!("Dropped disabled command {:?}", kind);
            return Enqueued::Dropped(kind);
        }

        let index = match self.queues.iter().position(|(k, _)| *k == kind) {
            Some(index) => index,
            None => {
                self.queues.push((kind, VecDeque::new()));
                self.queues.len() - 1
            }
        };
        let queue = &mut self.queues[index].1;
        queue.push_back(envelope);
        let len = queue.len();
        log::debug!("Queued: {:?}. Queue size: {}", kind, len);
        Enqueued::Queued { kind, len }
    }

    /// Pop one event per non-empty kind and stagger them from `now_ms`;
    /// returns how many were released
    pub fn drain(&mut self, now_ms: u64) -> usize {
        let mut released = 0;
        for (_, queue) in &mut self.queues {
            if let Some(envelope) = queue.pop_front() {
                self.staggered.schedule(now_ms + released as u64 * STAGGER_MS, envelope);
                released += 1;
            }
        }
        released
    }

    /// Events whose stagger time has arrived, in release order
    pub fn poll(&mut self, now_ms: u64) -> Vec<EventEnvelope> {
        self.staggered.drain_due(now_ms)
    }

    /// Queued length for one kind
    pub fn len_of(&self, kind: ActionKind) -> usize {
        self.queues
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, q)| q.len())
    }

    /// Total queued (not yet released) events
    pub fn pending(&self) -> usize {
        self.queues.iter().map(|(_, q)| q.len()).sum()
    }

    pub fn staggered_len(&self) -> usize {
        self.staggered.len()
    }

    pub fn clear(&mut self) {
        self.queues.clear();
        self.staggered.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Speed;

    fn env(event: GameEvent) -> EventEnvelope {
        EventEnvelope::new(event)
    }

    #[test]
    fn test_drain_takes_one_per_kind() {
        let mut queue = EventQueue::new(Vec::new());
        for _ in 0..3 {
            queue.enqueue(env(GameEvent::SpawnTnt));
        }
        queue.enqueue(env(GameEvent::SpawnBalls(2)));
        queue.enqueue(env(GameEvent::SetSpeed(Speed::Fast)));

        assert_eq!(queue.drain(1000), 3);
        assert_eq!(queue.len_of(ActionKind::SpawnTnt), 2);
        assert_eq!(queue.pending(), 2);

        // released at +0, +500, +1000 in first-seen order
        let first = queue.poll(1000);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].event, GameEvent::SpawnTnt);
        assert_eq!(queue.poll(1499).len(), 0);
        assert_eq!(queue.poll(1500)[0].event, GameEvent::SpawnBalls(2));
        assert_eq!(queue.poll(2000)[0].event, GameEvent::SetSpeed(Speed::Fast));
    }

    #[test]
    fn test_every_kind_drains_before_any_repeats() {
        let mut queue = EventQueue::new(Vec::new());
        for _ in 0..5 {
            queue.enqueue(env(GameEvent::SpawnTnt));
        }
        queue.enqueue(env(GameEvent::HealPickaxe));
        queue.drain(0);
        let released: Vec<_> = queue.poll(u64::MAX).into_iter().map(|e| e.event.kind()).collect();
        assert_eq!(released, vec![ActionKind::SpawnTnt, ActionKind::HealPickaxe]);
    }

    #[test]
    fn test_disabled_kind_dropped() {
        let mut queue = EventQueue::new(vec![ActionKind::SpawnTnt]);
        assert_eq!(
            queue.enqueue(env(GameEvent::SpawnTnt)),
            Enqueued::Dropped(ActionKind::SpawnTnt)
        );
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.drain(0), 0);
    }

    #[test]
    fn test_commentary_is_a_toast() {
        let mut queue = EventQueue::new(Vec::new());
        assert_eq!(
            queue.enqueue(env(GameEvent::Commentary("hi".into()))),
            Enqueued::Toast("hi".into())
        );
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_clear_drops_staggered() {
        let mut queue = EventQueue::new(Vec::new());
        queue.enqueue(env(GameEvent::SpawnTnt));
        queue.enqueue(env(GameEvent::HealPickaxe));
        queue.drain(0);
        queue.clear();
        assert!(queue.poll(u64::MAX).is_empty());
    }
}
