//! Per-actor timers for combat rounds and resting recovery.
//!
//! Time is an abstract counter advanced explicitly by the host; nothing here
//! reads a clock. Each actor holds at most one pending timer of each kind:
//! scheduling again replaces the earlier one, whose heap entry is skipped when
//! it surfaces.

use crate::world::ActorId;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Resolve one round of the actor's combat.
    Combat,
    /// Recover hit points and mana while resting.
    Recovery,
}

/// A timer that has come due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub actor: ActorId,
    pub kind: TimerKind,
    pub due: u64,
}

#[derive(Debug, Clone)]
struct ScheduledTimer {
    due: u64,
    seq: u64,
    actor: ActorId,
    kind: TimerKind,
}

impl PartialEq for ScheduledTimer {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}
impl Eq for ScheduledTimer {}
impl PartialOrd for ScheduledTimer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ScheduledTimer {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.due.cmp(&other.due) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            o => o,
        }
    }
}

/// Queue of pending timers, ordered by due time then scheduling order.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    now: u64,
    seq: u64,
    heap: BinaryHeap<Reverse<ScheduledTimer>>,
    /// Live sequence number per (actor, kind); anything else in the heap is stale.
    pending: HashMap<(ActorId, TimerKind), u64>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Arm a timer `delay` units from now, replacing any pending timer of the
    /// same kind for this actor.
    pub fn schedule(&mut self, actor: ActorId, kind: TimerKind, delay: u64) {
        let seq = self.seq;
        self.seq = self.seq.saturating_add(1);
        let due = self.now.saturating_add(delay);
        self.pending.insert((actor, kind), seq);
        self.heap.push(Reverse(ScheduledTimer {
            due,
            seq,
            actor,
            kind,
        }));
    }

    pub fn cancel(&mut self, actor: ActorId, kind: TimerKind) {
        self.pending.remove(&(actor, kind));
    }

    pub fn is_scheduled(&self, actor: ActorId, kind: TimerKind) -> bool {
        self.pending.contains_key(&(actor, kind))
    }

    /// Move time forward.
    pub fn advance(&mut self, dt: u64) {
        self.now = self.now.saturating_add(dt);
    }

    /// Due time of the earliest live timer.
    pub fn next_due(&mut self) -> Option<u64> {
        self.discard_stale();
        self.heap.peek().map(|Reverse(t)| t.due)
    }

    /// Pop the earliest live timer if it is due.
    pub fn pop_due(&mut self) -> Option<Timer> {
        self.discard_stale();
        let Reverse(next) = self.heap.peek()?;
        if next.due > self.now {
            return None;
        }
        let Reverse(timer) = self.heap.pop()?;
        self.pending.remove(&(timer.actor, timer.kind));
        Some(Timer {
            actor: timer.actor,
            kind: timer.kind,
            due: timer.due,
        })
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn discard_stale(&mut self) {
        while let Some(Reverse(top)) = self.heap.peek() {
            if self.pending.get(&(top.actor, top.kind)) == Some(&top.seq) {
                break;
            }
            self.heap.pop();
        }
    }
}
