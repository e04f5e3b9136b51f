// Deferred callbacks for phase advancement

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Which attempt a deferred growth request represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attempt {
    First,
    Retry,
}

/// Ticket for one scheduled growth step.
///
/// `generation` ties it to the graph instance it was scheduled against and
/// `seq` to a specific request on that instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GrowthToken {
    pub generation: u64,
    pub seq: u64,
    pub attempt: Attempt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

/// A facility that runs a growth request later, off the frame tick.
pub trait Deferred {
    /// Schedule `token` to be delivered at `at_ms` on the host clock.
    fn schedule(&mut self, at_ms: f64, token: GrowthToken) -> TaskId;
    fn cancel(&mut self, task: TaskId);
}

struct Entry {
    at_ms: f64,
    id: TaskId,
    token: GrowthToken,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the max-heap pops the earliest entry; ties go to the older id
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at_ms
            .total_cmp(&self.at_ms)
            .then_with(|| other.id.0.cmp(&self.id.0))
    }
}

/// In-process timer queue driven by the host's frame loop.
#[derive(Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Entry>,
    cancelled: HashSet<TaskId>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every live token due at or before `now_ms`, earliest first.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<GrowthToken> {
        let mut due = Vec::new();
        while let Some(entry) = self.heap.peek() {
            if entry.at_ms > now_ms {
                break;
            }
            let Some(entry) = self.heap.pop() else { break };
            if !self.cancelled.remove(&entry.id) {
                due.push(entry.token);
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.heap.len() - self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.cancelled.clear();
    }
}

impl Deferred for TimerQueue {
    fn schedule(&mut self, at_ms: f64, token: GrowthToken) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.heap.push(Entry { at_ms, id, token });
        id
    }

    fn cancel(&mut self, task: TaskId) {
        if self.heap.iter().any(|e| e.id == task) {
            self.cancelled.insert(task);
        }
    }
}
