//! Deadline queue for host-clock timers.
//!
//! Timers fire from Page::update() once the host clock passes their due
//! time. Handles are never reused, so a cancelled id cannot fire.

use crate::ids::TimerId;

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    due_ms: f64,
    payload: T,
}

#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` at `due_ms`; entries stay sorted by due time
    /// (insertion order for equal deadlines).
    pub fn schedule(&mut self, due_ms: f64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let pos = self.entries.partition_point(|e| e.due_ms <= due_ms);
        self.entries.insert(
            pos,
            Entry {
                id,
                due_ms,
                payload,
            },
        );
        id
    }

    /// Cancel a timer. Returns false when it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn due_time(&self, id: TimerId) -> Option<f64> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.due_ms)
    }

    /// Remove and return every timer due at or before `now_ms`, in due order.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<(TimerId, T)> {
        let split = self.entries.partition_point(|e| e.due_ms <= now_ms);
        self.entries
            .drain(..split)
            .map(|e| (e.id, e.payload))
            .collect()
    }

    /// Earliest deadline, if any.
    pub fn next_due(&self) -> Option<f64> {
        self.entries.first().map(|e| e.due_ms)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Count pending timers whose payload matches.
    pub fn pending_for(&self, mut pred: impl FnMut(&T) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.payload)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
