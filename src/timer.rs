//! Timer Queue — single-threaded, virtual-time task scheduling.
//!
//! The host owns the clock: it calls `pop_due` (through the wheel's
//! `advance`) and every task whose due time has been reached fires in order.
//! A task that fires may schedule more tasks; those fire within the same
//! advance if they fall inside it. Cancelling a task removes it outright, so
//! a cancelled task can never fire.

use std::collections::{BTreeMap, HashMap};

/// Handle to one scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Deferred work the wheel schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelTask {
    /// Reveal the next character of the running animation.
    AnimationStep,
    /// End the transient noise burst after its release window.
    ReleaseNoise,
}

/// Ordered queue of pending tasks keyed by (due time, scheduling order).
#[derive(Debug)]
pub struct TimerQueue<T> {
    now_ms: u64,
    next_seq: u64,
    entries: BTreeMap<(u64, u64), (TimerId, T)>,
    index: HashMap<TimerId, (u64, u64)>,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        TimerQueue {
            now_ms: 0,
            next_seq: 0,
            entries: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `task` to fire `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u64, task: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = TimerId(seq);
        let key = (self.now_ms.saturating_add(delay_ms), seq);
        self.entries.insert(key, (id, task));
        self.index.insert(id, key);
        id
    }

    /// Cancel a pending task. Returns false if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.index.remove(&id) {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }

    /// Number of tasks still waiting to fire.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Due time of the earliest pending task.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.entries.keys().next().map(|&(due, _)| due)
    }

    /// Remove and return the earliest task due at or before `until_ms`,
    /// moving the clock to its due time. Returns `None` (and moves the clock
    /// to `until_ms`) once nothing else is due.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, T)> {
        let key = match self.entries.keys().next() {
            Some(&key) if key.0 <= until_ms => key,
            _ => {
                self.now_ms = self.now_ms.max(until_ms);
                return None;
            }
        };
        let (id, task) = self.entries.remove(&key)?;
        self.index.remove(&id);
        self.now_ms = self.now_ms.max(key.0);
        Some((id, task))
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns fractional frame times into whole milliseconds for the queue.
///
/// The leftover fraction is carried to the next frame, so the clock never
/// drifts from the host's elapsed time however short the frames are.
#[derive(Debug, Default)]
pub struct FrameClock {
    carry_ms: f64,
}

impl FrameClock {
    /// Absorbs accumulated float error so a frame sum that should land on a
    /// whole millisecond does.
    const EPSILON_MS: f64 = 1e-6;

    pub fn new() -> Self {
        Self::default()
    }

    /// Whole milliseconds to advance for a frame of `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: f64) -> u64 {
        if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            return 0;
        }
        self.carry_ms += elapsed_ms;
        let whole = (self.carry_ms + Self::EPSILON_MS).floor();
        self.carry_ms -= whole;
        whole as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_due_order() {
        let mut q = TimerQueue::new();
        q.schedule(300, "c");
        q.schedule(100, "a");
        q.schedule(200, "b");

        let mut fired = Vec::new();
        while let Some((_, t)) = q.pop_due(1000) {
            fired.push((q.now_ms(), t));
        }
        assert_eq!(fired, vec![(100, "a"), (200, "b"), (300, "c")]);
        assert_eq!(q.now_ms(), 1000);
    }

    #[test]
    fn ties_fire_in_scheduling_order() {
        let mut q = TimerQueue::new();
        q.schedule(50, 1);
        q.schedule(50, 2);
        assert_eq!(q.pop_due(50).map(|(_, t)| t), Some(1));
        assert_eq!(q.pop_due(50).map(|(_, t)| t), Some(2));
    }

    #[test]
    fn not_due_stays_queued() {
        let mut q = TimerQueue::new();
        q.schedule(800, ());
        assert!(q.pop_due(799).is_none());
        assert_eq!(q.pending(), 1);
        assert!(q.pop_due(800).is_some());
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn cancelled_task_never_fires() {
        let mut q = TimerQueue::new();
        let id = q.schedule(10, "stale");
        q.schedule(20, "fresh");
        assert!(q.cancel(id));
        assert!(!q.cancel(id), "second cancel is a no-op");
        assert_eq!(q.next_due_ms(), Some(20));
        assert_eq!(q.pop_due(100).map(|(_, t)| t), Some("fresh"));
        assert!(q.pop_due(100).is_none());
    }

    #[test]
    fn delay_is_relative_to_current_time() {
        let mut q = TimerQueue::new();
        q.schedule(100, 'x');
        q.pop_due(100);
        q.schedule(100, 'y');
        assert!(q.pop_due(150).is_none());
        assert_eq!(q.pop_due(200).map(|(_, t)| t), Some('y'));
        assert_eq!(q.now_ms(), 200);
    }

    #[test]
    fn next_due_is_earliest() {
        let mut q = TimerQueue::new();
        assert_eq!(q.next_due_ms(), None);
        q.schedule(805, 'b');
        q.schedule(150, 'a');
        assert_eq!(q.next_due_ms(), Some(150));
    }

    #[test]
    fn frame_clock_keeps_fractions() {
        let mut clock = FrameClock::new();
        let total: u64 = (0..96).map(|_| clock.tick(1000.0 / 120.0)).sum();
        assert_eq!(total, 800, "96 frames at 120 Hz are exactly 800 ms");

        let mut clock = FrameClock::new();
        let total: u64 = (0..2000).map(|_| clock.tick(0.4)).sum();
        assert_eq!(total, 800, "sub-millisecond frames still move the clock");
    }

    #[test]
    fn frame_clock_ignores_bad_frames() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(-5.0), 0);
        assert_eq!(clock.tick(f64::NAN), 0);
        assert_eq!(clock.tick(2.5), 2);
        assert_eq!(clock.tick(0.5), 1);
    }
}
