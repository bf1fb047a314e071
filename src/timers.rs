//! Virtual timer scheduler.
//!
//! Every delay in the behavior layer (transition lock release, autoplay,
//! notification dismissal, deferred focus, loader fade, memory checks) is a
//! [`Task`] queued here instead of a host timer. The host drives the clock
//! through `Portfolio::advance_to`, which drains [`Timers::pop_due`] in order:
//! earlier deadlines first, ties in scheduling order.
//!
//! Timers never overlap themselves: callers cancel before re-arming, and an
//! interval is re-queued only after its previous firing has been popped.

use crate::types::{FocusTarget, Millis};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Handle for a scheduled timer. Cancelling a stale handle is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimerId(u64);

/// Work to run when a timer fires.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    ReleaseTransition,
    AutoplayTick,
    ExpireNotification(u64),
    RemoveNotification(u64),
    FadeLoader,
    RemoveLoader,
    Focus(FocusTarget),
    MemoryCheck,
}

impl Task {
    /// Short label used in simulation reports.
    pub fn label(&self) -> &'static str {
        match self {
            Task::ReleaseTransition => "release_transition",
            Task::AutoplayTick => "autoplay_tick",
            Task::ExpireNotification(_) => "expire_notification",
            Task::RemoveNotification(_) => "remove_notification",
            Task::FadeLoader => "fade_loader",
            Task::RemoveLoader => "remove_loader",
            Task::Focus(_) => "focus",
            Task::MemoryCheck => "memory_check",
        }
    }
}

#[derive(Debug)]
struct Entry {
    due: Millis,
    seq: u64,
    period: Option<Millis>,
    task: Task,
}

#[derive(Debug, Default)]
pub struct Timers {
    now: Millis,
    next_seq: u64,
    queue: BTreeMap<(Millis, u64), TimerId>,
    entries: HashMap<TimerId, Entry>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Run `task` once, `delay` ms from now.
    pub fn set_timeout(&mut self, delay: Millis, task: Task) -> TimerId {
        self.schedule(delay, None, task)
    }

    /// Run `task` every `period` ms, first firing one period from now.
    pub fn set_interval(&mut self, period: Millis, task: Task) -> TimerId {
        let period = period.max(1);
        self.schedule(period, Some(period), task)
    }

    fn schedule(&mut self, delay: Millis, period: Option<Millis>, task: Task) -> TimerId {
        let seq = self.bump();
        let id = TimerId(seq);
        let due = self.now.saturating_add(delay);
        self.queue.insert((due, seq), id);
        self.entries.insert(
            id,
            Entry {
                due,
                seq,
                period,
                task,
            },
        );
        id
    }

    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Cancel a timer. Returns false if it already fired (timeouts) or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.entries.remove(&id) {
            Some(entry) => {
                self.queue.remove(&(entry.due, entry.seq));
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of live timers (timeouts not yet fired plus all intervals).
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Deadline of the next timer to fire, if any.
    pub fn next_due(&self) -> Option<Millis> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Intervals are re-queued one period later.
    pub fn pop_due(&mut self, until: Millis) -> Option<(TimerId, Task)> {
        let (&(due, seq), &id) = self.queue.iter().next()?;
        if due > until {
            return None;
        }
        self.queue.remove(&(due, seq));
        self.now = self.now.max(due);

        let period = self.entries.get(&id)?.period;
        match period {
            Some(period) => {
                let seq = self.bump();
                let entry = self.entries.get_mut(&id)?;
                entry.due = due.saturating_add(period);
                entry.seq = seq;
                self.queue.insert((entry.due, seq), id);
                Some((id, entry.task.clone()))
            }
            None => self.entries.remove(&id).map(|entry| (id, entry.task)),
        }
    }

    /// Move the clock forward without firing anything. Call after draining
    /// [`pop_due`](Self::pop_due) up to the same instant.
    pub fn settle(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }

    /// Drop every pending timer.
    pub fn clear_all(&mut self) {
        self.queue.clear();
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(timers: &mut Timers, until: Millis) -> Vec<(Millis, Task)> {
        let mut fired = Vec::new();
        while let Some((_, task)) = timers.pop_due(until) {
            fired.push((timers.now(), task));
        }
        timers.settle(until);
        fired
    }

    #[test]
    fn timeouts_fire_in_deadline_order() {
        let mut timers = Timers::new();
        timers.set_timeout(300, Task::RemoveLoader);
        timers.set_timeout(100, Task::FadeLoader);
        let fired = drain(&mut timers, 1000);
        assert_eq!(
            fired,
            vec![(100, Task::FadeLoader), (300, Task::RemoveLoader)]
        );
        assert_eq!(timers.now(), 1000);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn ties_fire_in_scheduling_order() {
        let mut timers = Timers::new();
        timers.set_timeout(50, Task::MemoryCheck);
        timers.set_timeout(50, Task::AutoplayTick);
        let tasks: Vec<Task> = drain(&mut timers, 50).into_iter().map(|(_, t)| t).collect();
        assert_eq!(tasks, vec![Task::MemoryCheck, Task::AutoplayTick]);
    }

    #[test]
    fn not_due_stays_queued() {
        let mut timers = Timers::new();
        timers.set_timeout(500, Task::FadeLoader);
        assert!(drain(&mut timers, 499).is_empty());
        assert_eq!(timers.next_due(), Some(500));
        assert_eq!(drain(&mut timers, 500).len(), 1);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = Timers::new();
        let id = timers.set_timeout(100, Task::ReleaseTransition);
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(drain(&mut timers, 1000).is_empty());
    }

    #[test]
    fn interval_rearms_each_period() {
        let mut timers = Timers::new();
        let id = timers.set_interval(5000, Task::AutoplayTick);
        let fired = drain(&mut timers, 15_000);
        let times: Vec<Millis> = fired.iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![5000, 10_000, 15_000]);
        assert!(timers.is_pending(id));
        assert!(timers.cancel(id));
        assert!(drain(&mut timers, 30_000).is_empty());
    }

    #[test]
    fn delays_are_relative_to_current_clock() {
        let mut timers = Timers::new();
        timers.settle(2000);
        timers.set_timeout(100, Task::FadeLoader);
        assert_eq!(timers.next_due(), Some(2100));
    }

    #[test]
    fn clear_all_drops_everything() {
        let mut timers = Timers::new();
        timers.set_interval(10, Task::MemoryCheck);
        timers.set_timeout(10, Task::FadeLoader);
        timers.clear_all();
        assert_eq!(timers.pending(), 0);
        assert!(drain(&mut timers, 100).is_empty());
    }
}
