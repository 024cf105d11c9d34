//! Logical clock and timer wheel.
//!
//! All periodic behaviour (physiology drift, workout steps, notice expiry,
//! the loading bar) runs off one simulated clock, so a test or the CLI can
//! drive time explicitly with [`Scheduler::next_due`].
//!
//! Timers are tagged with a [`TimerScope`]. A screen or subsystem that goes
//! away cancels its whole scope, leaving no orphaned timers behind.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Handle for cancelling a single timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

/// Notice channels, one status line per page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeChannel {
    Search,
    Fitness,
    MealPlans,
}

/// Owner of a group of timers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerScope {
    Loading,
    Main,
    Workout,
    DeviceScan,
    Notice(NoticeChannel),
}

#[derive(Debug)]
struct Timer<E> {
    id: TimerId,
    scope: TimerScope,
    event: E,
    period: Option<u64>,
}

/// Deterministic single-threaded timer queue over a millisecond clock
#[derive(Debug)]
pub struct Scheduler<E> {
    now: u64,
    next_seq: u64,
    // Keyed by (due time, creation sequence): equal due times fire in order.
    queue: BTreeMap<(u64, u64), Timer<E>>,
    index: HashMap<TimerId, (u64, u64)>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_seq: 0,
            queue: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    /// Current simulated time in milliseconds
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of armed timers
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of armed timers in a scope
    pub fn count_scope(&self, scope: TimerScope) -> usize {
        self.queue.values().filter(|t| t.scope == scope).count()
    }

    /// Fire `event` once, `delay_ms` from now
    pub fn schedule_once(&mut self, delay_ms: u64, scope: TimerScope, event: E) -> TimerId {
        self.insert(self.now.saturating_add(delay_ms), scope, event, None)
    }

    /// Fire `event` every `period_ms`, first after one period
    ///
    /// A zero period is treated as 1 ms.
    pub fn schedule_every(&mut self, period_ms: u64, scope: TimerScope, event: E) -> TimerId {
        let period = period_ms.max(1);
        self.insert(self.now.saturating_add(period), scope, event, Some(period))
    }

    /// Cancel one timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.index.remove(&id) {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    /// Cancel every timer owned by `scope`, returning how many were armed
    pub fn cancel_scope(&mut self, scope: TimerScope) -> usize {
        let keys: Vec<_> = self
            .queue
            .iter()
            .filter(|(_, t)| t.scope == scope)
            .map(|(k, _)| *k)
            .collect();

        for key in &keys {
            if let Some(timer) = self.queue.remove(key) {
                self.index.remove(&timer.id);
            }
        }

        if !keys.is_empty() {
            tracing::debug!("Cancelled {} timers in scope {:?}", keys.len(), scope);
        }
        keys.len()
    }

    /// Drop every timer
    pub fn clear(&mut self) {
        self.queue.clear();
        self.index.clear();
    }

    /// Move the clock forward without firing anything
    ///
    /// Callers drain [`next_due`](Self::next_due) first; the clock never
    /// moves backwards.
    pub fn advance_to(&mut self, target: u64) {
        self.now = self.now.max(target);
    }

    fn insert(&mut self, due: u64, scope: TimerScope, event: E, period: Option<u64>) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = TimerId(seq);
        self.queue.insert(
            (due, seq),
            Timer {
                id,
                scope,
                event,
                period,
            },
        );
        self.index.insert(id, (due, seq));
        id
    }
}

impl<E: Clone> Scheduler<E> {
    /// Pop the earliest timer due at or before `until`
    ///
    /// The clock jumps to the timer's due time. Interval timers are re-armed
    /// (keeping their id) before the event is handed back, so a handler may
    /// cancel them.
    pub fn next_due(&mut self, until: u64) -> Option<(TimerId, E)> {
        let (&key, _) = self.queue.iter().next()?;
        if key.0 > until {
            return None;
        }

        let timer = self.queue.remove(&key)?;
        let id = timer.id;
        self.index.remove(&id);
        self.now = self.now.max(key.0);

        let event = timer.event.clone();
        if let Some(period) = timer.period {
            let seq = self.next_seq;
            self.next_seq += 1;
            let next_key = (key.0.saturating_add(period), seq);
            self.index.insert(id, next_key);
            self.queue.insert(next_key, timer);
        }
        Some((id, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Ev {
        A,
        B,
        Tick,
    }

    fn drain(s: &mut Scheduler<Ev>, until: u64) -> Vec<(u64, Ev)> {
        let mut fired = Vec::new();
        while let Some((_, ev)) = s.next_due(until) {
            fired.push((s.now(), ev));
        }
        s.advance_to(until);
        fired
    }

    #[test]
    fn test_once_fires_at_due_time() {
        let mut s = Scheduler::new();
        s.schedule_once(100, TimerScope::Main, Ev::A);

        assert!(drain(&mut s, 99).is_empty());
        assert_eq!(s.now(), 99);
        assert_eq!(drain(&mut s, 100), vec![(100, Ev::A)]);
        assert!(s.is_empty());
    }

    #[test]
    fn test_equal_due_times_fire_in_creation_order() {
        let mut s = Scheduler::new();
        s.schedule_once(50, TimerScope::Main, Ev::B);
        s.schedule_once(50, TimerScope::Main, Ev::A);
        s.schedule_once(10, TimerScope::Main, Ev::Tick);

        let fired: Vec<_> = drain(&mut s, 50).into_iter().map(|(_, e)| e).collect();
        assert_eq!(fired, vec![Ev::Tick, Ev::B, Ev::A]);
    }

    #[test]
    fn test_interval_rearms() {
        let mut s = Scheduler::new();
        let id = s.schedule_every(30, TimerScope::Main, Ev::Tick);

        let fired = drain(&mut s, 95);
        assert_eq!(
            fired,
            vec![(30, Ev::Tick), (60, Ev::Tick), (90, Ev::Tick)]
        );
        assert_eq!(s.len(), 1);
        assert!(s.cancel(id));
        assert!(drain(&mut s, 1_000).is_empty());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut s = Scheduler::new();
        let id = s.schedule_once(10, TimerScope::Main, Ev::A);
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        assert!(drain(&mut s, 100).is_empty());
    }

    #[test]
    fn test_cancel_scope_leaves_other_scopes() {
        let mut s = Scheduler::new();
        s.schedule_every(800, TimerScope::Workout, Ev::Tick);
        s.schedule_once(5_000, TimerScope::Notice(NoticeChannel::Fitness), Ev::A);
        s.schedule_every(30_000, TimerScope::Main, Ev::B);

        assert_eq!(s.cancel_scope(TimerScope::Workout), 1);
        assert_eq!(s.count_scope(TimerScope::Workout), 0);
        assert_eq!(s.len(), 2);
        assert_eq!(s.cancel_scope(TimerScope::Workout), 0);
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut s: Scheduler<Ev> = Scheduler::new();
        s.advance_to(500);
        s.advance_to(100);
        assert_eq!(s.now(), 500);

        s.schedule_once(0, TimerScope::Main, Ev::A);
        assert_eq!(drain(&mut s, 500), vec![(500, Ev::A)]);
    }

    #[test]
    fn test_zero_period_does_not_spin() {
        let mut s = Scheduler::new();
        s.schedule_every(0, TimerScope::Main, Ev::Tick);
        assert_eq!(drain(&mut s, 3).len(), 3);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut s = Scheduler::new();
        s.schedule_every(1, TimerScope::Main, Ev::Tick);
        s.schedule_once(1, TimerScope::Loading, Ev::A);
        s.clear();
        assert!(s.is_empty());
        assert!(drain(&mut s, 10).is_empty());
    }
}
