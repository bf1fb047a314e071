//! Rate limiting for high-frequency event handlers.
//!
//! Both utilities are clock-driven state rather than wrappers around
//! closures: the caller asks whether the wrapped work should run at `now`.

use crate::types::Millis;

/// Leading-edge throttle. The first call in each window runs; calls made
/// before the window closes are dropped, not deferred.
#[derive(Debug, Clone)]
pub struct Throttle {
    limit: Millis,
    open_at: Option<Millis>,
}

impl Throttle {
    pub fn new(limit: Millis) -> Self {
        Self {
            limit,
            open_at: None,
        }
    }

    /// Returns true if the wrapped work should run now, starting a new window.
    pub fn try_acquire(&mut self, now: Millis) -> bool {
        match self.open_at {
            Some(open_at) if now < open_at => false,
            _ => {
                self.open_at = Some(now.saturating_add(self.limit));
                true
            }
        }
    }
}

/// Debounce with optional leading-edge invocation.
///
/// Every [`call`](Self::call) pushes the deadline `wait` ms into the future.
/// Without `immediate`, the work runs once when the deadline passes
/// (reported by [`poll`](Self::poll)). With `immediate`, the work runs on the
/// first call of a burst and the trailing edge is suppressed.
#[derive(Debug, Clone)]
pub struct Debounce {
    wait: Millis,
    immediate: bool,
    deadline: Option<Millis>,
}

impl Debounce {
    pub fn new(wait: Millis, immediate: bool) -> Self {
        Self {
            wait,
            immediate,
            deadline: None,
        }
    }

    /// Register a call at `now`. Returns true if the work should run right away.
    pub fn call(&mut self, now: Millis) -> bool {
        let call_now = self.immediate && self.deadline.is_none();
        self.deadline = Some(now.saturating_add(self.wait));
        call_now
    }

    /// Returns true exactly once when a pending trailing call is due.
    pub fn poll(&mut self, now: Millis) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                !self.immediate
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_runs_first_call_and_drops_the_rest() {
        let mut throttle = Throttle::new(100);
        assert!(throttle.try_acquire(0));
        assert!(!throttle.try_acquire(10));
        assert!(!throttle.try_acquire(99));
        assert!(throttle.try_acquire(100));
        assert!(!throttle.try_acquire(150));
        assert!(throttle.try_acquire(250));
    }

    #[test]
    fn trailing_debounce_fires_once_after_quiet_period() {
        let mut debounce = Debounce::new(200, false);
        assert!(!debounce.call(0));
        assert!(!debounce.call(150));
        assert!(!debounce.poll(300));
        assert!(debounce.poll(350));
        assert!(!debounce.poll(400));
        assert_eq!(debounce.deadline(), None);
    }

    #[test]
    fn immediate_debounce_fires_on_leading_edge_only() {
        let mut debounce = Debounce::new(200, true);
        assert!(debounce.call(0));
        assert!(!debounce.call(50));
        assert!(!debounce.poll(250));
        // Burst ended; the next call leads again.
        assert!(debounce.call(400));
    }
}
