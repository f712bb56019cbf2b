//! Time-based coalescing of rapid events.
//!
//! Both primitives are driven by explicit [`Instant`]s so they can be
//! stepped deterministically; the runtime feeds them `Instant::now()` and
//! sleeps until [`Debouncer::deadline`] / [`Throttle::deadline`].

use std::time::Duration;

use tokio::time::Instant;

/// A single owned, restartable deadline.
///
/// Every [`schedule`](Self::schedule) replaces the previous deadline, so a
/// burst of events fires once, `delay` after the last of them.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending deadline and start a new one from `now`.
    pub fn schedule(&mut self, now: Instant) -> Instant {
        let deadline = now + self.delay;
        self.deadline = Some(deadline);
        deadline
    }

    /// Drop the pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the deadline if it has elapsed at `now`.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Fixed-interval throttle with leading and trailing edges.
///
/// The first value offered in a quiet period is emitted immediately. Values
/// offered within `interval` of the last emission are held, newest wins,
/// and emitted once the interval has passed.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last_emit: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            pending: None,
        }
    }

    /// Offer a value. Returns it back if it should be applied right away.
    pub fn offer(&mut self, value: T, now: Instant) -> Option<T> {
        let open = self
            .last_emit
            .is_none_or(|last| now >= last + self.interval);
        if open {
            self.last_emit = Some(now);
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// When the held value becomes due, if one is held.
    pub fn deadline(&self) -> Option<Instant> {
        match (&self.pending, self.last_emit) {
            (Some(_), Some(last)) => Some(last + self.interval),
            _ => None,
        }
    }

    /// Emit the held value if its trailing edge has been reached.
    pub fn fire_if_due(&mut self, now: Instant) -> Option<T> {
        let due = self.deadline().is_some_and(|deadline| deadline <= now);
        if due {
            self.last_emit = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    /// Emit the held value immediately and start a fresh quiet period.
    pub fn flush(&mut self) -> Option<T> {
        self.last_emit = None;
        self.pending.take()
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_debounce_fires_once_after_last_schedule() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(100 * MS);

        debouncer.schedule(start);
        debouncer.schedule(start + 40 * MS);
        let deadline = debouncer.schedule(start + 80 * MS);
        assert_eq!(deadline, start + 180 * MS);

        assert!(!debouncer.fire_if_due(start + 150 * MS));
        assert!(debouncer.fire_if_due(start + 180 * MS));
        assert!(!debouncer.fire_if_due(start + 500 * MS));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_debounce_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(100 * MS);
        assert!(!debouncer.cancel());
        debouncer.schedule(start);
        assert!(debouncer.cancel());
        assert!(!debouncer.fire_if_due(start + 200 * MS));
    }

    #[test]
    fn test_throttle_leading_and_trailing() {
        let start = Instant::now();
        let mut throttle = Throttle::new(100 * MS);

        assert_eq!(throttle.offer(1, start), Some(1));
        assert_eq!(throttle.offer(2, start + 10 * MS), None);
        assert_eq!(throttle.offer(3, start + 20 * MS), None);
        assert_eq!(throttle.deadline(), Some(start + 100 * MS));

        assert_eq!(throttle.fire_if_due(start + 50 * MS), None);
        assert_eq!(throttle.fire_if_due(start + 100 * MS), Some(3));
        assert_eq!(throttle.deadline(), None);

        // window restarted at the trailing emission
        assert_eq!(throttle.offer(4, start + 150 * MS), None);
        assert_eq!(throttle.offer(5, start + 200 * MS), Some(5));
    }

    #[test]
    fn test_throttle_flush() {
        let start = Instant::now();
        let mut throttle = Throttle::new(100 * MS);
        throttle.offer(1, start);
        throttle.offer(2, start + 10 * MS);

        assert_eq!(throttle.flush(), Some(2));
        assert!(!throttle.has_pending());
        assert_eq!(throttle.offer(3, start + 20 * MS), Some(3));
    }
}
