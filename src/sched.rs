//! Periodic tick scheduling.
//!
//! The simulation owns exactly one cancelable periodic task. Changing the
//! period is always cancel-then-start, never a second timer.

use std::time::{Duration, Instant};

/// Poll timeout used while no timer is running (paused, game over).
pub const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

pub trait Scheduler {
    /// Starts a periodic task firing every `period`.
    fn start(&mut self, period: Duration) -> TimerId;

    /// Stops the task. Unknown or already cancelled ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

struct Interval {
    id: TimerId,
    period: Duration,
    next: Instant,
}

/// Wall-clock scheduler with a single slot, polled by the event loop.
pub struct IntervalTimer {
    next_id: u64,
    current: Option<Interval>,
    clock: fn() -> Instant,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self::with_clock(Instant::now)
    }

    pub fn with_clock(clock: fn() -> Instant) -> Self {
        IntervalTimer { next_id: 0, current: None, clock }
    }

    pub fn period(&self) -> Option<Duration> {
        self.current.as_ref().map(|i| i.period)
    }

    pub fn active(&self) -> Option<TimerId> {
        self.current.as_ref().map(|i| i.id)
    }

    /// True when a period has elapsed by `now`; consumes that tick.
    ///
    /// After a stall the deadline restarts from `now` so missed periods are
    /// dropped instead of fired in a burst.
    pub fn due(&mut self, now: Instant) -> bool {
        let interval = match &mut self.current {
            Some(interval) if now >= interval.next => interval,
            _ => return false,
        };

        interval.next += interval.period;
        if interval.next <= now {
            interval.next = now + interval.period;
        }
        true
    }

    /// How long the event loop may block before the next tick is due.
    pub fn timeout(&self, now: Instant) -> Duration {
        match &self.current {
            Some(interval) => interval.next.saturating_duration_since(now),
            None => IDLE_POLL,
        }
    }
}

impl Default for IntervalTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for IntervalTimer {
    fn start(&mut self, period: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let next = (self.clock)() + period;
        self.current = Some(Interval { id, period, next });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if self.active() == Some(id) {
            self.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    const MS: Duration = Duration::from_millis(1);

    fn epoch() -> Instant {
        static EPOCH: OnceLock<Instant> = OnceLock::new();
        *EPOCH.get_or_init(Instant::now)
    }

    #[test]
    fn fires_once_per_period() {
        let mut timer = IntervalTimer::with_clock(epoch);
        let start = epoch();
        timer.start(100 * MS);

        assert!(!timer.due(start));
        assert!(timer.due(start + 150 * MS));
        assert!(!timer.due(start + 150 * MS));
        assert!(timer.due(start + 220 * MS));
    }

    #[test]
    fn long_stall_does_not_burst() {
        let mut timer = IntervalTimer::with_clock(epoch);
        let start = epoch();
        timer.start(100 * MS);

        let late = start + 1_000 * MS;
        assert!(timer.due(late));
        assert!(!timer.due(late));
        assert_eq!(timer.timeout(late), 100 * MS);
    }

    #[test]
    fn start_replaces_and_stale_cancel_is_ignored() {
        let mut timer = IntervalTimer::new();
        let first = timer.start(120 * MS);
        let second = timer.start(112 * MS);
        assert_ne!(first, second);
        assert_eq!(timer.active(), Some(second));

        timer.cancel(first);
        assert_eq!(timer.period(), Some(112 * MS));

        timer.cancel(second);
        assert_eq!(timer.active(), None);
        assert!(!timer.due(Instant::now() + 1_000 * MS));
        assert_eq!(timer.timeout(Instant::now()), IDLE_POLL);
    }
}
