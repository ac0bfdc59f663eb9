//! Tick scheduling: wall time to whole ticks, and the live schedule generation.
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Converts elapsed time into whole ticks, carrying the remainder forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickClock {
    period: Duration,
    carry: Duration,
}

impl TickClock {
    /// Clock firing every `period_ms` milliseconds (at least 1ms).
    #[must_use]
    pub fn new(period_ms: u64) -> Self {
        Self {
            period: Duration::from_millis(period_ms.max(1)),
            carry: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Time accumulated towards the next tick.
    #[must_use]
    pub const fn pending(&self) -> Duration {
        self.carry
    }

    /// Add `elapsed` and return how many ticks are now due.
    pub fn advance(&mut self, elapsed: Duration) -> u64 {
        let total = self.carry.saturating_add(elapsed);
        let period_nanos = self.period.as_nanos();
        let due = total.as_nanos() / period_nanos;
        let rest = total.as_nanos() % period_nanos;
        // `rest` is below one period, which always fits in u64 nanoseconds.
        self.carry = Duration::from_nanos(u64::try_from(rest).unwrap_or(0));
        u64::try_from(due).unwrap_or(u64::MAX)
    }

    /// Drop any accumulated remainder.
    pub fn reset(&mut self) {
        self.carry = Duration::ZERO;
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(crate::constants::TICK_PERIOD_MS)
    }
}

/// Tracks the single live tick source. Each start issues a new generation;
/// stopping cancels it, and stale generations never become live again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSchedule {
    issued: u64,
    live: Option<u64>,
}

impl TickSchedule {
    /// Cancel any live generation and start a fresh one.
    pub fn start(&mut self) -> u64 {
        self.issued = self.issued.wrapping_add(1);
        self.live = Some(self.issued);
        self.issued
    }

    /// Cancel the live generation, returning it if there was one.
    pub fn cancel(&mut self) -> Option<u64> {
        self.live.take()
    }

    #[must_use]
    pub const fn live(&self) -> Option<u64> {
        self.live
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.live.is_some()
    }

    /// Whether ticks tagged with `generation` may still run.
    #[must_use]
    pub fn accepts(&self, generation: u64) -> bool {
        self.live == Some(generation)
    }

    /// Number of generations issued so far.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_counts_whole_periods() {
        let mut clock = TickClock::new(100);
        assert_eq!(clock.advance(Duration::from_millis(250)), 2);
        assert_eq!(clock.pending(), Duration::from_millis(50));
        assert_eq!(clock.advance(Duration::from_millis(50)), 1);
        assert_eq!(clock.pending(), Duration::ZERO);
    }

    #[test]
    fn clock_accumulates_small_steps() {
        let mut clock = TickClock::new(100);
        let due: u64 = (0..10)
            .map(|_| clock.advance(Duration::from_millis(33)))
            .sum();
        assert_eq!(due, 3);
        assert_eq!(clock.pending(), Duration::from_millis(30));
        clock.reset();
        assert_eq!(clock.pending(), Duration::ZERO);
    }

    #[test]
    fn clock_rejects_zero_period() {
        let clock = TickClock::new(0);
        assert_eq!(clock.period(), Duration::from_millis(1));
    }

    #[test]
    fn restart_invalidates_previous_generation() {
        let mut schedule = TickSchedule::default();
        let first = schedule.start();
        let second = schedule.start();
        assert_ne!(first, second);
        assert!(!schedule.accepts(first));
        assert!(schedule.accepts(second));
        assert_eq!(schedule.issued(), 2);
    }

    #[test]
    fn cancel_leaves_nothing_live() {
        let mut schedule = TickSchedule::default();
        let generation = schedule.start();
        assert_eq!(schedule.cancel(), Some(generation));
        assert_eq!(schedule.cancel(), None);
        assert!(!schedule.is_active());
        assert!(!schedule.accepts(generation));
    }
}
