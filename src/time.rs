//! Time abstraction traits for platform-agnostic timing.
//!
//! The firmware clock is a free-running millisecond counter that wraps at its
//! width. All comparisons go through [`TimeInstant::duration_since`], which
//! implementations must compute as a wrapping difference.

/// Trait for abstracting time sources.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;
}

/// Trait abstraction for instant types.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    ///
    /// Must stay correct across counter wraparound.
    fn duration_since(&self, earlier: Self) -> Self::Duration;
}

/// Millisecond duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Millis(pub u64);

impl TimeDuration for Millis {
    fn as_millis(&self) -> u64 {
        self.0
    }
}

/// Instant read from a 32-bit millisecond counter.
///
/// Wraps after ~49.7 days, like the tick counters on small MCUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickInstant(pub u32);

impl TickInstant {
    /// Returns the raw counter value.
    pub fn as_millis(&self) -> u32 {
        self.0
    }
}

impl TimeInstant for TickInstant {
    type Duration = Millis;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        Millis(self.0.wrapping_sub(earlier.0) as u64)
    }
}

/// Milliseconds elapsed between two instants.
#[inline]
pub(crate) fn elapsed_millis<I: TimeInstant>(now: I, earlier: I) -> u64 {
    now.duration_since(earlier).as_millis()
}

/// Rate limiter for "run at most once per period" tasks.
///
/// The next period is measured from the instant the task actually ran, so
/// iterations skipped while the loop was busy (or asleep) never pile up into
/// a burst of catch-up runs.
#[derive(Debug, Clone, Copy)]
pub struct Interval<I> {
    period_ms: u64,
    last: Option<I>,
}

impl<I: TimeInstant> Interval<I> {
    /// Creates an interval that is due on its first check.
    pub const fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            last: None,
        }
    }

    /// Creates an interval whose first run is one full period after `now`.
    pub fn starting_at(period_ms: u64, now: I) -> Self {
        Self {
            period_ms,
            last: Some(now),
        }
    }

    /// Returns true and restarts the period if the task should run now.
    pub fn due(&mut self, now: I) -> bool {
        match self.last {
            Some(last) if elapsed_millis(now, last) < self.period_ms => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
