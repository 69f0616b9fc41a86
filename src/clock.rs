//! Time sources that drive envelopes.
//!
//! Envelopes measure every duration in [`Ticks`] of a single [`Resolution`].
//! The resolution fixes how milliseconds convert to ticks and how long a
//! phase may be before its time-to-index mapping leaves the fixed-point path,
//! so the same clock must be used for configuring and for sampling.

use std::cell::Cell;
use std::time::Instant;

/// A timestamp or duration in clock ticks.
///
/// Ticks wrap around like a hardware counter; envelopes compute elapsed time
/// with wrapping subtraction, so a wrap between two samples is harmless.
pub type Ticks = u32;

/// Resolution of a clock's ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Resolution {
    /// One tick per microsecond. The counter wraps after about 71 minutes.
    Micros,
    /// One tick per millisecond.
    Millis,
}

impl Resolution {
    /// Number of ticks in one millisecond.
    pub const fn ticks_per_ms(self) -> u32 {
        match self {
            Resolution::Micros => 1_000,
            Resolution::Millis => 1,
        }
    }

    /// Converts milliseconds to ticks, saturating at `Ticks::MAX`.
    ///
    /// # Examples
    ///
    /// ```
    /// use contour::Resolution;
    ///
    /// assert_eq!(Resolution::Micros.ms_to_ticks(100), 100_000);
    /// assert_eq!(Resolution::Millis.ms_to_ticks(100), 100);
    /// assert_eq!(Resolution::Micros.ms_to_ticks(u32::MAX), u32::MAX);
    /// ```
    pub const fn ms_to_ticks(self, ms: u32) -> Ticks {
        ms.saturating_mul(self.ticks_per_ms())
    }

    /// Longest phase duration (two seconds) that still maps time to a table
    /// index through the fixed-point scale. Longer phases use exact division.
    pub const fn fixed_point_ceiling(self) -> Ticks {
        self.ms_to_ticks(2_000)
    }
}

/// Source of monotonic time for an envelope.
pub trait Clock {
    /// Resolution of the ticks returned by [`now`](Clock::now).
    fn resolution(&self) -> Resolution;

    /// Current time in ticks.
    fn now(&self) -> Ticks;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn resolution(&self) -> Resolution {
        (**self).resolution()
    }

    fn now(&self) -> Ticks {
        (**self).now()
    }
}

/// Clock backed by [`Instant`], counting from its own creation.
///
/// # Examples
///
/// ```
/// use contour::{Clock, MonotonicClock, Resolution};
///
/// let clock = MonotonicClock::micros();
/// assert_eq!(clock.resolution(), Resolution::Micros);
/// let earlier = clock.now();
/// assert!(clock.now().wrapping_sub(earlier) < 1_000_000);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
    resolution: Resolution,
}

impl MonotonicClock {
    /// Creates a clock whose tick zero is now.
    pub fn new(resolution: Resolution) -> Self {
        Self {
            origin: Instant::now(),
            resolution,
        }
    }

    /// Creates a microsecond clock.
    pub fn micros() -> Self {
        Self::new(Resolution::Micros)
    }

    /// Creates a millisecond clock.
    pub fn millis() -> Self {
        Self::new(Resolution::Millis)
    }
}

impl Clock for MonotonicClock {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn now(&self) -> Ticks {
        let elapsed = self.origin.elapsed();
        // Truncation to the tick width is the wrap-around
        match self.resolution {
            Resolution::Micros => elapsed.as_micros() as Ticks,
            Resolution::Millis => elapsed.as_millis() as Ticks,
        }
    }
}

/// Clock that only moves when told to.
///
/// Useful when the host already has a timestamp for each event (a sample
/// counter, a sequencer position) and in tests.
///
/// # Examples
///
/// ```
/// use contour::{Clock, ManualClock};
///
/// let clock = ManualClock::millis();
/// assert_eq!(clock.now(), 0);
/// clock.advance(250);
/// assert_eq!(clock.now(), 250);
/// clock.set(10);
/// assert_eq!(clock.now(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<Ticks>,
    resolution: Resolution,
}

impl ManualClock {
    /// Creates a clock stopped at tick zero.
    pub fn new(resolution: Resolution) -> Self {
        Self {
            now: Cell::new(0),
            resolution,
        }
    }

    /// Creates a microsecond clock stopped at tick zero.
    pub fn micros() -> Self {
        Self::new(Resolution::Micros)
    }

    /// Creates a millisecond clock stopped at tick zero.
    pub fn millis() -> Self {
        Self::new(Resolution::Millis)
    }

    /// Moves the clock to `ticks`.
    pub fn set(&self, ticks: Ticks) {
        self.now.set(ticks);
    }

    /// Moves the clock forward by `ticks`, wrapping like a hardware counter.
    pub fn advance(&self, ticks: Ticks) {
        self.now.set(self.now.get().wrapping_add(ticks));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::micros()
    }
}

impl Clock for ManualClock {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn now(&self) -> Ticks {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_per_ms() {
        assert_eq!(Resolution::Micros.ticks_per_ms(), 1_000);
        assert_eq!(Resolution::Millis.ticks_per_ms(), 1);
    }

    #[test]
    fn test_fixed_point_ceiling_is_two_seconds() {
        assert_eq!(Resolution::Micros.fixed_point_ceiling(), 2_000_000);
        assert_eq!(Resolution::Millis.fixed_point_ceiling(), 2_000);
    }

    #[test]
    fn test_manual_clock_wraps() {
        let clock = ManualClock::micros();
        clock.set(Ticks::MAX - 5);
        clock.advance(10);
        assert_eq!(clock.now(), 4);
    }

    #[test]
    fn test_clock_through_reference() {
        let clock = ManualClock::millis();
        clock.set(42);
        let by_ref: &ManualClock = &clock;
        assert_eq!(Clock::now(&by_ref), 42);
        assert_eq!(Clock::resolution(&by_ref), Resolution::Millis);
    }

    #[test]
    fn test_monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::millis();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
