//! Monotonic millisecond clock and wraparound-safe intervals
//!
//! The platform supplies a free-running 32-bit millisecond counter. On
//! real hardware that is a SysTick-driven counter (Cortex-M) or MTIME
//! (RISC-V); for testing, [`SoftClock`] is a software counter advanced
//! by hand.
//!
//! The counter wraps after 2^32 ms (~49.7 days). All comparisons go
//! through wrapping subtraction, which stays correct across one wrap
//! provided no interval reaches more than 2^31 ms (~24.8 days) into the
//! future.

/// Half the counter range; deltas below this count as "not in the future"
const HALF_RANGE: u32 = 0x8000_0000;

/// Free-running millisecond counter
pub trait Clock {
    /// Current time in milliseconds, wrapping at `u32::MAX`
    fn now_ms(&self) -> u32;
}

/// Software clock for testing and simulation
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftClock {
    ms: u32,
}

impl SoftClock {
    /// Clock starting at 0 ms
    pub const fn new() -> Self {
        Self { ms: 0 }
    }

    /// Clock starting at an arbitrary counter value
    pub const fn starting_at(ms: u32) -> Self {
        Self { ms }
    }

    /// Advance time by milliseconds, wrapping at the counter width
    pub fn advance(&mut self, ms: u32) {
        self.ms = self.ms.wrapping_add(ms);
    }

    /// Set the counter to an absolute value
    pub fn set(&mut self, ms: u32) {
        self.ms = ms;
    }
}

impl Clock for SoftClock {
    fn now_ms(&self) -> u32 {
        self.ms
    }
}

/// Host clock backed by `std::time::Instant`
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Clock reading 0 ms at the moment of creation
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_ms(&self) -> u32 {
        // Truncation reproduces the wrap of a 32-bit hardware counter.
        self.origin.elapsed().as_millis() as u32
    }
}

/// Tick gate: reports each distinct clock value at most once
///
/// The outer loop polls this to run the tick handler once per real clock
/// tick, never faster than the clock resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ticker {
    last_ms: u32,
}

impl Ticker {
    /// Gate primed with the given clock value
    pub const fn new(now_ms: u32) -> Self {
        Self { last_ms: now_ms }
    }

    /// True if the clock moved since the previous positive answer
    ///
    /// Compares for inequality rather than `>` so the gate keeps firing
    /// after the counter wraps to zero.
    pub fn has_tick_elapsed(&mut self, now_ms: u32) -> bool {
        if now_ms != self.last_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Clock value of the last reported tick
    pub fn last_ms(&self) -> u32 {
        self.last_ms
    }
}

/// Absolute future time point
///
/// Created by [`Interval::start`] and later checked with
/// [`Interval::has_elapsed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interval(u32);

impl Interval {
    /// Interval ending `duration_ms` after `now_ms`
    ///
    /// One extra millisecond is added so an interval lasts at least one
    /// full tick, even for a zero duration.
    pub const fn start(now_ms: u32, duration_ms: u32) -> Self {
        Self(now_ms.wrapping_add(duration_ms).wrapping_add(1))
    }

    /// Has the interval's end been reached?
    pub const fn has_elapsed(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.0) < HALF_RANGE
    }

    /// Milliseconds left until the interval elapses (0 once elapsed)
    pub const fn remaining(&self, now_ms: u32) -> u32 {
        if self.has_elapsed(now_ms) {
            0
        } else {
            self.0.wrapping_sub(now_ms)
        }
    }

    /// Absolute counter value at which the interval elapses
    pub const fn deadline(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_clock() {
        let mut clock = SoftClock::new();
        assert_eq!(clock.now_ms(), 0);
        clock.advance(1000);
        assert_eq!(clock.now_ms(), 1000);
        clock.set(7);
        assert_eq!(clock.now_ms(), 7);
    }

    #[test]
    fn test_soft_clock_wraps() {
        let mut clock = SoftClock::starting_at(u32::MAX - 1);
        clock.advance(3);
        assert_eq!(clock.now_ms(), 1);
    }

    #[test]
    fn test_ticker_once_per_value() {
        let mut ticker = Ticker::new(0);
        assert!(!ticker.has_tick_elapsed(0));
        assert!(ticker.has_tick_elapsed(1));
        assert!(!ticker.has_tick_elapsed(1));
        assert!(ticker.has_tick_elapsed(5));
        assert_eq!(ticker.last_ms(), 5);
    }

    #[test]
    fn test_ticker_across_wrap() {
        let mut ticker = Ticker::new(u32::MAX);
        assert!(ticker.has_tick_elapsed(0));
        assert!(!ticker.has_tick_elapsed(0));
    }

    #[test]
    fn test_interval_zero_duration_lasts_one_tick() {
        let iv = Interval::start(100, 0);
        assert!(!iv.has_elapsed(100));
        assert!(iv.has_elapsed(101));
    }

    #[test]
    fn test_interval_elapses_after_duration_plus_one() {
        let iv = Interval::start(0, 50);
        assert!(!iv.has_elapsed(0));
        assert!(!iv.has_elapsed(50));
        assert!(iv.has_elapsed(51));
        assert!(iv.has_elapsed(10_000));
    }

    #[test]
    fn test_interval_across_wrap() {
        let start = u32::MAX - 10;
        let iv = Interval::start(start, 20);
        assert_eq!(iv.deadline(), 10);
        assert!(!iv.has_elapsed(start));
        assert!(!iv.has_elapsed(u32::MAX));
        assert!(!iv.has_elapsed(0));
        assert!(!iv.has_elapsed(9));
        assert!(iv.has_elapsed(10));
        assert!(iv.has_elapsed(11));
    }

    #[test]
    fn test_interval_remaining() {
        let iv = Interval::start(1000, 99);
        assert_eq!(iv.remaining(1000), 100);
        assert_eq!(iv.remaining(1050), 50);
        assert_eq!(iv.remaining(1100), 0);
        assert_eq!(iv.remaining(5000), 0);
    }

    #[test]
    fn test_interval_remaining_across_wrap() {
        let iv = Interval::start(u32::MAX, 4);
        assert_eq!(iv.remaining(u32::MAX), 5);
        assert_eq!(iv.remaining(2), 2);
    }
}
