//! Compile-time configuration
//!
//! Capacities are fixed at build time; nothing in the core allocates.

/// Event queue depth. Must cover the worst-case burst of one tick
/// (all timer expiries plus all input edges) or events are dropped.
pub const EVENT_QUEUE_SIZE: usize = 16;

/// Maximum number of processes the kernel can route messages to
pub const MAX_PROCESSES: usize = 8;

/// Debounce window: number of consecutive samples inspected per input
pub const DEBOUNCE_SAMPLES: u8 = 3;

/// Mask selecting the debounce window from the shift register
pub const DEBOUNCE_MASK: u8 = (1 << DEBOUNCE_SAMPLES) - 1;

/// How the tick handler spreads its work across clock ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickMode {
    /// Sweep timers and scan inputs on every tick
    #[default]
    Combined,
    /// Sweep timers on even ticks, scan inputs on odd ticks.
    ///
    /// Halves the per-tick cost; every timer and input is still serviced
    /// within two ticks of the event it depends on.
    Alternating,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_mask() {
        assert_eq!(DEBOUNCE_MASK, 0b111);
    }

    #[test]
    fn test_default_tick_mode() {
        assert_eq!(TickMode::default(), TickMode::Combined);
    }
}
