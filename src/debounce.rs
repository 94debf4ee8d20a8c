//! Debounced digital inputs
//!
//! Each input keeps a shift register of its last three raw samples.
//! Only clean patterns change the recorded level:
//!
//! | window | meaning                                           |
//! |--------|---------------------------------------------------|
//! | `000`  | stays low                                         |
//! | `111`  | stays high; drives auto-repeat while held         |
//! | `011`  | rising edge (reported if the level was low)       |
//! | `100`  | falling edge (reported if the level was high)     |
//! | other  | bouncing, ignored                                 |
//!
//! Scanning only marks inputs as changed; [`InputScanner::report`] turns
//! the marks into queued messages. Polarity (active-low wiring etc.) is
//! the sample source's business: a `true` sample means "asserted".

use crate::config::DEBOUNCE_MASK;
use crate::message::{EventId, Message, ProcessId, INPUT_ACTIVE, INPUT_INACTIVE};
use crate::queue::EventQueue;

const STABLE_LOW: u8 = 0b000;
const STABLE_HIGH: u8 = 0b111;
const RISING: u8 = 0b011;
const FALLING: u8 = 0b100;

/// Raw sample provider, polled once per scan for each input
pub trait InputSource {
    /// Is input `index` currently asserted?
    fn sample(&mut self, index: usize) -> bool;
}

impl<F: FnMut(usize) -> bool> InputSource for F {
    fn sample(&mut self, index: usize) -> bool {
        self(index)
    }
}

/// Routing of one input's change reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputConfig {
    /// Recipient; [`ProcessId::UNDEFINED`] silences the input
    pub process: ProcessId,
    /// Event tag of the reports
    pub event: EventId,
    /// Auto-repeat period in scans while held high, None for no repeat
    pub auto_repeat: Option<u16>,
    /// Parameter sent when the input goes low
    pub param_low: u32,
    /// Parameter sent when the input goes high
    pub param_high: u32,
}

impl InputConfig {
    /// Key routed to `process`, reporting `INPUT_ACTIVE`/`INPUT_INACTIVE`
    pub const fn key(process: ProcessId, event: EventId) -> Self {
        Self {
            process,
            event,
            auto_repeat: None,
            param_low: INPUT_INACTIVE,
            param_high: INPUT_ACTIVE,
        }
    }

    /// Same input, repeating every `period` scans while held
    pub const fn with_auto_repeat(mut self, period: u16) -> Self {
        self.auto_repeat = if period == 0 { None } else { Some(period) };
        self
    }

    /// Same input, with custom report parameters
    pub const fn with_params(mut self, param_low: u32, param_high: u32) -> Self {
        self.param_low = param_low;
        self.param_high = param_high;
        self
    }

    /// Input that is scanned but never reported
    pub const fn unrouted() -> Self {
        Self::key(ProcessId::UNDEFINED, EventId::NONE)
    }
}

/// Debounced input level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputLevel {
    #[default]
    Low,
    High,
}

/// Per-input filter state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputState {
    /// Last raw samples, newest in bit 0
    shift_reg: u8,
    /// Pending report
    changed: bool,
    /// Debounced level
    level: InputLevel,
    /// Scans spent high since the last edge or repeat
    time_active: u16,
}

impl InputState {
    /// Low, no pending report
    pub const fn new() -> Self {
        Self {
            shift_reg: 0,
            changed: false,
            level: InputLevel::Low,
            time_active: 0,
        }
    }

    pub fn level(&self) -> InputLevel {
        self.level
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Shift in one raw sample and classify the window
    fn scan(&mut self, sample: bool, auto_repeat: Option<u16>) {
        self.shift_reg = ((self.shift_reg << 1) | sample as u8) & DEBOUNCE_MASK;

        match self.shift_reg {
            STABLE_LOW => {}
            STABLE_HIGH => {
                if let Some(period) = auto_repeat {
                    if self.level == InputLevel::High {
                        self.time_active = self.time_active.saturating_add(1);
                        if self.time_active >= period {
                            self.time_active = 0;
                            self.changed = true;
                        }
                    }
                }
            }
            RISING => {
                if self.level != InputLevel::High {
                    self.level = InputLevel::High;
                    self.changed = true;
                    self.time_active = 0;
                }
            }
            FALLING => {
                if self.level != InputLevel::Low {
                    self.level = InputLevel::Low;
                    self.changed = true;
                }
            }
            _ => {} // Bouncing
        }
    }
}

/// Debounce filter for `N` inputs with a static routing table
pub struct InputScanner<const N: usize> {
    config: [InputConfig; N],
    states: [InputState; N],
}

impl<const N: usize> InputScanner<N> {
    /// All inputs low, nothing pending
    pub const fn new(config: [InputConfig; N]) -> Self {
        Self {
            config,
            states: [InputState::new(); N],
        }
    }

    /// Number of inputs
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Routing entry of input `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn config(&self, index: usize) -> &InputConfig {
        &self.config[index]
    }

    /// Filter state of input `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn state(&self, index: usize) -> &InputState {
        &self.states[index]
    }

    /// Debounced level of input `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn level(&self, index: usize) -> InputLevel {
        self.states[index].level
    }

    /// Feed one raw sample to input `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn scan(&mut self, index: usize, sample: bool) {
        let auto_repeat = self.config[index].auto_repeat;
        self.states[index].scan(sample, auto_repeat);
    }

    /// Sample and scan every input in index order
    pub fn scan_all<S: InputSource + ?Sized>(&mut self, source: &mut S) {
        for index in 0..N {
            let sample = source.sample(index);
            self.scan(index, sample);
        }
    }

    /// Queue a message for every changed input and clear its mark
    ///
    /// Inputs routed to [`ProcessId::UNDEFINED`] keep their mark and stay
    /// silent. Returns the number of messages posted.
    pub fn report<const Q: usize>(&mut self, queue: &mut EventQueue<Q>) -> usize {
        let mut posted = 0;

        for (config, state) in self.config.iter().zip(self.states.iter_mut()) {
            if !state.changed || !config.process.is_defined() {
                continue;
            }
            let param = match state.level {
                InputLevel::Low => config.param_low,
                InputLevel::High => config.param_high,
            };
            debug!("input {} reports {}", config.event.0, param);
            queue.push(config.process, Message::new(config.event, param));
            state.changed = false;
            posted += 1;
        }
        posted
    }

    /// Force a report of input `index` and flush all pending reports
    ///
    /// Used to obtain the current level without waiting for an edge.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn force_update<const Q: usize>(&mut self, index: usize, queue: &mut EventQueue<Q>) -> usize {
        debug!("forced report of input {}", index);
        self.states[index].changed = true;
        self.report(queue)
    }

    /// Settle the filter on the inputs' current levels
    ///
    /// Scans a full debounce window and then discards the resulting
    /// marks, so the boot state is not reported as an edge.
    pub fn prime<S: InputSource + ?Sized>(&mut self, source: &mut S) {
        for _ in 0..crate::config::DEBOUNCE_SAMPLES {
            self.scan_all(source);
        }
        for state in self.states.iter_mut() {
            state.changed = false;
        }
    }
}
