//! Software timer table — one-shot timers delivering messages on expiry
//!
//! Static table indexed by [`TimerId`], no allocation. Timers are swept
//! from the tick handler; an expired timer posts its message to the
//! event queue and disarms itself.
//!
//! Stopping a timer does not retract a message it already posted: a
//! timer that expired in the last sweep can still deliver after `stop`.

use crate::clock::Interval;
use crate::message::{Message, ProcessId, TimerId};
use crate::queue::EventQueue;

/// One timer slot
#[derive(Debug, Clone, Copy)]
pub struct TimerSlot {
    /// Slot is armed
    active: bool,
    /// Expiry time
    interval: Interval,
    /// Recipient and message, set by the first `start`
    target: Option<(ProcessId, Message)>,
}

impl TimerSlot {
    /// Never-started slot
    pub const fn empty() -> Self {
        Self {
            active: false,
            interval: Interval::start(0, 0),
            target: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Fixed table of `N` named timers
pub struct TimerTable<const N: usize> {
    slots: [TimerSlot; N],
}

impl<const N: usize> TimerTable<N> {
    /// All timers disarmed
    pub const fn new() -> Self {
        Self {
            slots: [TimerSlot::empty(); N],
        }
    }

    /// Arm timer `id` to post `message` to `process` after `duration_ms`
    ///
    /// Re-arming a running timer replaces its expiry, recipient and message.
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside the table.
    pub fn start(
        &mut self,
        id: TimerId,
        now_ms: u32,
        duration_ms: u32,
        process: ProcessId,
        message: Message,
    ) {
        let slot = &mut self.slots[id.index()];
        slot.interval = Interval::start(now_ms, duration_ms);
        slot.target = Some((process, message));
        slot.active = true;
        trace!("timer {} started at {}, timeout {}", id.0, now_ms, duration_ms);
    }

    /// Re-arm timer `id` with a new duration, keeping recipient and message
    ///
    /// No-op for a timer that was never started.
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside the table.
    pub fn restart(&mut self, id: TimerId, now_ms: u32, duration_ms: u32) {
        let slot = &mut self.slots[id.index()];
        if slot.target.is_none() {
            debug!("timer {} restarted before start, ignored", id.0);
            return;
        }
        slot.interval = Interval::start(now_ms, duration_ms);
        slot.active = true;
    }

    /// Disarm timer `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside the table.
    pub fn stop(&mut self, id: TimerId) {
        self.slots[id.index()].active = false;
        trace!("timer {} stopped", id.0);
    }

    /// Is timer `id` armed?
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside the table.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.slots[id.index()].active
    }

    /// Recipient and message stored by the last `start` of timer `id`
    pub fn target(&self, id: TimerId) -> Option<(ProcessId, Message)> {
        self.slots.get(id.index()).and_then(|slot| slot.target)
    }

    /// Milliseconds until timer `id` fires, None if disarmed
    pub fn remaining(&self, id: TimerId, now_ms: u32) -> Option<u32> {
        let slot = self.slots.get(id.index())?;
        if slot.active {
            Some(slot.interval.remaining(now_ms))
        } else {
            None
        }
    }

    /// Number of armed timers
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Table size
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Post the message of every expired timer and disarm it
    ///
    /// Slots are visited in index order, so timers expiring in the same
    /// sweep are delivered in index order. Returns the number fired.
    pub fn sweep<const Q: usize>(&mut self, now_ms: u32, queue: &mut EventQueue<Q>) -> usize {
        let mut fired = 0;

        for (i, slot) in self.slots.iter_mut().enumerate() {
            if !slot.active || !slot.interval.has_elapsed(now_ms) {
                continue;
            }
            if let Some((process, message)) = slot.target {
                trace!("timer {} elapsed at {}", i, now_ms);
                queue.push(process, message);
                fired += 1;
            }
            slot.active = false;
        }
        fired
    }
}

impl<const N: usize> Default for TimerTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
