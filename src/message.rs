//! Message vocabulary and routing ids
//!
//! Messages are small `Copy` values: an event tag plus one 32-bit
//! parameter. They are copied into the event queue and into timer slots,
//! never borrowed.

/// Process identifier, the routing key for queued messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProcessId(pub u8);

impl ProcessId {
    /// No recipient. Inputs routed here never report.
    pub const UNDEFINED: ProcessId = ProcessId(0);
    /// Main application process
    pub const MAIN: ProcessId = ProcessId(1);

    /// Is this a routable process id?
    pub const fn is_defined(&self) -> bool {
        self.0 != Self::UNDEFINED.0
    }
}

/// Event tag carried by a [`Message`]
///
/// The constants below are the reference vocabulary; applications may
/// define their own tags with any other value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventId(pub u8);

impl EventId {
    pub const NONE: EventId = EventId(0);
    /// State-entry pseudo-event, posted by a process to itself
    pub const ENTER: EventId = EventId(1);
    pub const KEY_MODE: EventId = EventId(2);
    pub const KEY_LEFT: EventId = EventId(3);
    pub const KEY_RIGHT: EventId = EventId(4);
    pub const TICKER_SERVO: EventId = EventId(5);
    pub const TICKER_LED: EventId = EventId(6);
    /// Character received on the terminal, byte in the parameter
    pub const CHAR: EventId = EventId(7);
}

/// Index into the kernel's timer table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerId(pub u8);

impl TimerId {
    /// Table slot for this id
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Input parameter: input became active
pub const INPUT_ACTIVE: u32 = 0;
/// Input parameter: input became inactive
pub const INPUT_INACTIVE: u32 = 1;

/// Event plus one parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    pub event: EventId,
    pub param: u32,
}

impl Message {
    pub const fn new(event: EventId, param: u32) -> Self {
        Self { event, param }
    }

    /// Message with a zero parameter
    pub const fn event(event: EventId) -> Self {
        Self { event, param: 0 }
    }
}

/// Queued message together with its recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueEntry {
    pub process: ProcessId,
    pub message: Message,
}

impl QueueEntry {
    /// Placeholder for unused queue slots
    pub const fn empty() -> Self {
        Self {
            process: ProcessId::UNDEFINED,
            message: Message::event(EventId::NONE),
        }
    }
}
