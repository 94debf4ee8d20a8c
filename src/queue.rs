//! Event queue — fixed-capacity FIFO ring of addressed messages
//!
//! The single channel between producers (timer expiry, input filter,
//! processes, external adapters) and the dispatch loop. No heap.
//!
//! Full queue policy: the new entry is dropped, nothing already queued
//! is overwritten. Size `N` for the worst-case burst of one tick.
//!
//! Single-threaded by construction: `&mut self` on every mutation. An
//! interrupt-driven producer must hand off through its own lock-free
//! channel rather than touch this ring.

use crate::message::{Message, ProcessId, QueueEntry};

/// Fixed-size ring buffer of [`QueueEntry`]
///
/// Unlike a lock-free SPSC ring, occupancy is tracked by an explicit
/// count, so all `N` slots are usable.
pub struct EventQueue<const N: usize> {
    /// Ring storage
    entries: [QueueEntry; N],
    /// Next slot to write
    write_idx: usize,
    /// Next slot to read
    read_idx: usize,
    /// Number of queued entries
    count: usize,
    /// Entries dropped because the queue was full
    dropped: u32,
}

impl<const N: usize> EventQueue<N> {
    /// Create a new empty queue
    pub const fn new() -> Self {
        Self {
            entries: [QueueEntry::empty(); N],
            write_idx: 0,
            read_idx: 0,
            count: 0,
            dropped: 0,
        }
    }

    /// Append a message for `process` at the tail
    ///
    /// Returns false (and drops the message) if the queue is full.
    pub fn push(&mut self, process: ProcessId, message: Message) -> bool {
        if self.count >= N {
            self.dropped = self.dropped.saturating_add(1);
            warn!("event queue overflow, dropped {}", message.event.0);
            return false;
        }

        self.entries[self.write_idx] = QueueEntry { process, message };
        self.write_idx = (self.write_idx + 1) % N;
        self.count += 1;
        true
    }

    /// Remove the head entry
    ///
    /// Returns None if the queue is empty.
    pub fn pop(&mut self) -> Option<QueueEntry> {
        if self.count == 0 {
            return None;
        }

        let entry = self.entries[self.read_idx];
        self.read_idx = (self.read_idx + 1) % N;
        self.count -= 1;
        Some(entry)
    }

    /// Head entry without removing it
    pub fn peek(&self) -> Option<&QueueEntry> {
        if self.count == 0 {
            None
        } else {
            Some(&self.entries[self.read_idx])
        }
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == N
    }

    /// Total slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Entries lost to overflow since creation
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Discard all queued entries
    pub fn clear(&mut self) {
        self.write_idx = 0;
        self.read_idx = 0;
        self.count = 0;
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
