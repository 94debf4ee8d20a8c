//! coop-os — Cooperative tick-driven OS core
//!
//! React to button presses and elapsed intervals without an RTOS.
//!
//! Minimal single-threaded kernel for small microcontrollers:
//! - Wraparound-safe millisecond intervals on a 32-bit counter
//! - Static one-shot timer table (no heap, no allocation)
//! - Fixed-capacity FIFO event queue with drop-on-full policy
//! - Shift-register debounce with edge reports and auto-repeat
//! - Tick handler + schedule pass, dispatching messages by process id
//!
//! ```
//! use coop_os::{handler, EventId, InputConfig, Kernel, Message, Os, ProcessId, SoftClock, TimerId};
//!
//! let mut app = handler(|msg: Message, os: &mut dyn Os| {
//!     if msg.event == EventId::TICKER_SERVO {
//!         os.restart_timer(TimerId(0), 50);
//!     }
//! });
//! let key = InputConfig::key(ProcessId::MAIN, EventId::KEY_LEFT);
//! let mut kernel: Kernel<'_, _, _, 1, 1> = Kernel::new(SoftClock::new(), |_: usize| false, [key]);
//! kernel.register(ProcessId::MAIN, &mut app).unwrap();
//! kernel.start();
//! kernel.start_timer(TimerId(0), 50, ProcessId::MAIN, Message::event(EventId::TICKER_SERVO));
//!
//! let stats = kernel.run_for(1000);
//! assert_eq!(stats.dispatched, 19);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod log;

pub mod clock;
pub mod config;
pub mod debounce;
pub mod error;
pub mod kernel;
pub mod message;
pub mod queue;
pub mod timer;

pub use clock::{Clock, Interval, SoftClock, Ticker};
#[cfg(feature = "std")]
pub use clock::StdClock;
pub use config::{TickMode, EVENT_QUEUE_SIZE, MAX_PROCESSES};
pub use debounce::{InputConfig, InputLevel, InputScanner, InputSource};
pub use error::RegisterError;
pub use kernel::{handler, Context, Handler, Kernel, KernelStats, Os, Process};
pub use message::{EventId, Message, ProcessId, QueueEntry, TimerId, INPUT_ACTIVE, INPUT_INACTIVE};
pub use queue::EventQueue;
pub use timer::TimerTable;
