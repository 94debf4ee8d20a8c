//! Kernel error types
//!
//! Core operations are total: a full queue drops, a restart of an unknown
//! timer is ignored, bouncing inputs are filtered. Only process
//! registration can be refused.

use core::fmt;

use crate::message::ProcessId;

/// Errors returned by [`Kernel::register`](crate::kernel::Kernel::register)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterError {
    /// All process slots are taken
    RegistryFull,
    /// A handler is already registered for this id
    DuplicateProcess(ProcessId),
    /// [`ProcessId::UNDEFINED`] cannot receive messages
    UndefinedProcess,
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterError::RegistryFull => write!(f, "Process registry full"),
            RegisterError::DuplicateProcess(id) => {
                write!(f, "Process {} is already registered", id.0)
            }
            RegisterError::UndefinedProcess => {
                write!(f, "Cannot register the undefined process id")
            }
        }
    }
}
