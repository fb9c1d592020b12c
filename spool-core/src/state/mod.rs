//! Process state machine
//!
//! Defines the authoritative top-level behavior of the machine.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::{Notice, Operation, ProcessError, SettingField};
pub use machine::ProcessState;
