//! Limit-switch safety
//!
//! The only state shared between the interrupt context and the main loop.

pub mod limit;
pub mod stop;

pub use limit::{EdgeOutcome, HeldLine, LevelCheck, LimitSwitchMonitor, LEVEL_POLL_MS};
pub use stop::StopSignal;
