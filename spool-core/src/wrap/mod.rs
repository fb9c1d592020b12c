//! Wrap cycle
//!
//! One complete winding operation as a fixed sequence of synchronized
//! moves.

pub mod cycle;

pub use cycle::{WrapCycle, WrapPhase, WrapStep};
