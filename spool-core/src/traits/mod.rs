//! Collaborator traits
//!
//! These traits define the interface between the process logic and the
//! hardware or user-interface implementations it drives.

pub mod axis;
pub mod clock;
pub mod observer;

pub use axis::{AxisDriver, AxisHalt, AxisMode, Direction, Target};
pub use clock::Clock;
pub use observer::{ParameterStore, ProcessObserver};
