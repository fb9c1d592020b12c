//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod control;
pub mod input;
pub mod limit_switch;
pub mod persist;

pub use control::{control_task, Axis, AxisPins};
pub use input::{input_task, InputHardware};
pub use limit_switch::limit_switch_task;
pub use persist::persist_task;
