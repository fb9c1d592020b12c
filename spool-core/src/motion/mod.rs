//! Motion planning
//!
//! Synchronized constant-velocity moves of the traverse and spindle axes.

pub mod planner;

pub use planner::{MotionPlanner, SyncMove};
