//! Traverse calibration
//!
//! Measures the usable travel between the two limit switches and parks
//! the traverse in the middle.

pub mod engine;
pub mod geometry;

pub use engine::{CalibrationEngine, CalibrationEvent, CalibrationPhase};
pub use geometry::CalibratedGeometry;
