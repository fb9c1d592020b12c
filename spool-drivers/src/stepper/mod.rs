//! Stepper driver implementations

pub mod halt;
pub mod step_dir;

pub use halt::{HaltLine, HaltWatch};
pub use step_dir::{StepDirAxis, StepDirConfig, StepDirPins};
