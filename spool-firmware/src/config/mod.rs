//! Persisted configuration
//!
//! Machine configuration and winding parameters stored in flash.

pub mod machine;
pub mod parameters;

pub use machine::load_machine_config;
pub use parameters::{load_parameters, save_parameters};
