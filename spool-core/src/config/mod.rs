//! Configuration types
//!
//! Machine constants are compiled in as presets; the operator-adjustable
//! winding parameters are stored in flash as postcard binary data.

pub mod machine;
pub mod parameters;

pub use machine::*;
pub use parameters::*;
