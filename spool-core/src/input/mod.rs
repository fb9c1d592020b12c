//! Operator input
//!
//! Decoding of the analog keypad and the start button into discrete
//! commands, and the contextual mapping of commands onto process
//! operations.

pub mod command;
pub mod keypad;

pub use command::{interpret, Command};
pub use keypad::{decode_ladder, KeypadDecoder, StartButton};
