//! Board-agnostic process logic for the coil winder firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (axis driver, display/log observer, parameter store)
//! - Process state machine and settings session
//! - Limit-switch calibration of the traverse axis
//! - Synchronized two-axis motion planning and the wrap cycle
//! - Limit-switch monitor shared with the interrupt context
//! - Configuration and persisted parameter records

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod calibration;
pub mod config;
pub mod input;
pub mod motion;
pub mod process;
pub mod safety;
pub mod state;
pub mod traits;
pub mod wrap;

#[cfg(any(test, feature = "sim"))]
pub mod sim;
