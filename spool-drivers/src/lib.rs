//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in spool-core:
//!
//! - Step/direction stepper driver with software step generation
//! - Halt line shared between the limit-switch interrupt and the axes

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod stepper;
