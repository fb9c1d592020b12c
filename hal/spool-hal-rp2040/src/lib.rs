//! RP2040-specific HAL for the Spool winder firmware
//!
//! Implements the shared `spool-hal` traits on the RP2040:
//!
//! - Flash storage driver (implements `spool_hal::FlashStorage`)

#![no_std]

pub mod flash;

pub use flash::Rp2040FlashStorage;
pub use spool_hal::{FlashStorage as FlashStorageTrait, StorageKey};
