//! Spool Hardware Abstraction Layer
//!
//! Chip-independent traits for the pieces of hardware the winder firmware
//! needs beyond `embedded-hal`: for now only persistent storage.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  spool-firmware                         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  spool-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ spool-hal-    │
//!             │    rp2040     │
//!             └───────────────┘
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod flash;

pub use flash::{FlashError, FlashStorage, StorageKey};
