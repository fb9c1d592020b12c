//! Process orchestration
//!
//! The controller gates which operations are legal and drives the
//! calibration, homing and wrap engines. The settings session is a thin
//! sub-state of the controller.

pub mod controller;
pub mod settings;

pub use controller::ProcessController;
pub use settings::SettingsSession;
