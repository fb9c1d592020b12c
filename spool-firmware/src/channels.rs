//! Inter-task communication
//!
//! Statics shared between the control loop, the limit-switch interrupt
//! task, the input task and the persistence task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use portable_atomic::AtomicBool;

use spool_core::config::WindingParameters;
use spool_core::input::Command;
use spool_core::safety::StopSignal;
use spool_drivers::stepper::HaltLine;

/// Channel capacity for operator commands
const COMMAND_CHANNEL_SIZE: usize = 8;

/// Operator commands from the keypad and start button
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Limit-switch trigger, set by the interrupt task and consumed by the control loop
pub static STOP_SIGNAL: StopSignal = StopSignal::new();

/// Halt request from the interrupt task to both step generators
pub static HALT: HaltLine = HaltLine::new();

/// Current level of the limit-switch line (true = engaged)
pub static LIMIT_ENGAGED: AtomicBool = AtomicBool::new(false);

/// Parameters to write to flash (updated by the control loop)
pub static PARAMETERS_SAVE: Signal<CriticalSectionRawMutex, WindingParameters> = Signal::new();
