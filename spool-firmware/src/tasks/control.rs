//! Control loop task
//!
//! Owns the process controller and both step generators. Each iteration
//! drains pending operator commands, ticks the controller (which steps
//! the axes) and yields so the lower-rate tasks get a turn.

use defmt::*;
use embassy_futures::yield_now;
use embassy_rp::gpio::Output;
use embassy_time::Instant;
use portable_atomic::Ordering;

use spool_core::config::{MachineConfig, WindingParameters};
use spool_core::process::ProcessController;
use spool_drivers::stepper::{StepDirAxis, StepDirConfig, StepDirPins};

use crate::channels::{COMMAND_CHANNEL, HALT, LIMIT_ENGAGED, STOP_SIGNAL};
use crate::clock::UptimeClock;
use crate::console::{DeferredStore, LogObserver};

/// Step generator type used for both axes
pub type Axis = StepDirAxis<'static, Output<'static>, UptimeClock>;

/// Output lines of one axis
pub type AxisPins = StepDirPins<Output<'static>>;

/// Control loop task
#[embassy_executor::task]
pub async fn control_task(
    config: MachineConfig,
    params: WindingParameters,
    traverse_pins: AxisPins,
    spindle_pins: AxisPins,
) {
    info!("Control task started");

    let traverse = build_axis(traverse_pins);
    let spindle = build_axis(spindle_pins);

    let mut controller = match ProcessController::new(
        config,
        params,
        traverse,
        spindle,
        &STOP_SIGNAL,
        LogObserver,
        DeferredStore,
    ) {
        Ok(controller) => controller,
        Err(e) => {
            // Config was validated at boot; nothing can move without a controller
            error!("Controller rejected configuration: {:?}", e);
            return;
        }
    };

    info!("Ready, press start to calibrate");

    loop {
        while let Ok(command) = COMMAND_CHANNEL.try_receive() {
            debug!("Command: {:?}", command);
            controller.handle(command, LIMIT_ENGAGED.load(Ordering::Acquire));
        }

        controller.tick(Instant::now().as_millis() as u32);

        yield_now().await;
    }
}

fn build_axis(pins: AxisPins) -> Axis {
    StepDirAxis::new(pins, UptimeClock, StepDirConfig::default()).with_halt(HALT.watch())
}
