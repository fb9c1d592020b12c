//! Spool - Coil Winding Machine Firmware
//!
//! Main firmware binary for RP2040-based two-axis winders. A traverse
//! axis, calibrated against a single limit switch, lays wire across a
//! spindle turned in lock-step.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use spool_core::config::MachineConfig;
use spool_hal_rp2040::Rp2040FlashStorage;

mod channels;
mod clock;
mod config;
mod console;
mod tasks;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// Configuration shared with the limit-switch task (must live forever)
static MACHINE_CONFIG: StaticCell<MachineConfig> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Spool firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Load configuration and parameters, then hand flash to the persist task
    let mut storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let config = config::load_machine_config(&mut storage).await;
    let params = config::load_parameters(&mut storage).await;
    let config: &'static MachineConfig = MACHINE_CONFIG.init(config);

    // Pin assignments (Pico):
    //   traverse STEP=GPIO2, DIR=GPIO3, EN=GPIO4
    //   spindle  STEP=GPIO6, DIR=GPIO7, EN=GPIO8
    //   limit switch GPIO14, start button GPIO15, keypad ladder GPIO26/ADC0
    let traverse_pins = tasks::AxisPins {
        step: Output::new(p.PIN_2, Level::Low),
        dir: Output::new(p.PIN_3, Level::Low),
        enable: Output::new(p.PIN_4, Level::High),
    };
    let spindle_pins = tasks::AxisPins {
        step: Output::new(p.PIN_6, Level::Low),
        dir: Output::new(p.PIN_7, Level::Low),
        enable: Output::new(p.PIN_8, Level::High),
    };

    let limit_pull = if config.limit_active_low {
        Pull::Up
    } else {
        Pull::Down
    };
    let limit_line = Input::new(p.PIN_14, limit_pull);

    let input = tasks::InputHardware {
        adc: Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default()),
        ladder: Channel::new_pin(p.PIN_26, Pull::None),
        start: Input::new(p.PIN_15, Pull::Up),
    };

    info!("GPIO and ADC initialized");

    unwrap!(spawner.spawn(tasks::limit_switch_task(limit_line, config)));
    unwrap!(spawner.spawn(tasks::control_task(*config, params, traverse_pins, spindle_pins)));
    unwrap!(spawner.spawn(tasks::input_task(input)));
    unwrap!(spawner.spawn(tasks::persist_task(storage)));

    info!("All tasks spawned, firmware running");
}
