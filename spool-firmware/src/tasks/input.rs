//! Operator input task
//!
//! Samples the keypad resistor ladder and the start button and forwards
//! released keys to the control loop.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Instant, Ticker};

use spool_core::input::{Command, KeypadDecoder, StartButton};

use crate::channels::COMMAND_CHANNEL;

/// Sample interval; the decoders apply their own longer periods
const SAMPLE_INTERVAL_MS: u64 = 25;

/// Keypad ladder and start button
pub struct InputHardware {
    /// ADC driver
    pub adc: Adc<'static, Async>,
    /// Ladder input channel
    pub ladder: Channel<'static>,
    /// Start button, pulled up and pressed low
    pub start: Input<'static>,
}

/// Input task
#[embassy_executor::task]
pub async fn input_task(mut hw: InputHardware) {
    info!("Input task started");

    let mut keypad = KeypadDecoder::default();
    let mut start = StartButton::default();
    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));

    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis() as u32;

        match hw.adc.read(&mut hw.ladder).await {
            // 12-bit reading scaled to the 10-bit ladder thresholds
            Ok(raw) => {
                if let Some(command) = keypad.update(now_ms, raw >> 2) {
                    forward(command);
                }
            }
            Err(e) => warn!("Keypad ADC read failed: {:?}", e),
        }

        if let Some(command) = start.update(now_ms, hw.start.is_low()) {
            forward(command);
        }
    }
}

fn forward(command: Command) {
    if COMMAND_CHANNEL.try_send(command).is_err() {
        warn!("Command queue full, dropping {:?}", command);
    }
}
