//! Limit-switch task
//!
//! Woken by the GPIO interrupt on every edge of the switch line. A line
//! that stays engaged gives no further edges, so while the monitor asks
//! for it the task also wakes on a timer and samples the level again.
//! The control loop yields after each iteration, so an accepted trigger
//! halts both step generators before their next step.

use defmt::*;
use embassy_futures::select::select;
use embassy_rp::gpio::Input;
use embassy_time::{Instant, Timer};
use portable_atomic::Ordering;

use spool_core::config::MachineConfig;
use spool_core::safety::{EdgeOutcome, HeldLine, LimitSwitchMonitor};

use crate::channels::{HALT, LIMIT_ENGAGED, STOP_SIGNAL};

/// Limit-switch task
#[embassy_executor::task]
pub async fn limit_switch_task(mut line: Input<'static>, config: &'static MachineConfig) {
    info!("Limit switch task started");

    let monitor = LimitSwitchMonitor::new(&STOP_SIGNAL, config);
    let mut halt = &HALT;
    let mut held = HeldLine::default();

    loop {
        let line_high = line.is_high();
        LIMIT_ENGAGED.store(monitor.is_engaged(line_high), Ordering::Release);

        let now_ms = Instant::now().as_millis() as u32;
        let check = monitor.on_level(now_ms, line_high, &mut held, &mut halt);
        match check.outcome {
            EdgeOutcome::Accepted => debug!("Limit switch trigger at {} ms", now_ms),
            EdgeOutcome::Released | EdgeOutcome::Held => {}
            outcome => trace!("Limit switch level ignored: {:?}", outcome),
        }

        match check.recheck_in_ms {
            Some(ms) => {
                select(line.wait_for_any_edge(), Timer::after_millis(u64::from(ms))).await;
            }
            None => line.wait_for_any_edge().await,
        }
    }
}
