//! Embassy time as the step generators' clock

use embassy_time::Instant;

use spool_core::traits::Clock;

/// Uptime clock backed by the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct UptimeClock;

impl Clock for UptimeClock {
    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }
}
