//! Limit-switch monitor
//!
//! Runs in interrupt context. On an accepted edge it stops both axes on
//! the spot, then leaves the decision of what the trigger means to the
//! polling side (a calibration hit or an emergency stop).
//!
//! A switch that stays engaged produces no further edges. The task that
//! owns the line therefore also samples its level through
//! [`LimitSwitchMonitor::on_level`], which tells it when to look again:
//! at the end of the debounce window, or periodically while the monitor
//! is detached or a trigger is still pending. An engagement that was
//! acted on is not acted on again until the line is released or the
//! signal is re-armed.

use crate::config::MachineConfig;
use crate::traits::AxisHalt;

use super::stop::StopSignal;

/// Re-sample interval for a held line the monitor cannot act on yet
pub const LEVEL_POLL_MS: u32 = 20;

/// What the monitor did with an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeOutcome {
    /// Axes halted and the stop signal set
    Accepted,
    /// Within the debounce window of the previous accepted trigger
    Debounced,
    /// A previous trigger has not been consumed yet
    Pending,
    /// The monitor is detached (calibration leg settling)
    Disarmed,
    /// The line was no longer engaged when sampled
    Released,
    /// Still the engagement already acted on in this arming epoch
    Held,
}

/// Level sample result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LevelCheck {
    /// What the monitor did with the sample
    pub outcome: EdgeOutcome,
    /// Sample again after this long even without an edge
    pub recheck_in_ms: Option<u32>,
}

/// Engagement of the line the monitor last acted on
#[derive(Debug, Clone, Copy, Default)]
pub struct HeldLine {
    accepted_epoch: Option<u32>,
}

/// Interrupt-side edge handler with debounce
#[derive(Debug, Clone, Copy)]
pub struct LimitSwitchMonitor<'a> {
    signal: &'a StopSignal,
    debounce_ms: u32,
    active_low: bool,
}

impl<'a> LimitSwitchMonitor<'a> {
    /// Create a monitor for the given signal
    pub fn new(signal: &'a StopSignal, config: &MachineConfig) -> Self {
        Self {
            signal,
            debounce_ms: config.debounce_ms,
            active_low: config.limit_active_low,
        }
    }

    /// Check whether a raw line level means the switch is engaged
    pub fn is_engaged(&self, line_high: bool) -> bool {
        line_high != self.active_low
    }

    /// Handle a qualifying edge
    ///
    /// `line_high` is the line level sampled inside the handler.
    pub fn on_edge<H: AxisHalt + ?Sized>(
        &self,
        now_ms: u32,
        line_high: bool,
        halt: &mut H,
    ) -> EdgeOutcome {
        if !self.signal.is_armed() {
            return EdgeOutcome::Disarmed;
        }
        if self.signal.is_pending() {
            return EdgeOutcome::Pending;
        }
        if !self.is_engaged(line_high) {
            return EdgeOutcome::Released;
        }
        if now_ms.wrapping_sub(self.signal.last_trigger_ms()) < self.debounce_ms {
            return EdgeOutcome::Debounced;
        }

        halt.halt();
        self.signal.record_trigger(now_ms);
        EdgeOutcome::Accepted
    }

    /// Handle a sample of the line level, edge or not
    pub fn on_level<H: AxisHalt + ?Sized>(
        &self,
        now_ms: u32,
        line_high: bool,
        held: &mut HeldLine,
        halt: &mut H,
    ) -> LevelCheck {
        if !self.is_engaged(line_high) {
            held.accepted_epoch = None;
            return LevelCheck {
                outcome: EdgeOutcome::Released,
                recheck_in_ms: None,
            };
        }

        let epoch = self.signal.arm_epoch();
        if held.accepted_epoch == Some(epoch) {
            return LevelCheck {
                outcome: EdgeOutcome::Held,
                recheck_in_ms: Some(LEVEL_POLL_MS),
            };
        }

        let outcome = self.on_edge(now_ms, line_high, halt);
        let recheck_in_ms = match outcome {
            EdgeOutcome::Accepted => {
                held.accepted_epoch = Some(epoch);
                // Keep watching for a re-arm while the line is held
                Some(LEVEL_POLL_MS)
            }
            EdgeOutcome::Debounced => {
                let elapsed = now_ms.wrapping_sub(self.signal.last_trigger_ms());
                Some(self.debounce_ms.saturating_sub(elapsed).max(1))
            }
            EdgeOutcome::Pending | EdgeOutcome::Disarmed | EdgeOutcome::Held => {
                Some(LEVEL_POLL_MS)
            }
            EdgeOutcome::Released => None,
        };

        LevelCheck {
            outcome,
            recheck_in_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingHalt {
        halts: u32,
    }

    impl AxisHalt for CountingHalt {
        fn halt(&mut self) {
            self.halts += 1;
        }
    }

    const LOW: bool = false;
    const HIGH: bool = true;

    #[test]
    fn test_accepts_engaged_edge() {
        let signal = StopSignal::new();
        let monitor = LimitSwitchMonitor::new(&signal, &MachineConfig::bench());
        let mut halt = CountingHalt::default();

        assert_eq!(monitor.on_edge(5000, LOW, &mut halt), EdgeOutcome::Accepted);
        assert_eq!(halt.halts, 1);
        assert!(signal.take());
        assert_eq!(signal.last_trigger_ms(), 5000);
    }

    #[test]
    fn test_bounce_within_window_accepted_once() {
        let signal = StopSignal::new();
        let monitor = LimitSwitchMonitor::new(&signal, &MachineConfig::bench());
        let mut halt = CountingHalt::default();

        assert_eq!(monitor.on_edge(5000, LOW, &mut halt), EdgeOutcome::Accepted);
        assert!(signal.take());

        // Bounces inside the 1000 ms window
        assert_eq!(monitor.on_edge(5010, LOW, &mut halt), EdgeOutcome::Debounced);
        assert_eq!(monitor.on_edge(5999, LOW, &mut halt), EdgeOutcome::Debounced);

        assert!(!signal.take());
        assert_eq!(halt.halts, 1);
    }

    #[test]
    fn test_trigger_after_window_accepted_again() {
        let signal = StopSignal::new();
        let monitor = LimitSwitchMonitor::new(&signal, &MachineConfig::bench());
        let mut halt = CountingHalt::default();

        monitor.on_edge(5000, LOW, &mut halt);
        assert!(signal.take());

        assert_eq!(monitor.on_edge(6000, LOW, &mut halt), EdgeOutcome::Accepted);
        assert!(signal.take());
        assert_eq!(halt.halts, 2);
    }

    #[test]
    fn test_unconsumed_trigger_blocks_new_ones() {
        let signal = StopSignal::new();
        let monitor = LimitSwitchMonitor::new(&signal, &MachineConfig::bench());
        let mut halt = CountingHalt::default();

        monitor.on_edge(5000, LOW, &mut halt);
        assert_eq!(monitor.on_edge(9000, LOW, &mut halt), EdgeOutcome::Pending);
        assert_eq!(signal.last_trigger_ms(), 5000);
        assert_eq!(halt.halts, 1);
    }

    #[test]
    fn test_disarmed_ignores_edges() {
        let signal = StopSignal::new();
        let monitor = LimitSwitchMonitor::new(&signal, &MachineConfig::bench());
        let mut halt = CountingHalt::default();

        signal.disarm();
        assert_eq!(monitor.on_edge(5000, LOW, &mut halt), EdgeOutcome::Disarmed);
        assert!(!signal.is_pending());
        assert_eq!(halt.halts, 0);
    }

    #[test]
    fn test_released_line_ignored() {
        let signal = StopSignal::new();
        let monitor = LimitSwitchMonitor::new(&signal, &MachineConfig::bench());
        let mut halt = CountingHalt::default();

        assert_eq!(monitor.on_edge(5000, HIGH, &mut halt), EdgeOutcome::Released);
        assert_eq!(halt.halts, 0);
    }

    #[test]
    fn test_active_high_line() {
        let signal = StopSignal::new();
        let mut config = MachineConfig::bench();
        config.limit_active_low = false;
        let monitor = LimitSwitchMonitor::new(&signal, &config);
        let mut halt = CountingHalt::default();

        assert!(monitor.is_engaged(HIGH));
        assert_eq!(monitor.on_edge(5000, HIGH, &mut halt), EdgeOutcome::Accepted);
    }

    #[test]
    fn test_debounce_survives_timer_wrap() {
        let signal = StopSignal::new();
        let monitor = LimitSwitchMonitor::new(&signal, &MachineConfig::bench());
        let mut halt = CountingHalt::default();

        monitor.on_edge(u32::MAX - 100, LOW, &mut halt);
        assert!(signal.take());
        assert_eq!(monitor.on_edge(200, LOW, &mut halt), EdgeOutcome::Debounced);
        assert_eq!(monitor.on_edge(1000, LOW, &mut halt), EdgeOutcome::Accepted);
    }

    #[test]
    fn test_held_line_accepted_after_window() {
        let signal = StopSignal::new();
        let monitor = LimitSwitchMonitor::new(&signal, &MachineConfig::bench());
        let mut halt = CountingHalt::default();
        let mut held = HeldLine::default();

        let check = monitor.on_level(5000, LOW, &mut held, &mut halt);
        assert_eq!(check.outcome, EdgeOutcome::Accepted);
        assert!(signal.take());

        // Calibration detaches the switch, then re-arms it after settling
        signal.disarm();
        let check = monitor.on_level(5100, LOW, &mut held, &mut halt);
        assert_eq!(check.outcome, EdgeOutcome::Held);
        signal.arm();

        // Far limit reached inside the debounce window and held there
        let check = monitor.on_level(5625, LOW, &mut held, &mut halt);
        assert_eq!(check.outcome, EdgeOutcome::Debounced);
        assert_eq!(check.recheck_in_ms, Some(375));

        let check = monitor.on_level(6000, LOW, &mut held, &mut halt);
        assert_eq!(check.outcome, EdgeOutcome::Accepted);
        assert!(signal.take());
        assert_eq!(halt.halts, 2);
    }

    #[test]
    fn test_held_line_not_acted_on_twice() {
        let signal = StopSignal::new();
        let monitor = LimitSwitchMonitor::new(&signal, &MachineConfig::bench());
        let mut halt = CountingHalt::default();
        let mut held = HeldLine::default();

        monitor.on_level(5000, LOW, &mut held, &mut halt);
        assert!(signal.take());

        let check = monitor.on_level(9000, LOW, &mut held, &mut halt);
        assert_eq!(check.outcome, EdgeOutcome::Held);
        assert_eq!(check.recheck_in_ms, Some(LEVEL_POLL_MS));
        assert!(!signal.is_pending());

        // Released and engaged again is a new contact
        let check = monitor.on_level(9100, HIGH, &mut held, &mut halt);
        assert_eq!(check, LevelCheck { outcome: EdgeOutcome::Released, recheck_in_ms: None });
        let check = monitor.on_level(9200, LOW, &mut held, &mut halt);
        assert_eq!(check.outcome, EdgeOutcome::Accepted);
        assert_eq!(halt.halts, 2);
    }

    #[test]
    fn test_engaged_at_boot_accepted_after_window() {
        let signal = StopSignal::new();
        let monitor = LimitSwitchMonitor::new(&signal, &MachineConfig::bench());
        let mut halt = CountingHalt::default();
        let mut held = HeldLine::default();

        let check = monitor.on_level(200, LOW, &mut held, &mut halt);
        assert_eq!(check.outcome, EdgeOutcome::Debounced);
        assert_eq!(check.recheck_in_ms, Some(800));

        let check = monitor.on_level(1000, LOW, &mut held, &mut halt);
        assert_eq!(check.outcome, EdgeOutcome::Accepted);
    }

    #[test]
    fn test_disarmed_held_line_polled() {
        let signal = StopSignal::new();
        let monitor = LimitSwitchMonitor::new(&signal, &MachineConfig::bench());
        let mut halt = CountingHalt::default();
        let mut held = HeldLine::default();

        signal.disarm();
        let check = monitor.on_level(5000, LOW, &mut held, &mut halt);
        assert_eq!(check.outcome, EdgeOutcome::Disarmed);
        assert_eq!(check.recheck_in_ms, Some(LEVEL_POLL_MS));

        signal.arm();
        let check = monitor.on_level(5020, LOW, &mut held, &mut halt);
        assert_eq!(check.outcome, EdgeOutcome::Accepted);
    }
}
