//! Calibration engine
//!
//! Two-limit homing sequence for the traverse axis:
//!
//! 1. Seek the first limit at constant negative speed.
//! 2. On the hit, redefine the position register as `-margin` so the
//!    origin lies `margin` inside the switch, and run the other way.
//! 3. After the settle time, re-arm the limit switch.
//! 4. On the second hit, the travel is the position minus the margin.
//!    Follow to `travel / 2` and start the settle timer again.
//! 5. After the settle time, re-arm and wait for the traverse to park.
//!
//! The limit switch is disarmed while a leg is settling so the reversal
//! transient cannot trigger it.

use crate::config::MachineConfig;
use crate::safety::StopSignal;
use crate::traits::{AxisDriver, AxisMode, Target};

/// Calibration progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationPhase {
    /// Seeking the first limit
    AwaitingFirstLimit,
    /// Reversed off the first limit, switch disarmed
    BackingOffAndReversing { since_ms: u32 },
    /// Seeking the second limit with the switch armed
    ArmedForSecondLimit,
    /// Travel measured, moving to the park position, switch disarmed
    Finalizing { since_ms: u32 },
    /// Switch re-armed, waiting for the traverse to reach the park position
    SettleWait,
}

/// Milestones reported by [`CalibrationEngine::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationEvent {
    /// First limit hit and the axis reversed
    FirstLimitFound,
    /// Second limit hit; travel between the logical ends in steps
    TravelMeasured { steps: i32 },
    /// Settle finished and the traverse is parked
    Complete { travel_steps: i32 },
}

/// Calibration engine
#[derive(Debug, Clone)]
pub struct CalibrationEngine {
    phase: CalibrationPhase,
    travel_steps: Option<i32>,
    margin_steps: i32,
    calibration_speed: f32,
    settle_ms: u32,
}

impl CalibrationEngine {
    /// Create an engine for the given machine
    pub fn new(config: &MachineConfig) -> Self {
        Self {
            phase: CalibrationPhase::AwaitingFirstLimit,
            travel_steps: None,
            margin_steps: config.mm_to_steps(config.limit_margin_mm),
            calibration_speed: config.calibration_speed,
            settle_ms: config.settle_ms,
        }
    }

    /// Current phase
    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    /// Measured travel, once the second limit has been found
    pub fn travel_steps(&self) -> Option<i32> {
        self.travel_steps
    }

    /// Check whether a limit trigger is part of the sequence right now
    pub fn expects_limit(&self) -> bool {
        matches!(
            self.phase,
            CalibrationPhase::AwaitingFirstLimit | CalibrationPhase::ArmedForSecondLimit
        )
    }

    /// Start seeking the first limit
    pub fn begin<A: AxisDriver>(&mut self, signal: &StopSignal, traverse: &mut A, spindle: &mut A) {
        traverse.stop();
        spindle.stop();
        traverse.set_auto_power(false);
        spindle.set_auto_power(false);
        traverse.disable();
        spindle.disable();

        self.phase = CalibrationPhase::AwaitingFirstLimit;
        self.travel_steps = None;
        signal.clear();
        signal.arm();

        traverse.enable();
        traverse.set_mode(AxisMode::Velocity);
        traverse.set_speed(-self.calibration_speed);
    }

    /// Advance the sequence
    ///
    /// `traverse_moving` is the result of this iteration's `tick()`.
    pub fn poll<A: AxisDriver>(
        &mut self,
        now_ms: u32,
        signal: &StopSignal,
        traverse: &mut A,
        traverse_moving: bool,
    ) -> Option<CalibrationEvent> {
        match self.phase {
            CalibrationPhase::AwaitingFirstLimit => {
                if !signal.take() {
                    return None;
                }
                signal.disarm();
                traverse.stop();
                traverse.set_current_position(-self.margin_steps);
                traverse.set_mode(AxisMode::Velocity);
                traverse.set_speed(self.calibration_speed);

                self.phase = CalibrationPhase::BackingOffAndReversing { since_ms: now_ms };
                Some(CalibrationEvent::FirstLimitFound)
            }
            CalibrationPhase::BackingOffAndReversing { since_ms } => {
                if now_ms.wrapping_sub(since_ms) > self.settle_ms {
                    signal.clear();
                    signal.arm();
                    self.phase = CalibrationPhase::ArmedForSecondLimit;
                }
                None
            }
            CalibrationPhase::ArmedForSecondLimit => {
                if !signal.take() {
                    return None;
                }
                signal.disarm();
                traverse.stop();

                let travel = traverse.current_position() - self.margin_steps;
                self.travel_steps = Some(travel);

                traverse.set_mode(AxisMode::PositionFollow);
                traverse.set_max_speed(self.calibration_speed);
                traverse.set_target(Target::Absolute(travel / 2));

                self.phase = CalibrationPhase::Finalizing { since_ms: now_ms };
                Some(CalibrationEvent::TravelMeasured { steps: travel })
            }
            CalibrationPhase::Finalizing { since_ms } => {
                if now_ms.wrapping_sub(since_ms) > self.settle_ms {
                    signal.clear();
                    signal.arm();
                    self.phase = CalibrationPhase::SettleWait;
                }
                None
            }
            CalibrationPhase::SettleWait => {
                if traverse_moving {
                    return None;
                }
                self.travel_steps
                    .map(|travel_steps| CalibrationEvent::Complete { travel_steps })
            }
        }
    }

    /// Discard the sequence
    pub fn reset(&mut self) {
        self.phase = CalibrationPhase::AwaitingFirstLimit;
        self.travel_steps = None;
    }
}
