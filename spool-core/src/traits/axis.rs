//! Axis driver trait
//!
//! This trait abstracts over stepper implementations that generate their
//! own step pulses from a per-iteration `tick()` call, in the style of the
//! classic Arduino stepper libraries. One instance drives one motor.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of a traverse move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Away from the first limit switch
    Forward,
    /// Toward the first limit switch
    Reverse,
}

impl Direction {
    /// Sign applied to a step count
    pub fn sign(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

/// Motion mode of an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisMode {
    /// Run at a constant signed speed with no target
    Velocity,
    /// Run toward a target position at up to the maximum speed
    PositionFollow,
}

/// Position target for `PositionFollow` mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    /// Steps relative to the current position
    Relative(i32),
    /// Absolute position register value
    Absolute(i32),
}

/// Trait for step-generating axis drivers
///
/// Speeds are in steps per second. Positions are in steps on the driver's
/// own position register, which the caller may redefine at any time.
pub trait AxisDriver {
    /// Select velocity or position-follow mode
    fn set_mode(&mut self, mode: AxisMode);

    /// Set the speed used in position-follow mode (unsigned)
    fn set_max_speed(&mut self, steps_per_s: f32);

    /// Set the target in position-follow mode
    fn set_target(&mut self, target: Target);

    /// Set the signed constant speed used in velocity mode
    fn set_speed(&mut self, steps_per_s: f32);

    /// Redefine the position register without moving
    fn set_current_position(&mut self, steps: i32);

    /// Read the position register
    fn current_position(&self) -> i32;

    /// Generate any due step pulse
    ///
    /// Returns `true` while the axis is still moving and `false` once it is
    /// idle (target reached, stopped, or never started).
    fn tick(&mut self) -> bool;

    /// Power the driver stage
    fn enable(&mut self);

    /// Remove power from the driver stage (motor free-wheels)
    fn disable(&mut self);

    /// Power automatically while moving and release when idle
    fn set_auto_power(&mut self, auto: bool);

    /// Stop immediately, discarding any target or speed
    ///
    /// Must be idempotent.
    fn stop(&mut self);

    /// Check whether the driver stage is powered
    fn is_enabled(&self) -> bool;
}

/// Immediate stop issued from interrupt context
///
/// Implementations must only latch a stop request that the axis drivers
/// honour on their next tick; they must never issue a new target.
pub trait AxisHalt {
    /// Stop both axes
    fn halt(&mut self);
}
