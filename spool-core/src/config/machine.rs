//! Machine configuration
//!
//! Mechanical constants and behavior flags for one hardware build. The
//! original machine was built in two variants that differed only in lead
//! screw pitch and a handful of safety behaviors; both are expressed as
//! presets of the same record so one controller drives either.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Step increments used by the settings session
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SettingsSteps {
    /// Increment for right/left keys
    pub fine_step: f32,
    /// Increment for up/down keys
    pub coarse_step: f32,
    /// Lower clamp for every adjusted value
    pub floor: f32,
}

impl Default for SettingsSteps {
    fn default() -> Self {
        Self {
            fine_step: 0.1,
            coarse_step: 1.0,
            floor: 0.0,
        }
    }
}

/// Mechanical constants and behavior flags
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineConfig {
    /// Steps per revolution of either motor (including microstepping)
    pub steps_per_revolution: f32,
    /// Traverse travel per motor revolution (mm)
    pub lead_mm_per_revolution: f32,
    /// Maximum speed of either axis during synchronized moves (steps/s)
    pub max_axis_speed: f32,
    /// Constant traverse speed while seeking the limit switch (steps/s)
    pub calibration_speed: f32,
    /// Offset between the physical switch and the logical travel ends (mm)
    pub limit_margin_mm: f32,
    /// Minimum time between accepted limit-switch triggers
    pub debounce_ms: u32,
    /// Delay after a reversal before the limit switch is re-armed
    pub settle_ms: u32,
    /// Traverse distance of the wire-seating retract (mm)
    pub fix_travel_mm: f32,
    /// Spindle turns of the wire-seating retract
    pub fix_turns: f32,
    /// Share of the winding span covered by the first half of the turns
    pub span_ratio: f32,
    /// Spindle turns per millimetre of the lead-in move
    pub lead_in_turns_per_mm: f32,
    /// Moves shorter than this do not produce a progress notification
    pub progress_threshold_s: f32,
    /// Jog distance for the up key in `Init` (mm)
    pub jog_forward_mm: f32,
    /// Jog distance for the down key in `Init` (mm)
    pub jog_reverse_mm: f32,
    /// Settings session increments
    pub settings: SettingsSteps,
    /// Limit switch line reads low when engaged
    pub limit_active_low: bool,
    /// Up/down keys jog the traverse while in `Init`
    pub jog_in_init: bool,
    /// Start is refused while the limit switch is engaged
    pub block_start_while_limit_engaged: bool,
    /// Select aborts from `Home` instead of entering settings
    pub abort_from_home: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::bench()
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Steps per revolution must be positive
    InvalidStepsPerRevolution,
    /// Lead per revolution must be positive
    InvalidLead,
    /// Axis or calibration speed must be positive
    InvalidSpeed,
    /// Span ratio must lie strictly between 0 and 1
    InvalidSpanRatio,
    /// A distance, turn count or step is negative
    NegativeValue,
}

impl MachineConfig {
    /// Bench winder: 60 mm lead screw, jogging enabled, aborts from home
    pub const fn bench() -> Self {
        Self {
            steps_per_revolution: 800.0,
            lead_mm_per_revolution: 60.0,
            max_axis_speed: 1600.0,
            calibration_speed: 4800.0,
            limit_margin_mm: 10.0,
            debounce_ms: 1000,
            settle_ms: 500,
            fix_travel_mm: 4.0,
            fix_turns: 10.0,
            span_ratio: 0.35,
            lead_in_turns_per_mm: 0.1,
            progress_threshold_s: 1.0,
            jog_forward_mm: 1.0,
            jog_reverse_mm: 0.3,
            settings: SettingsSteps {
                fine_step: 0.1,
                coarse_step: 1.0,
                floor: 0.0,
            },
            limit_active_low: true,
            jog_in_init: true,
            block_start_while_limit_engaged: true,
            abort_from_home: true,
        }
    }

    /// Compact winder: 8 mm lead screw, no jogging
    pub const fn compact() -> Self {
        let mut config = Self::bench();
        config.lead_mm_per_revolution = 8.0;
        config.jog_in_init = false;
        config.block_start_while_limit_engaged = false;
        config
    }

    /// Traverse steps per millimetre
    pub fn steps_per_mm(&self) -> f32 {
        self.steps_per_revolution / self.lead_mm_per_revolution
    }

    /// Convert a traverse distance to steps, rounded to the nearest step
    pub fn mm_to_steps(&self, mm: f32) -> i32 {
        round_steps(mm * self.steps_per_mm())
    }

    /// Traverse steps of the wire-seating retract
    pub fn fix_steps(&self) -> i32 {
        self.mm_to_steps(self.fix_travel_mm)
    }

    /// Check the configuration for values the controller cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.steps_per_revolution > 0.0) {
            return Err(ConfigError::InvalidStepsPerRevolution);
        }
        if !(self.lead_mm_per_revolution > 0.0) {
            return Err(ConfigError::InvalidLead);
        }
        if !(self.max_axis_speed > 0.0) || !(self.calibration_speed > 0.0) {
            return Err(ConfigError::InvalidSpeed);
        }
        if !(self.span_ratio > 0.0 && self.span_ratio < 1.0) {
            return Err(ConfigError::InvalidSpanRatio);
        }

        let non_negative = [
            self.limit_margin_mm,
            self.fix_travel_mm,
            self.fix_turns,
            self.lead_in_turns_per_mm,
            self.progress_threshold_s,
            self.jog_forward_mm,
            self.jog_reverse_mm,
            self.settings.fine_step,
            self.settings.coarse_step,
            self.settings.floor,
        ];
        if non_negative.iter().any(|v| !(*v >= 0.0)) {
            return Err(ConfigError::NegativeValue);
        }

        Ok(())
    }
}

/// Round a step count to the nearest integer (ties away from zero)
pub(crate) fn round_steps(value: f32) -> i32 {
    if value >= 0.0 {
        (value + 0.5) as i32
    } else {
        (value - 0.5) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert_eq!(MachineConfig::bench().validate(), Ok(()));
        assert_eq!(MachineConfig::compact().validate(), Ok(()));
    }

    #[test]
    fn test_steps_per_mm() {
        let bench = MachineConfig::bench();
        assert!((bench.steps_per_mm() - 800.0 / 60.0).abs() < 1e-4);

        let compact = MachineConfig::compact();
        assert_eq!(compact.steps_per_mm(), 100.0);
        assert_eq!(compact.mm_to_steps(4.0), 400);
        assert_eq!(compact.fix_steps(), 400);
    }

    #[test]
    fn test_compact_differs_in_behavior() {
        let compact = MachineConfig::compact();
        assert!(!compact.jog_in_init);
        assert!(compact.abort_from_home);
    }

    #[test]
    fn test_rejects_bad_span_ratio() {
        let mut config = MachineConfig::bench();
        config.span_ratio = 1.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSpanRatio));
    }

    #[test]
    fn test_rejects_zero_speed() {
        let mut config = MachineConfig::bench();
        config.max_axis_speed = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSpeed));
    }

    #[test]
    fn test_rejects_negative_margin() {
        let mut config = MachineConfig::bench();
        config.limit_margin_mm = -1.0;
        assert_eq!(config.validate(), Err(ConfigError::NegativeValue));
    }

    #[test]
    fn test_round_steps() {
        assert_eq!(round_steps(1.4), 1);
        assert_eq!(round_steps(1.5), 2);
        assert_eq!(round_steps(-1.5), -2);
    }
}
