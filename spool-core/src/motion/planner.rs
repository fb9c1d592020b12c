//! Synchronized two-axis move planner
//!
//! Both axes run at constant velocity. The axis that needs longer at the
//! maximum speed sets the move duration and the other axis is slowed down
//! to arrive at the same time.

use crate::config::machine::round_steps;
use crate::config::MachineConfig;
use crate::traits::{AxisDriver, AxisMode, Direction, Target};

/// One planned synchronized move
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncMove {
    /// Signed relative traverse distance (steps)
    pub traverse_steps: i32,
    /// Relative spindle distance (steps, always forward)
    pub spindle_steps: i32,
    /// Traverse speed (steps/s)
    pub traverse_speed: f32,
    /// Spindle speed (steps/s)
    pub spindle_speed: f32,
    /// Expected duration of the move (s)
    pub duration_s: f32,
}

impl SyncMove {
    /// Expected duration in milliseconds
    pub fn duration_ms(&self) -> u32 {
        (self.duration_s * 1000.0) as u32
    }

    /// Command both axes to execute the move
    pub fn apply<A: AxisDriver>(&self, traverse: &mut A, spindle: &mut A) {
        traverse.set_mode(AxisMode::PositionFollow);
        spindle.set_mode(AxisMode::PositionFollow);

        traverse.set_max_speed(self.traverse_speed);
        spindle.set_max_speed(self.spindle_speed);

        traverse.set_target(Target::Relative(self.traverse_steps));
        spindle.set_target(Target::Relative(self.spindle_steps));
    }
}

/// Planner for synchronized traverse/spindle moves
#[derive(Debug, Clone, Copy)]
pub struct MotionPlanner {
    steps_per_revolution: f32,
    max_axis_speed: f32,
    progress_threshold_s: f32,
}

impl MotionPlanner {
    /// Create a planner from the machine constants
    pub fn new(config: &MachineConfig) -> Self {
        Self {
            steps_per_revolution: config.steps_per_revolution,
            max_axis_speed: config.max_axis_speed,
            progress_threshold_s: config.progress_threshold_s,
        }
    }

    /// Plan a move of `primary_steps` on the traverse and
    /// `secondary_turns` on the spindle
    ///
    /// The traverse distance is taken as a magnitude and signed by
    /// `direction`. Returns `None` when both distances are zero.
    pub fn plan(
        &self,
        primary_steps: i32,
        secondary_turns: f32,
        direction: Direction,
    ) -> Option<SyncMove> {
        let primary_magnitude = primary_steps.unsigned_abs().min(i32::MAX as u32);
        let primary = primary_magnitude as f32;
        let secondary = magnitude(secondary_turns) * self.steps_per_revolution;

        let longest = if primary > secondary { primary } else { secondary };
        let duration_s = longest / self.max_axis_speed;
        if !(duration_s > 0.0) {
            return None;
        }

        // Scale by a ratio <= 1 so neither speed can round past the maximum
        Some(SyncMove {
            traverse_steps: direction.sign() * primary_magnitude as i32,
            spindle_steps: round_steps(secondary),
            traverse_speed: self.max_axis_speed * (primary / longest),
            spindle_speed: self.max_axis_speed * (secondary / longest),
            duration_s,
        })
    }

    /// Check whether a move is long enough to announce its duration
    pub fn reports_progress(&self, planned: &SyncMove) -> bool {
        planned.duration_s > self.progress_threshold_s
    }
}

fn magnitude(value: f32) -> f32 {
    if value < 0.0 {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimAxis;
    use proptest::prelude::*;

    fn planner() -> MotionPlanner {
        MotionPlanner::new(&MachineConfig::bench())
    }

    #[test]
    fn test_traverse_limited_move() {
        // 3200 steps vs 1 turn = 800 steps: traverse dominates
        let planned = planner().plan(3200, 1.0, Direction::Forward).unwrap();

        assert_eq!(planned.traverse_steps, 3200);
        assert_eq!(planned.spindle_steps, 800);
        assert!((planned.duration_s - 2.0).abs() < 1e-6);
        assert!((planned.traverse_speed - 1600.0).abs() < 1e-3);
        assert!((planned.spindle_speed - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_spindle_limited_move() {
        // 13.75 turns = 11000 steps vs 1000 traverse steps
        let planned = planner().plan(1000, 13.75, Direction::Forward).unwrap();

        assert_eq!(planned.spindle_steps, 11000);
        assert!((planned.spindle_speed - 1600.0).abs() < 1e-3);
        assert!((planned.duration_s - 6.875).abs() < 1e-5);
    }

    #[test]
    fn test_reverse_signs_traverse_only() {
        let planned = planner().plan(53, 10.0, Direction::Reverse).unwrap();
        assert_eq!(planned.traverse_steps, -53);
        assert_eq!(planned.spindle_steps, 8000);
    }

    #[test]
    fn test_negative_steps_use_magnitude() {
        let planned = planner().plan(-400, 0.0, Direction::Forward).unwrap();
        assert_eq!(planned.traverse_steps, 400);
        assert_eq!(planned.spindle_steps, 0);
        assert_eq!(planned.spindle_speed, 0.0);
    }

    #[test]
    fn test_zero_move_is_noop() {
        assert_eq!(planner().plan(0, 0.0, Direction::Forward), None);
        assert_eq!(planner().plan(0, -0.0, Direction::Reverse), None);
    }

    #[test]
    fn test_progress_threshold() {
        let p = planner();
        let short = p.plan(800, 0.0, Direction::Forward).unwrap();
        assert!(!p.reports_progress(&short));

        let long = p.plan(3200, 0.0, Direction::Forward).unwrap();
        assert!(p.reports_progress(&long));
        assert_eq!(long.duration_ms(), 2000);
    }

    #[test]
    fn test_apply_commands_both_axes() {
        let planned = planner().plan(300, 2.0, Direction::Reverse).unwrap();
        let mut traverse = SimAxis::new(1000);
        let mut spindle = SimAxis::new(1000);
        traverse.enable();
        spindle.enable();

        planned.apply(&mut traverse, &mut spindle);

        assert_eq!(traverse.mode(), AxisMode::PositionFollow);
        assert_eq!(traverse.target(), Some(-300));
        assert_eq!(spindle.target(), Some(1600));

        while traverse.tick() | spindle.tick() {}
        assert_eq!(traverse.current_position(), -300);
        assert_eq!(spindle.current_position(), 1600);
    }

    proptest! {
        #[test]
        fn prop_speeds_never_exceed_max(steps in -200_000i32..200_000, turns in 0.0f32..500.0) {
            let max = MachineConfig::bench().max_axis_speed;
            if let Some(planned) = planner().plan(steps, turns, Direction::Forward) {
                prop_assert!(planned.traverse_speed <= max);
                prop_assert!(planned.spindle_speed <= max);
                prop_assert!(planned.duration_s > 0.0);
            }
        }

        #[test]
        fn prop_speed_ratio_matches_distance_ratio(steps in 1i32..200_000, turns in 0.01f32..500.0) {
            let planned = planner().plan(steps, turns, Direction::Forward).unwrap();
            let expected = steps as f32 / (turns * 800.0);
            let actual = planned.traverse_speed / planned.spindle_speed;
            prop_assert!((actual - expected).abs() <= expected * 1e-4);
        }

        #[test]
        fn prop_both_axes_finish_together(steps in 1i32..200_000, turns in 0.01f32..500.0) {
            let planned = planner().plan(steps, turns, Direction::Forward).unwrap();
            let traverse_time = steps as f32 / planned.traverse_speed;
            let spindle_time = turns * 800.0 / planned.spindle_speed;
            prop_assert!((traverse_time - spindle_time).abs() <= planned.duration_s * 1e-4);
        }
    }
}
