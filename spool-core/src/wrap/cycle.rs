//! Wrap cycle engine
//!
//! The cycle starts at the winding origin with the lead-in move already
//! issued. Each phase transition fires only once both axes are idle:
//!
//! ```text
//! MoveStart -> Start -> WrapStart -> MoveEnd -> End -> WrapEnd -> Complete
//!              (seat)   (span a)     (span b)  (seat)
//! ```
//!
//! The span between the margins is split by `span_ratio`. Each part
//! carries half of the required turns.

use crate::config::machine::round_steps;
use crate::config::{MachineConfig, WindingParameters};
use crate::motion::{MotionPlanner, SyncMove};
use crate::traits::{AxisDriver, Direction};

/// Phase of the wrap cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WrapPhase {
    /// Lead-in move to the start margin in progress
    MoveStart,
    /// At the start margin
    Start,
    /// Seating the wire start
    WrapStart,
    /// First part of the span in progress
    MoveEnd,
    /// Second part of the span in progress
    End,
    /// Seating the wire end
    WrapEnd,
    /// All motion finished
    Complete,
}

impl WrapPhase {
    /// Phase that follows this one
    pub fn next(self) -> Self {
        match self {
            WrapPhase::MoveStart => WrapPhase::Start,
            WrapPhase::Start => WrapPhase::WrapStart,
            WrapPhase::WrapStart => WrapPhase::MoveEnd,
            WrapPhase::MoveEnd => WrapPhase::End,
            WrapPhase::End => WrapPhase::WrapEnd,
            WrapPhase::WrapEnd | WrapPhase::Complete => WrapPhase::Complete,
        }
    }
}

/// Result of advancing the cycle by one step
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WrapStep {
    /// Entered a new phase, possibly issuing a move
    Advanced {
        phase: WrapPhase,
        planned: Option<SyncMove>,
    },
    /// The cycle finished and both axes are powered again
    Complete,
}

/// Wrap cycle engine
#[derive(Debug, Clone)]
pub struct WrapCycle {
    phase: WrapPhase,
    span_steps: i32,
    half_turns: f32,
    steps_per_mm: f32,
    fix_steps: i32,
    fix_turns: f32,
    span_ratio: f32,
    lead_in_turns_per_mm: f32,
}

impl WrapCycle {
    /// Create an idle engine for the given machine
    pub fn new(config: &MachineConfig) -> Self {
        Self {
            phase: WrapPhase::Complete,
            span_steps: 0,
            half_turns: 0.0,
            steps_per_mm: config.steps_per_mm(),
            fix_steps: config.fix_steps(),
            fix_turns: config.fix_turns,
            span_ratio: config.span_ratio,
            lead_in_turns_per_mm: config.lead_in_turns_per_mm,
        }
    }

    /// Current phase
    pub fn phase(&self) -> WrapPhase {
        self.phase
    }

    /// Winding span for a calibrated travel
    ///
    /// A span that would be negative (margins wider than the travel) is
    /// clamped to zero: the spindle still winds, the traverse stays put.
    pub fn compute_span(&self, params: &WindingParameters, travel_steps: i32) -> i32 {
        let margins = round_steps((params.start_margin_mm + params.end_margin_mm) * self.steps_per_mm);
        travel_steps
            .saturating_add(self.fix_steps)
            .saturating_sub(margins)
            .max(0)
    }

    /// Start a new cycle from the winding origin
    ///
    /// Powers both axes with auto-power off and issues the lead-in move to
    /// the start margin.
    pub fn begin<A: AxisDriver>(
        &mut self,
        planner: &MotionPlanner,
        params: &WindingParameters,
        travel_steps: i32,
        traverse: &mut A,
        spindle: &mut A,
    ) -> Option<SyncMove> {
        self.phase = WrapPhase::MoveStart;
        self.span_steps = self.compute_span(params, travel_steps);
        self.half_turns = params.required_turns / 2.0;

        traverse.set_auto_power(false);
        spindle.set_auto_power(false);
        traverse.enable();
        spindle.enable();

        let lead_in_steps = round_steps(params.start_margin_mm * self.steps_per_mm);
        let lead_in_turns = params.start_margin_mm * self.lead_in_turns_per_mm;
        Self::issue(planner, lead_in_steps, lead_in_turns, Direction::Forward, traverse, spindle)
    }

    /// Advance to the next phase
    ///
    /// Must only be called while both axes are idle.
    pub fn advance<A: AxisDriver>(
        &mut self,
        planner: &MotionPlanner,
        traverse: &mut A,
        spindle: &mut A,
    ) -> WrapStep {
        if self.phase == WrapPhase::Complete {
            traverse.enable();
            spindle.enable();
            return WrapStep::Complete;
        }

        let first_part = round_steps(self.span_steps as f32 * self.span_ratio);
        let phase = self.phase.next();

        let planned = match phase {
            WrapPhase::WrapStart | WrapPhase::WrapEnd => Self::issue(
                planner,
                self.fix_steps,
                self.fix_turns,
                Direction::Reverse,
                traverse,
                spindle,
            ),
            WrapPhase::MoveEnd => Self::issue(
                planner,
                first_part,
                self.half_turns,
                Direction::Forward,
                traverse,
                spindle,
            ),
            WrapPhase::End => Self::issue(
                planner,
                self.span_steps - first_part,
                self.half_turns,
                Direction::Forward,
                traverse,
                spindle,
            ),
            WrapPhase::MoveStart | WrapPhase::Start | WrapPhase::Complete => None,
        };

        self.phase = phase;
        WrapStep::Advanced { phase, planned }
    }

    /// Discard the cycle
    pub fn reset(&mut self) {
        self.phase = WrapPhase::Complete;
        self.span_steps = 0;
        self.half_turns = 0.0;
    }

    fn issue<A: AxisDriver>(
        planner: &MotionPlanner,
        steps: i32,
        turns: f32,
        direction: Direction,
        traverse: &mut A,
        spindle: &mut A,
    ) -> Option<SyncMove> {
        let planned = planner.plan(steps, turns, direction)?;
        planned.apply(traverse, spindle);
        Some(planned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimAxis;
    use crate::traits::AxisDriver;

    fn run_idle(traverse: &mut SimAxis, spindle: &mut SimAxis) {
        while traverse.tick() | spindle.tick() {}
    }

    #[test]
    fn test_span_calculation() {
        let config = MachineConfig::bench();
        let cycle = WrapCycle::new(&config);
        let params = WindingParameters::default();

        // 3000 steps travel + 53 fix - 80 mm * 13.333 steps/mm (1067)
        assert_eq!(cycle.compute_span(&params, 3000), 3000 + 53 - 1067);
    }

    #[test]
    fn test_span_clamped_at_zero() {
        let cycle = WrapCycle::new(&MachineConfig::bench());
        let params = WindingParameters {
            required_turns: 10.0,
            start_margin_mm: 100.0,
            end_margin_mm: 100.0,
        };
        assert_eq!(cycle.compute_span(&params, 500), 0);
    }

    #[test]
    fn test_begin_issues_lead_in() {
        let config = MachineConfig::bench();
        let planner = MotionPlanner::new(&config);
        let mut cycle = WrapCycle::new(&config);
        let mut traverse = SimAxis::new(50);
        let mut spindle = SimAxis::new(50);
        traverse.set_auto_power(true);

        let planned = cycle
            .begin(&planner, &WindingParameters::default(), 3000, &mut traverse, &mut spindle)
            .unwrap();

        assert_eq!(cycle.phase(), WrapPhase::MoveStart);
        assert_eq!(planned.traverse_steps, 533);
        // 40 mm at 0.1 turns/mm
        assert_eq!(planned.spindle_steps, 3200);
        assert!(!traverse.auto_power());
        assert!(!spindle.auto_power());
    }

    #[test]
    fn test_full_cycle_positions() {
        let config = MachineConfig::bench();
        let planner = MotionPlanner::new(&config);
        let mut cycle = WrapCycle::new(&config);
        let mut traverse = SimAxis::new(40);
        let mut spindle = SimAxis::new(40);
        let params = WindingParameters::default();

        cycle.begin(&planner, &params, 3000, &mut traverse, &mut spindle);
        let span = cycle.compute_span(&params, 3000);

        let mut phases = std::vec::Vec::new();
        loop {
            run_idle(&mut traverse, &mut spindle);
            match cycle.advance(&planner, &mut traverse, &mut spindle) {
                WrapStep::Advanced { phase, .. } => phases.push(phase),
                WrapStep::Complete => break,
            }
        }

        assert_eq!(
            phases,
            [
                WrapPhase::Start,
                WrapPhase::WrapStart,
                WrapPhase::MoveEnd,
                WrapPhase::End,
                WrapPhase::WrapEnd,
                WrapPhase::Complete,
            ]
        );

        // Lead-in, two seating retracts and the full span
        let fix = config.fix_steps();
        assert_eq!(traverse.current_position(), 533 - fix + span - fix);

        // Lead-in turns, two seating moves and the required turns
        let expected_turns = 4.0 + 2.0 * config.fix_turns + params.required_turns;
        assert_eq!(spindle.current_position(), (expected_turns * 800.0) as i32);

        assert!(traverse.is_enabled());
        assert!(spindle.is_enabled());
    }

    #[test]
    fn test_seating_moves_reverse_traverse_only() {
        let config = MachineConfig::bench();
        let planner = MotionPlanner::new(&config);
        let mut cycle = WrapCycle::new(&config);
        let mut traverse = SimAxis::new(1000);
        let mut spindle = SimAxis::new(1000);

        cycle.begin(&planner, &WindingParameters::default(), 3000, &mut traverse, &mut spindle);
        run_idle(&mut traverse, &mut spindle);
        cycle.advance(&planner, &mut traverse, &mut spindle);

        let step = cycle.advance(&planner, &mut traverse, &mut spindle);
        let WrapStep::Advanced { phase, planned: Some(planned) } = step else {
            panic!("expected a seating move, got {:?}", step);
        };
        assert_eq!(phase, WrapPhase::WrapStart);
        assert_eq!(planned.traverse_steps, -config.fix_steps());
        assert_eq!(planned.spindle_steps, 8000);
    }
}
