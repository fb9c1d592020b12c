//! Step/direction stepper driver (A4988, DRV8825, TMC22xx in legacy mode)
//!
//! Steps are generated in software from `tick()`, which the control loop
//! calls as often as it can. Each due step raises the STEP line; the line
//! is lowered on the next call, so the pulse lasts one loop iteration.
//!
//! # Usage
//!
//! ```ignore
//! let mut axis = StepDirAxis::new(pins, clock, StepDirConfig::default())
//!     .with_halt(HALT.watch());
//! axis.enable();
//! axis.set_mode(AxisMode::PositionFollow);
//! axis.set_max_speed(1600.0);
//! axis.set_target(Target::Relative(800));
//!
//! while axis.tick() {}
//! ```

use embedded_hal::digital::OutputPin;

use spool_core::traits::{AxisDriver, AxisMode, Clock, Target};

use super::halt::HaltWatch;

/// Microseconds per second
const US_PER_S: f32 = 1_000_000.0;

/// Step/direction driver configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepDirConfig {
    /// DIR line is low for forward motion
    pub invert_direction: bool,
    /// EN line is low when the driver stage is powered
    pub enable_active_low: bool,
}

impl Default for StepDirConfig {
    fn default() -> Self {
        Self {
            invert_direction: false,
            enable_active_low: true,
        }
    }
}

/// Output lines of one driver
pub struct StepDirPins<P: OutputPin> {
    /// STEP line
    pub step: P,
    /// DIR line
    pub dir: P,
    /// EN line
    pub enable: P,
}

/// Software step generator for one step/direction driver
pub struct StepDirAxis<'a, P: OutputPin, C: Clock> {
    pins: StepDirPins<P>,
    clock: C,
    config: StepDirConfig,
    halt: Option<HaltWatch<'a>>,
    mode: AxisMode,
    position: i32,
    target: Option<i32>,
    max_speed: f32,
    speed: f32,
    enabled: bool,
    auto_power: bool,
    step_high: bool,
    last_step_us: Option<u64>,
}

impl<'a, P: OutputPin, C: Clock> StepDirAxis<'a, P, C> {
    /// Create an idle driver with the stage unpowered
    pub fn new(pins: StepDirPins<P>, clock: C, config: StepDirConfig) -> Self {
        let mut axis = Self {
            pins,
            clock,
            config,
            halt: None,
            mode: AxisMode::PositionFollow,
            position: 0,
            target: None,
            max_speed: 0.0,
            speed: 0.0,
            enabled: true,
            auto_power: false,
            step_high: false,
            last_step_us: None,
        };
        let _ = axis.pins.step.set_low();
        axis.disable();
        axis
    }

    /// Stop whenever the halt line is raised
    pub fn with_halt(mut self, halt: HaltWatch<'a>) -> Self {
        self.halt = Some(halt);
        self
    }

    /// Check whether the axis still has motion pending
    pub fn is_moving(&self) -> bool {
        match self.mode {
            AxisMode::Velocity => self.speed != 0.0,
            AxisMode::PositionFollow => self.target.is_some(),
        }
    }

    /// Signed direction of the next step and the step interval
    fn next_step(&self) -> Option<(i32, u64)> {
        let (direction, speed) = match self.mode {
            AxisMode::Velocity => {
                if self.speed > 0.0 {
                    (1, self.speed)
                } else if self.speed < 0.0 {
                    (-1, -self.speed)
                } else {
                    return None;
                }
            }
            AxisMode::PositionFollow => {
                let target = self.target?;
                let direction = if target > self.position { 1 } else { -1 };
                (direction, self.max_speed)
            }
        };

        if !(speed > 0.0) {
            return None;
        }
        let interval_us = (US_PER_S / speed) as u64;
        Some((direction, interval_us.max(1)))
    }

    fn write_direction(&mut self, direction: i32) {
        let forward = direction > 0;
        let _ = if forward != self.config.invert_direction {
            self.pins.dir.set_high()
        } else {
            self.pins.dir.set_low()
        };
    }

    fn write_enable(&mut self, on: bool) {
        let _ = if on != self.config.enable_active_low {
            self.pins.enable.set_high()
        } else {
            self.pins.enable.set_low()
        };
    }

    fn finish_step_pulse(&mut self) {
        if self.step_high {
            let _ = self.pins.step.set_low();
            self.step_high = false;
        }
    }
}

impl<P: OutputPin, C: Clock> AxisDriver for StepDirAxis<'_, P, C> {
    fn set_mode(&mut self, mode: AxisMode) {
        self.mode = mode;
        self.target = None;
        self.speed = 0.0;
    }

    fn set_max_speed(&mut self, steps_per_s: f32) {
        self.max_speed = steps_per_s;
    }

    fn set_target(&mut self, target: Target) {
        let absolute = match target {
            Target::Relative(delta) => self.position.saturating_add(delta),
            Target::Absolute(position) => position,
        };
        self.target = (absolute != self.position).then_some(absolute);
        self.last_step_us = None;
    }

    fn set_speed(&mut self, steps_per_s: f32) {
        self.speed = steps_per_s;
        self.last_step_us = None;
    }

    fn set_current_position(&mut self, steps: i32) {
        if let Some(target) = self.target {
            self.target = Some(steps.saturating_add(target - self.position));
        }
        self.position = steps;
    }

    fn current_position(&self) -> i32 {
        self.position
    }

    fn tick(&mut self) -> bool {
        self.finish_step_pulse();

        if let Some(halt) = self.halt.as_mut() {
            if halt.take() {
                self.stop();
                return false;
            }
        }

        let Some((direction, interval_us)) = self.next_step() else {
            if self.auto_power && self.enabled {
                self.disable();
            }
            return false;
        };

        if self.auto_power && !self.enabled {
            self.enable();
        }

        let now = self.clock.now_us();
        let due = match self.last_step_us {
            Some(last) => now.wrapping_sub(last) >= interval_us,
            None => true,
        };

        if due {
            self.write_direction(direction);
            let _ = self.pins.step.set_high();
            self.step_high = true;
            self.position = self.position.wrapping_add(direction);
            self.last_step_us = Some(now);

            if self.target == Some(self.position) {
                self.target = None;
            }
        }

        self.is_moving()
    }

    fn enable(&mut self) {
        self.write_enable(true);
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.write_enable(false);
        self.enabled = false;
    }

    fn set_auto_power(&mut self, auto: bool) {
        self.auto_power = auto;
    }

    fn stop(&mut self) {
        self.target = None;
        self.speed = 0.0;
        self.last_step_us = None;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stepper::HaltLine;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use spool_core::config::MachineConfig;
    use spool_core::motion::MotionPlanner;
    use spool_core::traits::Direction;

    #[derive(Default)]
    struct Line {
        high: Cell<bool>,
        rises: Cell<u32>,
    }

    struct MockPin<'a>(&'a Line);

    impl ErrorType for MockPin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for MockPin<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.high.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            if !self.0.high.get() {
                self.0.rises.set(self.0.rises.get() + 1);
            }
            self.0.high.set(true);
            Ok(())
        }
    }

    struct FakeClock<'a>(&'a Cell<u64>);

    impl Clock for FakeClock<'_> {
        fn now_us(&self) -> u64 {
            self.0.get()
        }
    }

    struct Rig {
        step: Line,
        dir: Line,
        enable: Line,
        time: Cell<u64>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                step: Line::default(),
                dir: Line::default(),
                enable: Line::default(),
                time: Cell::new(0),
            }
        }

        fn axis(&self) -> StepDirAxis<'_, MockPin<'_>, FakeClock<'_>> {
            let pins = StepDirPins {
                step: MockPin(&self.step),
                dir: MockPin(&self.dir),
                enable: MockPin(&self.enable),
            };
            StepDirAxis::new(pins, FakeClock(&self.time), StepDirConfig::default())
        }

        fn advance_us(&self, us: u64) {
            self.time.set(self.time.get() + us);
        }
    }

    #[test]
    fn test_starts_disabled() {
        let rig = Rig::new();
        let axis = rig.axis();
        assert!(!axis.is_enabled());
        // Active-low enable: high means off
        assert!(rig.enable.high.get());
    }

    #[test]
    fn test_relative_move_steps_at_speed() {
        let rig = Rig::new();
        let mut axis = rig.axis();
        axis.enable();
        axis.set_mode(AxisMode::PositionFollow);
        axis.set_max_speed(1000.0);
        axis.set_target(Target::Relative(3));

        // First step is immediate
        assert!(axis.tick());
        assert_eq!(axis.current_position(), 1);

        // Not due yet
        rig.advance_us(500);
        assert!(axis.tick());
        assert_eq!(axis.current_position(), 1);

        rig.advance_us(500);
        assert!(axis.tick());
        rig.advance_us(1000);
        assert!(!axis.tick());

        assert_eq!(axis.current_position(), 3);
        assert_eq!(rig.step.rises.get(), 3);
        assert!(rig.dir.high.get());
        assert!(!axis.tick());
    }

    #[test]
    fn test_velocity_mode_reverse() {
        let rig = Rig::new();
        let mut axis = rig.axis();
        axis.set_mode(AxisMode::Velocity);
        axis.set_speed(-2000.0);

        for _ in 0..4 {
            assert!(axis.tick());
            rig.advance_us(500);
        }
        assert_eq!(axis.current_position(), -4);
        assert!(!rig.dir.high.get());

        axis.stop();
        assert!(!axis.tick());
        axis.stop();
        assert!(!axis.tick());
    }

    #[test]
    fn test_halt_line_stops_axis() {
        let line = HaltLine::new();
        let rig = Rig::new();
        let mut axis = rig.axis().with_halt(line.watch());
        axis.set_mode(AxisMode::Velocity);
        axis.set_speed(1000.0);
        assert!(axis.tick());

        line.request();
        rig.advance_us(1000);
        assert!(!axis.tick());
        assert_eq!(axis.current_position(), 1);
        assert!(!axis.is_moving());
    }

    #[test]
    fn test_auto_power_follows_motion() {
        let rig = Rig::new();
        let mut axis = rig.axis();
        axis.set_auto_power(true);
        axis.set_max_speed(1000.0);
        axis.set_target(Target::Relative(1));

        axis.tick();
        assert!(axis.is_enabled());
        axis.tick();
        assert!(!axis.is_enabled());
    }

    #[test]
    fn test_redefine_position_keeps_target_distance() {
        let rig = Rig::new();
        let mut axis = rig.axis();
        axis.set_max_speed(1000.0);
        axis.set_target(Target::Absolute(10));
        axis.set_current_position(-5);
        assert_eq!(axis.current_position(), -5);

        let mut steps = 0;
        while axis.tick() {
            rig.advance_us(1000);
            steps += 1;
        }
        assert_eq!(axis.current_position(), 5);
        assert_eq!(steps, 9);
    }

    #[test]
    fn test_synchronized_move_arrives_together() {
        let config = MachineConfig::bench();
        let planned = MotionPlanner::new(&config)
            .plan(400, 1.0, Direction::Forward)
            .unwrap();

        let traverse_rig = Rig::new();
        let spindle_rig = Rig::new();
        let mut traverse = traverse_rig.axis();
        let mut spindle = spindle_rig.axis();
        planned.apply(&mut traverse, &mut spindle);

        let mut elapsed_us = 0u64;
        let mut traverse_done = None;
        let mut spindle_done = None;
        while traverse_done.is_none() || spindle_done.is_none() {
            if !traverse.tick() && traverse_done.is_none() {
                traverse_done = Some(elapsed_us);
            }
            if !spindle.tick() && spindle_done.is_none() {
                spindle_done = Some(elapsed_us);
            }
            traverse_rig.advance_us(25);
            spindle_rig.advance_us(25);
            elapsed_us += 25;
        }

        assert_eq!(traverse.current_position(), 400);
        assert_eq!(spindle.current_position(), 800);
        let (a, b) = (traverse_done.unwrap(), spindle_done.unwrap());
        // 0.5 s move, within a few step intervals of each other
        assert!(a.abs_diff(b) <= 2_000, "traverse {} us, spindle {} us", a, b);
    }
}
