//! Deterministic collaborators for host tests and bench simulation
//!
//! `SimAxis` moves a fixed number of steps per `tick()` regardless of the
//! commanded speed, so a test controls elapsed motion by counting ticks.

use heapless::Vec;

use crate::config::WindingParameters;
use crate::state::{Notice, ProcessState};
use crate::traits::{AxisDriver, AxisMode, ParameterStore, ProcessObserver, Target};

/// Simulated axis driver
#[derive(Debug, Clone)]
pub struct SimAxis {
    steps_per_tick: i32,
    position: i32,
    mode: AxisMode,
    max_speed: f32,
    speed: f32,
    target: Option<i32>,
    enabled: bool,
    auto_power: bool,
    enable_calls: u32,
    disable_calls: u32,
    stop_calls: u32,
}

impl SimAxis {
    /// Create an idle, disabled axis at position 0
    pub fn new(steps_per_tick: i32) -> Self {
        Self {
            steps_per_tick: steps_per_tick.max(1),
            position: 0,
            mode: AxisMode::PositionFollow,
            max_speed: 0.0,
            speed: 0.0,
            target: None,
            enabled: false,
            auto_power: false,
            enable_calls: 0,
            disable_calls: 0,
            stop_calls: 0,
        }
    }

    /// Current motion mode
    pub fn mode(&self) -> AxisMode {
        self.mode
    }

    /// Absolute target position, if one is pending
    pub fn target(&self) -> Option<i32> {
        self.target
    }

    /// Speed last set for position-follow moves
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Signed speed last set for velocity mode
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Whether automatic power control is on
    pub fn auto_power(&self) -> bool {
        self.auto_power
    }

    /// Number of `enable()` calls
    pub fn enable_calls(&self) -> u32 {
        self.enable_calls
    }

    /// Number of `disable()` calls
    pub fn disable_calls(&self) -> u32 {
        self.disable_calls
    }

    /// Number of `stop()` calls
    pub fn stop_calls(&self) -> u32 {
        self.stop_calls
    }

    /// Check whether the axis would move on the next tick
    pub fn is_moving(&self) -> bool {
        match self.mode {
            AxisMode::Velocity => self.speed != 0.0,
            AxisMode::PositionFollow => self.target.is_some(),
        }
    }
}

impl AxisDriver for SimAxis {
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
        self.target = if absolute == self.position {
            None
        } else {
            Some(absolute)
        };
    }

    fn set_speed(&mut self, steps_per_s: f32) {
        self.speed = steps_per_s;
    }

    fn set_current_position(&mut self, steps: i32) {
        if let Some(target) = self.target {
            // Keep the remaining distance, as a real driver would
            let remaining = target - self.position;
            self.target = Some(steps + remaining);
        }
        self.position = steps;
    }

    fn current_position(&self) -> i32 {
        self.position
    }

    fn tick(&mut self) -> bool {
        match self.mode {
            AxisMode::Velocity => {
                if self.speed > 0.0 {
                    self.position = self.position.saturating_add(self.steps_per_tick);
                } else if self.speed < 0.0 {
                    self.position = self.position.saturating_sub(self.steps_per_tick);
                } else {
                    return false;
                }
                true
            }
            AxisMode::PositionFollow => {
                let Some(target) = self.target else {
                    return false;
                };
                let remaining = target - self.position;
                let step = remaining.clamp(-self.steps_per_tick, self.steps_per_tick);
                self.position += step;
                if self.position == target {
                    self.target = None;
                    false
                } else {
                    true
                }
            }
        }
    }

    fn enable(&mut self) {
        self.enabled = true;
        self.enable_calls += 1;
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.disable_calls += 1;
    }

    fn set_auto_power(&mut self, auto: bool) {
        self.auto_power = auto;
    }

    fn stop(&mut self) {
        self.target = None;
        self.speed = 0.0;
        self.stop_calls += 1;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Maximum number of notices kept by [`RecordingObserver`]
pub const MAX_RECORDED_NOTICES: usize = 128;

/// Observer that records every notice
#[derive(Debug, Default)]
pub struct RecordingObserver {
    notices: Vec<Notice, MAX_RECORDED_NOTICES>,
}

impl RecordingObserver {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self { notices: Vec::new() }
    }

    /// All recorded notices in delivery order
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Number of error notices
    pub fn error_count(&self) -> usize {
        self.notices.iter().filter(|n| n.is_error()).count()
    }

    /// Check whether a notice was recorded
    pub fn contains(&self, notice: &Notice) -> bool {
        self.notices.iter().any(|n| n == notice)
    }

    /// States entered, in order
    pub fn states(&self) -> impl Iterator<Item = ProcessState> + '_ {
        self.notices.iter().filter_map(|n| match n {
            Notice::StateChanged(state) => Some(*state),
            _ => None,
        })
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.notices.clear();
    }
}

impl ProcessObserver for RecordingObserver {
    fn notify(&mut self, notice: Notice) {
        // Oldest notices are kept; a full recorder drops new ones
        let _ = self.notices.push(notice);
    }
}

/// In-memory parameter store
#[derive(Debug, Default)]
pub struct MemoryStore {
    stored: Option<WindingParameters>,
    saves: u32,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Last persisted parameters
    pub fn stored(&self) -> Option<WindingParameters> {
        self.stored
    }

    /// Number of persist calls
    pub fn saves(&self) -> u32 {
        self.saves
    }
}

impl ParameterStore for MemoryStore {
    fn persist(&mut self, params: WindingParameters) {
        self.stored = Some(params);
        self.saves += 1;
    }
}
