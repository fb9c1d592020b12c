//! Process controller
//!
//! Owns both axes and every engine. Driven once per main-loop iteration
//! by [`ProcessController::tick`], and by operator commands between ticks.
//!
//! Every state change is reported as [`Notice::StateChanged`]. Every
//! refused operation is reported exactly once as [`Notice::Error`].

use crate::calibration::{CalibratedGeometry, CalibrationEngine, CalibrationEvent};
use crate::config::{ConfigError, MachineConfig, WindingParameters};
use crate::input::{interpret, Command};
use crate::motion::{MotionPlanner, SyncMove};
use crate::safety::StopSignal;
use crate::state::{Notice, Operation, ProcessError, ProcessState, SettingField};
use crate::traits::{AxisDriver, AxisMode, ParameterStore, ProcessObserver, Target};
use crate::wrap::{WrapCycle, WrapPhase, WrapStep};

use super::settings::SettingsSession;

/// Top-level process controller
pub struct ProcessController<'a, A, O, P>
where
    A: AxisDriver,
    O: ProcessObserver,
    P: ParameterStore,
{
    state: ProcessState,
    config: MachineConfig,
    params: WindingParameters,
    geometry: Option<CalibratedGeometry>,
    traverse: A,
    spindle: A,
    signal: &'a StopSignal,
    planner: MotionPlanner,
    calibration: CalibrationEngine,
    wrap: WrapCycle,
    settings: SettingsSession,
    observer: O,
    store: P,
    traverse_moving: bool,
    spindle_moving: bool,
}

impl<'a, A, O, P> ProcessController<'a, A, O, P>
where
    A: AxisDriver,
    O: ProcessObserver,
    P: ParameterStore,
{
    /// Create a controller in `Init` with both axes unpowered
    pub fn new(
        config: MachineConfig,
        params: WindingParameters,
        mut traverse: A,
        mut spindle: A,
        signal: &'a StopSignal,
        observer: O,
        store: P,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        for axis in [&mut traverse, &mut spindle] {
            axis.set_auto_power(false);
            axis.set_mode(AxisMode::PositionFollow);
            axis.set_max_speed(config.max_axis_speed);
            axis.disable();
        }

        Ok(Self {
            state: ProcessState::Init,
            config,
            params,
            geometry: None,
            traverse,
            spindle,
            signal,
            planner: MotionPlanner::new(&config),
            calibration: CalibrationEngine::new(&config),
            wrap: WrapCycle::new(&config),
            settings: SettingsSession::new(config.settings),
            observer,
            store,
            traverse_moving: false,
            spindle_moving: false,
        })
    }

    /// Current process state
    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Live winding parameters
    pub fn params(&self) -> WindingParameters {
        self.params
    }

    /// Calibrated geometry, if still valid
    pub fn geometry(&self) -> Option<CalibratedGeometry> {
        self.geometry
    }

    /// Machine configuration in use
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Wrap cycle phase, while wrapping
    pub fn wrap_phase(&self) -> Option<WrapPhase> {
        (self.state == ProcessState::Wrapping).then(|| self.wrap.phase())
    }

    /// Calibration engine, for inspection
    pub fn calibration(&self) -> &CalibrationEngine {
        &self.calibration
    }

    /// Traverse axis
    pub fn traverse(&self) -> &A {
        &self.traverse
    }

    /// Spindle axis
    pub fn spindle(&self) -> &A {
        &self.spindle
    }

    /// Observer receiving the notices
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the observer
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Parameter store
    pub fn store(&self) -> &P {
        &self.store
    }

    /// Advance the axes and whichever engine the state selects
    pub fn tick(&mut self, now_ms: u32) {
        self.traverse_moving = self.traverse.tick();
        self.spindle_moving = self.spindle.tick();

        // Calibration consumes its own triggers
        if self.state != ProcessState::Calibrating && self.signal.take() {
            self.emergency_stop();
            return;
        }

        match self.state {
            ProcessState::Calibrating => self.poll_calibration(now_ms),
            ProcessState::MovingHome => self.poll_homing(),
            ProcessState::Wrapping => self.poll_wrap(),
            _ => {}
        }
    }

    /// Interpret an operator command and apply it
    ///
    /// `limit_engaged` is the current level of the limit-switch line.
    /// Commands without a meaning in the current state are ignored.
    pub fn handle(&mut self, command: Command, limit_engaged: bool) {
        if let Some(operation) = interpret(command, self.state, limit_engaged, &self.config) {
            // Refusals are already reported to the observer
            let _ = self.apply(operation);
        }
    }

    /// Apply an operation through the transition table
    pub fn apply(&mut self, operation: Operation) -> Result<(), ProcessError> {
        let Some(next) = self.state.apply(operation) else {
            return Err(self.reject(ProcessError::IllegalCommand {
                state: self.state,
                operation,
            }));
        };

        match operation {
            Operation::Start => match self.state {
                ProcessState::Init => self.start_calibration(),
                ProcessState::Ready => self.start_homing(),
                ProcessState::Home => return self.start_wrap(),
                _ => {}
            },
            Operation::Abort => self.abort(),
            Operation::EnterSettings => {
                self.settings.begin(self.params);
                self.enter(next);
                self.show_value(SettingField::Turns);
            }
            Operation::Confirm => match next.setting_field() {
                Some(field) => {
                    self.enter(next);
                    self.show_value(field);
                }
                None => self.finish_settings(),
            },
            Operation::Adjust(delta) => {
                if let Some(field) = self.state.setting_field() {
                    let value = self.settings.adjust(field, delta);
                    self.observer.notify(Notice::ShowValue { field, value });
                }
            }
            Operation::Jog(mm) => self.jog(mm),
        }

        Ok(())
    }

    fn enter(&mut self, state: ProcessState) {
        self.state = state;
        self.observer.notify(Notice::StateChanged(state));
    }

    /// Leave an active state once its motion has finished
    fn complete(&mut self) {
        if let Some(next) = self.state.on_completion() {
            self.enter(next);
        }
    }

    fn reject(&mut self, error: ProcessError) -> ProcessError {
        self.observer.notify(Notice::Error(error));
        error
    }

    fn show_value(&mut self, field: SettingField) {
        let value = self.settings.value(field);
        self.observer.notify(Notice::ShowValue { field, value });
    }

    fn report_progress(&mut self, planned: Option<SyncMove>) {
        if let Some(planned) = planned {
            if self.planner.reports_progress(&planned) {
                self.observer.notify(Notice::Processing {
                    estimated_ms: planned.duration_ms(),
                });
            }
        }
    }

    fn stop_axes(&mut self) {
        self.traverse.stop();
        self.spindle.stop();
        self.traverse.disable();
        self.spindle.disable();
        self.traverse_moving = false;
        self.spindle_moving = false;
    }

    /// Return to `Init` with everything discarded
    fn reset_to_init(&mut self) {
        self.stop_axes();
        self.calibration.reset();
        self.wrap.reset();
        self.geometry = None;
        // Arming asks the monitor to look at the line again, which is only
        // needed when a calibration leg left it detached
        if !self.signal.is_armed() {
            self.signal.arm();
        }
        self.enter(ProcessState::Init);
    }

    fn abort(&mut self) {
        // A trigger that fired before the abort belongs to the discarded run
        self.signal.clear();
        self.reset_to_init();
        self.observer.notify(Notice::Aborted);
    }

    fn emergency_stop(&mut self) {
        self.reset_to_init();
        self.reject(ProcessError::EmergencyStop);
    }

    fn start_calibration(&mut self) {
        self.geometry = None;
        self.wrap.reset();
        self.enter(ProcessState::Calibrating);
        self.observer.notify(Notice::CalibrationStarted);
        self.calibration
            .begin(self.signal, &mut self.traverse, &mut self.spindle);
    }

    fn poll_calibration(&mut self, now_ms: u32) {
        // Outside the two seek legs a trigger is not part of the sequence
        if !self.calibration.expects_limit() && self.signal.take() {
            self.emergency_stop();
            return;
        }

        let event = self.calibration.poll(
            now_ms,
            self.signal,
            &mut self.traverse,
            self.traverse_moving,
        );

        match event {
            Some(CalibrationEvent::FirstLimitFound) => {
                self.observer.notify(Notice::FirstLimitFound);
            }
            Some(CalibrationEvent::TravelMeasured { steps }) => {
                self.observer.notify(Notice::TravelMeasured { steps });
            }
            Some(CalibrationEvent::Complete { travel_steps }) => {
                self.geometry = Some(CalibratedGeometry::new(travel_steps));
                self.observer
                    .notify(Notice::CalibrationComplete { travel_steps });
                self.complete();
            }
            None => {}
        }
    }

    fn start_homing(&mut self) {
        self.spindle.disable();
        self.traverse.enable();
        self.traverse.set_mode(AxisMode::PositionFollow);
        self.traverse.set_max_speed(self.config.max_axis_speed);
        self.traverse.set_target(Target::Absolute(0));

        let distance = self.traverse.current_position().unsigned_abs() as f32;
        let estimated_ms = (distance * 1000.0 / self.config.max_axis_speed) as u32;

        self.enter(ProcessState::MovingHome);
        self.observer.notify(Notice::HomingStarted);
        self.observer.notify(Notice::Processing { estimated_ms });
    }

    fn poll_homing(&mut self) {
        if !self.traverse_moving {
            self.complete();
        }
    }

    fn start_wrap(&mut self) -> Result<(), ProcessError> {
        let Some(geometry) = self.geometry else {
            return Err(self.reject(ProcessError::NotCalibrated));
        };

        self.enter(ProcessState::Wrapping);
        self.observer.notify(Notice::WrapStarted);

        let planned = self.wrap.begin(
            &self.planner,
            &self.params,
            geometry.travel_steps,
            &mut self.traverse,
            &mut self.spindle,
        );
        self.report_progress(planned);
        Ok(())
    }

    fn poll_wrap(&mut self) {
        if self.traverse_moving || self.spindle_moving {
            return;
        }

        match self
            .wrap
            .advance(&self.planner, &mut self.traverse, &mut self.spindle)
        {
            WrapStep::Advanced { planned, .. } => self.report_progress(planned),
            WrapStep::Complete => {
                self.observer.notify(Notice::WrapComplete);
                self.complete();
            }
        }
    }

    fn finish_settings(&mut self) {
        let changed = self.settings.is_changed();
        if changed {
            self.params = self.settings.draft();
            self.store.persist(self.params);
        }
        self.observer.notify(Notice::SettingsSaved { changed });

        // New margins need a fresh calibration run from `Init`
        self.geometry = None;
        self.enter(ProcessState::Init);
    }

    fn jog(&mut self, mm: f32) {
        let steps = self.config.mm_to_steps(mm);
        self.traverse.enable();
        self.traverse.set_mode(AxisMode::PositionFollow);
        self.traverse.set_max_speed(self.config.max_axis_speed);
        self.traverse.set_target(Target::Relative(steps));
    }
}
