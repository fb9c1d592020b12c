//! Settings session
//!
//! Edits a draft copy of the winding parameters. The draft replaces the
//! live parameters only when the sequence is confirmed to the end.

use crate::config::{SettingsSteps, WindingParameters};
use crate::state::SettingField;

/// Interactive editing of the winding parameters
#[derive(Debug, Clone)]
pub struct SettingsSession {
    steps: SettingsSteps,
    original: WindingParameters,
    draft: WindingParameters,
}

impl SettingsSession {
    /// Create an idle session
    pub fn new(steps: SettingsSteps) -> Self {
        let params = WindingParameters::default();
        Self {
            steps,
            original: params,
            draft: params,
        }
    }

    /// Start editing from the live parameters
    pub fn begin(&mut self, current: WindingParameters) {
        self.original = current;
        self.draft = current;
    }

    /// Draft value of a field
    pub fn value(&self, field: SettingField) -> f32 {
        match field {
            SettingField::Turns => self.draft.required_turns,
            SettingField::Left => self.draft.start_margin_mm,
            SettingField::Right => self.draft.end_margin_mm,
        }
    }

    /// Change a field by `delta`, clamped at the floor
    ///
    /// Returns the new value.
    pub fn adjust(&mut self, field: SettingField, delta: f32) -> f32 {
        let slot = match field {
            SettingField::Turns => &mut self.draft.required_turns,
            SettingField::Left => &mut self.draft.start_margin_mm,
            SettingField::Right => &mut self.draft.end_margin_mm,
        };
        let value = *slot + delta;
        *slot = if value < self.steps.floor {
            self.steps.floor
        } else {
            value
        };
        *slot
    }

    /// Edited parameters
    pub fn draft(&self) -> WindingParameters {
        self.draft
    }

    /// Check whether anything differs from the parameters the session
    /// started with
    pub fn is_changed(&self) -> bool {
        self.draft != self.original
    }
}
