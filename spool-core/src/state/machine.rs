//! Process state definition
//!
//! Which operations are legal is a function of the current state only.
//! Side effects (axis commands, notices) belong to the controller.

use super::events::{Operation, SettingField};

/// Top-level process states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProcessState {
    /// Power-on or after an abort; travel unknown
    Init,
    /// Measuring the traverse travel between the two limits
    Calibrating,
    /// Traverse moving to the winding origin
    MovingHome,
    /// At the winding origin, ready to wind
    Home,
    /// Wrap cycle in progress
    Wrapping,
    /// Calibrated (or cycle finished), waiting for start
    Ready,
    /// Editing the required turns
    SettingTurns,
    /// Editing the start margin
    SettingLeft,
    /// Editing the end margin
    SettingRight,
}

impl ProcessState {
    /// Check if this is one of the settings states
    pub fn is_settings(&self) -> bool {
        self.setting_field().is_some()
    }

    /// Field edited in this state, if any
    pub fn setting_field(&self) -> Option<SettingField> {
        match self {
            ProcessState::SettingTurns => Some(SettingField::Turns),
            ProcessState::SettingLeft => Some(SettingField::Left),
            ProcessState::SettingRight => Some(SettingField::Right),
            _ => None,
        }
    }

    /// Look up an operator operation in the transition table
    ///
    /// Returns the next state, or `None` if the operation is not permitted
    /// here. Preconditions beyond the state (calibration validity) are
    /// checked by the controller.
    pub fn apply(self, operation: Operation) -> Option<Self> {
        use Operation::*;
        use ProcessState::*;

        match (self, operation) {
            (Init, Start) => Some(Calibrating),
            (Home, Start) => Some(Wrapping),
            (Ready, Start) => Some(MovingHome),

            (Calibrating | Wrapping | MovingHome | Home, Abort) => Some(Init),

            (Ready | Home | Init, EnterSettings) => Some(SettingTurns),

            (SettingTurns, Confirm) => Some(SettingLeft),
            (SettingLeft, Confirm) => Some(SettingRight),
            (SettingRight, Confirm) => Some(Init),

            (SettingTurns | SettingLeft | SettingRight, Adjust(_)) => Some(self),
            (Init, Jog(_)) => Some(Init),

            _ => None,
        }
    }

    /// State entered when the active operation of this state finishes
    pub fn on_completion(self) -> Option<Self> {
        match self {
            ProcessState::Calibrating => Some(ProcessState::Ready),
            ProcessState::MovingHome => Some(ProcessState::Home),
            ProcessState::Wrapping => Some(ProcessState::Ready),
            _ => None,
        }
    }
}
