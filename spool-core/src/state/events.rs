//! Operations that drive transitions and notices that report them

use super::machine::ProcessState;

/// Operator operations, after contextual interpretation of the keys
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// Advance the process: calibrate, move home, or wind
    Start,
    /// Stop both axes and return to `Init`
    Abort,
    /// Begin the settings sequence
    EnterSettings,
    /// Accept the value being edited and move to the next field
    Confirm,
    /// Change the value being edited by a signed amount
    Adjust(f32),
    /// Move the traverse by a signed distance in millimetres
    Jog(f32),
}

/// Field edited by a settings state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingField {
    /// Required spindle turns
    Turns,
    /// Start margin
    Left,
    /// End margin
    Right,
}

impl SettingField {
    /// Label shown next to the value
    pub fn label(self) -> &'static str {
        match self {
            SettingField::Turns => "TURNS",
            SettingField::Left => "LEFT",
            SettingField::Right => "RIGHT",
        }
    }
}

/// Faults reported to the operator
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProcessError {
    /// Operation not permitted in the current state; nothing changed
    IllegalCommand {
        state: ProcessState,
        operation: Operation,
    },
    /// Winding requested without a valid calibration
    NotCalibrated,
    /// Limit switch hit outside calibration; axes disabled
    EmergencyStop,
}

/// Notifications for the display and the diagnostic log
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notice {
    /// The process entered a new state
    StateChanged(ProcessState),
    /// A move started that is expected to take this long
    Processing { estimated_ms: u32 },
    /// A settings value changed or a new field is being edited
    ShowValue { field: SettingField, value: f32 },
    /// Calibration started seeking the first limit
    CalibrationStarted,
    /// First limit found; seeking the second
    FirstLimitFound,
    /// Second limit found; travel length in steps
    TravelMeasured { steps: i32 },
    /// Calibration finished and the traverse is parked
    CalibrationComplete { travel_steps: i32 },
    /// Traverse moving to the winding origin
    HomingStarted,
    /// Wrap cycle started
    WrapStarted,
    /// Wrap cycle finished
    WrapComplete,
    /// Operator abort executed
    Aborted,
    /// Settings sequence finished
    SettingsSaved { changed: bool },
    /// Something went wrong
    Error(ProcessError),
}

impl Notice {
    /// Check if this notice reports an error
    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}
