//! Process collaborators for the firmware
//!
//! There is no display yet: every notice goes to the defmt log. Parameter
//! saves are handed to the persistence task so the control loop never
//! waits on flash.

use defmt::*;

use spool_core::config::WindingParameters;
use spool_core::state::{Notice, ProcessError};
use spool_core::traits::{ParameterStore, ProcessObserver};

use crate::channels::PARAMETERS_SAVE;

/// Observer that logs every notice
#[derive(Debug, Default)]
pub struct LogObserver;

impl ProcessObserver for LogObserver {
    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::StateChanged(state) => info!("State: {:?}", state),
            Notice::Processing { estimated_ms } => {
                info!("Processing, about {} ms", estimated_ms)
            }
            Notice::ShowValue { field, value } => info!("{}: {}", field.label(), value),
            Notice::CalibrationStarted => info!("Calibration: seeking first limit"),
            Notice::FirstLimitFound => info!("Calibration: first limit found"),
            Notice::TravelMeasured { steps } => info!("Calibration: travel {} steps", steps),
            Notice::CalibrationComplete { travel_steps } => {
                info!("Calibration complete, travel {} steps", travel_steps)
            }
            Notice::HomingStarted => info!("Moving to winding origin"),
            Notice::WrapStarted => info!("Wrap started"),
            Notice::WrapComplete => info!("Wrap complete"),
            Notice::Aborted => warn!("Aborted by operator"),
            Notice::SettingsSaved { changed } => info!("Settings done (changed: {})", changed),
            Notice::Error(ProcessError::EmergencyStop) => {
                error!("EMERGENCY STOP: limit switch hit, axes disabled")
            }
            Notice::Error(ProcessError::NotCalibrated) => warn!("Not calibrated"),
            Notice::Error(ProcessError::IllegalCommand { state, operation }) => {
                warn!("Illegal command {:?} in {:?}", operation, state)
            }
        }
    }
}

/// Store that forwards saves to the persistence task
#[derive(Debug, Default)]
pub struct DeferredStore;

impl ParameterStore for DeferredStore {
    fn persist(&mut self, params: WindingParameters) {
        PARAMETERS_SAVE.signal(params);
    }
}
