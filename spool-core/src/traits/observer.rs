//! Display/log and persistence collaborators

use crate::config::WindingParameters;
use crate::state::Notice;

/// Receiver of everything the process wants the operator to see
///
/// Implemented by the display/menu front end and by the diagnostic log.
/// Notices are delivered synchronously from the main loop; implementations
/// must not block.
pub trait ProcessObserver {
    /// Deliver one notice
    fn notify(&mut self, notice: Notice);
}

/// Persistence of the winding parameters
///
/// Called once when the settings sequence completes with changed values.
/// Implementations may defer the actual flash write.
pub trait ParameterStore {
    /// Persist the parameters
    fn persist(&mut self, params: WindingParameters);
}
