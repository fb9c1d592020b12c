//! Calibrated traverse geometry

/// Result of a successful calibration
///
/// Positions are in traverse steps relative to the winding origin, which
/// lies one limit margin inside the first limit switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibratedGeometry {
    /// Usable travel between the two logical ends
    pub travel_steps: i32,
}

impl CalibratedGeometry {
    /// Create geometry from a measured travel
    pub const fn new(travel_steps: i32) -> Self {
        Self { travel_steps }
    }

    /// Midpoint of the travel, where calibration parks the traverse
    pub const fn home_position(&self) -> i32 {
        self.travel_steps / 2
    }
}
