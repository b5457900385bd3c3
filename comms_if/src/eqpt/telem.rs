//! # Rover Telemetry
//!
//! Per-tick telemetry provided by the driver. The autonomy core only reads these values.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry sampled from the simulated rover at the start of a tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoverTelem {
    /// Position of the rover in the world frame.
    ///
    /// Units: world map cells (meters in the simulator)
    pub position_m: [f64; 2],

    /// Heading of the rover, anticlockwise from the world X axis.
    ///
    /// Units: degrees
    pub yaw_deg: f64,

    /// Units: degrees, in the range [0, 360)
    pub pitch_deg: f64,

    /// Units: degrees, in the range [0, 360)
    pub roll_deg: f64,

    /// Signed forward velocity, forward positive.
    ///
    /// Units: meters/second
    pub velocity_ms: f64,

    /// True when the proximity sensor reports a sample within pickup range.
    pub near_sample: bool,

    /// True while a pickup action is in flight.
    pub picking_up: bool,
}
