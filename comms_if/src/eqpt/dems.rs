//! # Rover Demands
//!
//! Demands produced by the autonomy core each tick, to be applied by the driver to the simulation.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Actuation demands for a single tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoverDems {
    /// Throttle demand, negative to drive backwards.
    pub throttle: f64,

    /// Steer demand, positive to the left.
    ///
    /// Units: degrees, limited to [-15, 15]
    pub steer_deg: f64,

    /// Brake demand, zero to release.
    pub brake: f64,

    /// Active drive mode once the demands were calculated.
    pub mode: DriveMode,

    /// True to request a sample pickup. The driver shall clear this once the pickup has been
    /// dispatched.
    pub send_pickup: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Drive mode reported alongside the demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriveMode {
    /// Following navigable terrain
    Forward,

    /// Braking, or searching for navigable terrain while stationary
    Stop,

    /// Executing the escape manouvre after becoming stuck
    Reverse,

    /// Approaching a sighted sample
    Rock,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for DriveMode {
    fn default() -> Self {
        DriveMode::Forward
    }
}

impl Display for DriveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriveMode::Forward => write!(f, "forward"),
            DriveMode::Stop => write!(f, "stop"),
            DriveMode::Reverse => write!(f, "reverse"),
            DriveMode::Rock => write!(f, "rock"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dems_json() {
        let dems = RoverDems {
            throttle: 0.2,
            steer_deg: -15.0,
            brake: 0.0,
            mode: DriveMode::Rock,
            send_pickup: true,
        };

        let json = serde_json::to_value(&dems).unwrap();

        assert_eq!(json["mode"], "Rock");
        assert_eq!(json["steer_deg"], -15.0);
        assert_eq!(json["send_pickup"], true);
        assert_eq!(DriveMode::Rock.to_string(), "rock");
        assert_eq!(RoverDems::default().mode, DriveMode::Forward);
    }
}
