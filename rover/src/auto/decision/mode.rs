//! # Drive modes

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use comms_if::eqpt::dems::DriveMode;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Mode of the decision engine.
///
/// Counters which only have meaning inside one mode are carried by that mode, so leaving the mode
/// discards them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Following navigable terrain.
    Forward {
        /// Consecutive ticks spent stationary while demanding forward motion.
        stuck_count: u32,
    },

    /// Braking to a halt, then turning on the spot until enough terrain is in view.
    Stop,

    /// Fixed escape manoeuvre after becoming stuck.
    Reverse {
        /// Ticks spent in the manoeuvre so far.
        phase_count: u32,
    },

    /// Approaching a sighted target.
    Rock,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Mode {
    /// Forward mode with a cleared stuck counter.
    pub fn forward() -> Self {
        Mode::Forward { stuck_count: 0 }
    }

    /// Reverse mode at the start of the escape manoeuvre.
    pub fn reverse() -> Self {
        Mode::Reverse { phase_count: 0 }
    }

    pub fn is_rock(&self) -> bool {
        matches!(self, Mode::Rock)
    }

    /// The mode as reported in the demands.
    pub fn drive_mode(&self) -> DriveMode {
        match self {
            Mode::Forward { .. } => DriveMode::Forward,
            Mode::Stop => DriveMode::Stop,
            Mode::Reverse { .. } => DriveMode::Reverse,
            Mode::Rock => DriveMode::Rock,
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::forward()
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.drive_mode())
    }
}
