//! # Reverse mode
//!
//! The escape manoeuvre runs in three phases, each a fixed number of ticks:
//!
//! 1. Back up steering left.
//! 2. Drive forward steering right.
//! 3. Turn right on the spot with no throttle.
//!
//! The manoeuvre is abandoned as soon as the rover is moving freely.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{DecisionParams, Mode, MAX_STEER_DEG};
use crate::rover_state::RoverState;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// End of the backing up phase
pub const BACK_UP_END: u32 = 50;

/// End of the forward phase
pub const FORWARD_END: u32 = 100;

/// End of the turn on the spot phase
pub const TURN_END: u32 = 120;

/// Speed above which the rover is considered free.
///
/// Units: meters/second
pub const FREE_SPEED_MS: f64 = 0.5;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

pub(super) fn step(state: &mut RoverState, params: &DecisionParams, phase_count: u32) -> Mode {
    if state.telem.velocity_ms.abs() > FREE_SPEED_MS {
        state.throttle = 0.0;
        state.brake = params.brake_set;
        return Mode::Stop;
    }

    let (throttle, steer_deg) = if phase_count < BACK_UP_END {
        (-2.0 * params.throttle_set, MAX_STEER_DEG)
    } else if phase_count < FORWARD_END {
        (2.0 * params.throttle_set, -MAX_STEER_DEG)
    } else if phase_count < TURN_END {
        (0.0, -MAX_STEER_DEG)
    } else {
        return Mode::Stop;
    };

    state.throttle = throttle;
    state.brake = 0.0;
    state.steer_deg = steer_deg;

    Mode::Reverse {
        phase_count: phase_count + 1,
    }
}
