//! # Stop mode

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use util::maths::clamp;

use super::{DecisionParams, Mode, NavSummary, MAX_STEER_DEG};
use crate::rover_state::RoverState;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Speed at or below which the rover is considered stopped.
///
/// Units: meters/second
pub const STOPPED_SPEED_MS: f64 = 0.2;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Brake to a halt, then turn right on the spot until enough terrain is in view to set off.
pub(super) fn step(state: &mut RoverState, params: &DecisionParams, nav: &NavSummary) -> Mode {
    if state.telem.velocity_ms > STOPPED_SPEED_MS {
        state.throttle = 0.0;
        state.brake = params.brake_set;
        state.steer_deg = 0.0;
        return Mode::Stop;
    }

    state.brake = 0.0;

    if nav.pixel_count < params.go_forward {
        state.throttle = 0.0;
        state.steer_deg = -MAX_STEER_DEG;
        Mode::Stop
    } else {
        state.throttle = 3.0 * params.throttle_set;
        state.steer_deg = clamp(nav.left_biased_steer_deg, -MAX_STEER_DEG, MAX_STEER_DEG);
        Mode::forward()
    }
}
