//! # Forward mode

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use util::maths::clamp;

use super::{DecisionParams, Mode, NavSummary, MAX_STEER_DEG};
use crate::rover_state::RoverState;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of stationary ticks counted before the escape manoeuvre starts on the next one.
pub const STUCK_LIMIT: u32 = 5;

/// Steer limit while coasting at maximum velocity.
///
/// Units: degrees
pub const COAST_STEER_DEG: f64 = 10.0;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Follow the left-biased edge of the navigable terrain, stopping when it runs out.
pub(super) fn step(
    state: &mut RoverState,
    params: &DecisionParams,
    nav: &NavSummary,
    stuck_count: u32,
) -> Mode {
    if nav.pixel_count < params.stop_forward {
        state.throttle = 0.0;
        state.brake = params.brake_set;
        state.steer_deg = 0.0;
        return Mode::Stop;
    }

    state.brake = 0.0;
    let velocity = state.telem.velocity_ms;

    if velocity == 0.0 {
        if stuck_count < STUCK_LIMIT {
            return Mode::Forward {
                stuck_count: stuck_count + 1,
            };
        }

        state.throttle = -2.0 * params.throttle_set;
        return Mode::reverse();
    }

    if velocity < params.max_vel {
        state.throttle = params.throttle_set;
        state.steer_deg = clamp(nav.left_biased_steer_deg, -MAX_STEER_DEG, MAX_STEER_DEG);
    } else {
        state.throttle = 0.0;
        state.steer_deg = clamp(nav.left_biased_steer_deg, -COAST_STEER_DEG, COAST_STEER_DEG);
    }

    Mode::forward()
}
