//! # Rock mode
//!
//! Approach a sighted target and request a pickup once alongside it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;

use super::{DecisionParams, Mode, NavSummary};
use crate::rover_state::RoverState;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Speed below which a pickup may be requested.
///
/// Units: meters/second
pub const PICKUP_SPEED_MS: f64 = 0.2;

/// Above this speed the approach decelerates.
///
/// Units: meters/second
pub const APPROACH_SPEED_MS: f64 = 1.0;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

pub(super) fn step(state: &mut RoverState, params: &DecisionParams, nav: &NavSummary) -> Mode {
    let velocity = state.telem.velocity_ms;

    if state.telem.near_sample {
        if state.telem.picking_up {
            return Mode::forward();
        }

        if velocity < PICKUP_SPEED_MS {
            info!("Alongside target, requesting pickup");
            state.send_pickup = true;
            return Mode::forward();
        }

        state.throttle = 0.0;
        state.brake = params.brake_set;
        state.steer_deg = nav.approach_angle_deg;
        return Mode::Rock;
    }

    // Held up short of the target
    if velocity <= 0.0 {
        return Mode::Stop;
    }

    state.throttle = if velocity > APPROACH_SPEED_MS {
        -params.throttle_set / 2.0
    } else {
        params.throttle_set
    };
    state.steer_deg = nav.approach_angle_deg;
    state.brake = 0.0;

    Mode::Rock
}
