//! # Decision
//!
//! A finite state controller which turns the navigation signal and telemetry into throttle, steer,
//! brake and pickup demands. The modes are:
//!
//! - `Forward` - Follow the left edge of the navigable terrain, the initial mode.
//! - `Stop` - Brake, then search for terrain by turning on the spot.
//! - `Reverse` - Escape manoeuvre after becoming stuck or driving in circles.
//! - `Rock` - Approach a sighted target and pick it up.
//!
//! Only [`decision_step`] changes the mode. Perception may request a change through the
//! [`ModeHint`] of the navigation signal.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod forward;
mod mode;
mod reverse;
mod rock;
mod stop;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use util::maths::{clamp, mean};

use crate::{
    auto::per::{ModeHint, NavSignal},
    rover_state::RoverState,
};

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use forward::STUCK_LIMIT;
pub use mode::Mode;
pub use reverse::{BACK_UP_END, FORWARD_END, TURN_END};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Steer limit of the rover.
///
/// Units: degrees
pub const MAX_STEER_DEG: f64 = 15.0;

/// Steer demand above which a tick counts towards a donut.
///
/// Units: degrees
pub const DONUT_STEER_DEG: f64 = 10.0;

/// Speed at or above which a tick counts towards a donut.
///
/// Units: meters/second
pub const DONUT_SPEED_MS: f64 = 1.0;

/// Once the donut count exceeds this the escape manoeuvre starts.
pub const DONUT_LIMIT: u32 = 36;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Decision parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionParams {
    /// Nominal throttle demand
    pub throttle_set: f64,

    /// Brake demand when braking
    pub brake_set: f64,

    /// Below this many navigation pixels the rover stops.
    pub stop_forward: usize,

    /// At or above this many navigation pixels a stopped rover sets off.
    pub go_forward: usize,

    /// Maximum speed, above which the rover coasts.
    ///
    /// Units: meters/second
    pub max_vel: f64,
}

/// Values derived from the navigation signal once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NavSummary {
    pub pixel_count: usize,

    /// Mean of the leftmost quarter of the angles, unclamped.
    ///
    /// Units: degrees
    pub left_biased_steer_deg: f64,

    /// Mean of all the angles, clamped to the steer limit.
    ///
    /// Units: degrees
    pub approach_angle_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for DecisionParams {
    fn default() -> Self {
        Self {
            throttle_set: 0.2,
            brake_set: 10.0,
            stop_forward: 50,
            go_forward: 500,
            max_vel: 2.0,
        }
    }
}

impl NavSummary {
    pub fn from_signal(signal: &NavSignal) -> Self {
        Self {
            pixel_count: signal.len(),
            left_biased_steer_deg: left_biased_steer_deg(&signal.angles),
            approach_angle_deg: approach_angle_deg(&signal.angles),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Run the decision engine for one tick.
///
/// Does nothing until perception has produced a navigation signal.
pub fn decision_step(state: &mut RoverState, params: &DecisionParams) {
    let (hint, nav) = match state.nav {
        Some(ref signal) => (signal.mode_hint, NavSummary::from_signal(signal)),
        None => return,
    };

    match hint {
        Some(ModeHint::AcquireTarget) => set_mode(state, Mode::Rock),
        Some(ModeHint::TargetLost) => set_mode(state, Mode::forward()),
        None => (),
    }

    donut_guard(state);

    debug!(
        "Decision in {}: {} px, left-biased {:.2} deg, approach {:.2} deg",
        state.mode, nav.pixel_count, nav.left_biased_steer_deg, nav.approach_angle_deg
    );

    let mode = state.mode;
    let next = match mode {
        Mode::Forward { stuck_count } => forward::step(state, params, &nav, stuck_count),
        Mode::Stop => stop::step(state, params, &nav),
        Mode::Reverse { phase_count } => reverse::step(state, params, phase_count),
        Mode::Rock => rock::step(state, params, &nav),
    };

    set_mode(state, next);
}

/// Mean of the top quartile of the sorted angles, in degrees.
///
/// Following the left edge of the terrain keeps the rover tracking along one wall. Returns 0 for
/// an empty signal.
pub fn left_biased_steer_deg(angles: &[f64]) -> f64 {
    let mut sorted: Vec<OrderedFloat<f64>> = angles.iter().copied().map(OrderedFloat).collect();
    sorted.sort_unstable();

    let start = (0.75 * sorted.len() as f64) as usize;
    let top: Vec<f64> = sorted[start..].iter().map(|a| a.into_inner()).collect();

    mean(&top).map(f64::to_degrees).unwrap_or(0.0)
}

/// Mean of all angles in degrees, clamped to the steer limit. Returns 0 for an empty signal.
pub fn approach_angle_deg(angles: &[f64]) -> f64 {
    mean(angles)
        .map(|a| clamp(a.to_degrees(), -MAX_STEER_DEG, MAX_STEER_DEG))
        .unwrap_or(0.0)
}

/// Count consecutive ticks spent steering hard left at speed, and break out of the circle once
/// there have been too many.
fn donut_guard(state: &mut RoverState) {
    if state.steer_deg > DONUT_STEER_DEG && state.telem.velocity_ms >= DONUT_SPEED_MS {
        state.donut_count += 1;
    } else {
        state.donut_count = 0;
    }

    if state.donut_count > DONUT_LIMIT {
        info!("Donut detected after {} ticks", state.donut_count);
        state.donut_count = 0;
        set_mode(state, Mode::reverse());
    }
}

/// Set the mode, logging changes of mode (but not of counters).
fn set_mode(state: &mut RoverState, mode: Mode) {
    if state.mode.drive_mode() != mode.drive_mode() {
        info!("Mode change: {} -> {}", state.mode, mode);
    }

    state.mode = mode;
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_left_biased_steer() {
        assert_eq!(left_biased_steer_deg(&[]), 0.0);

        // 8 angles, top quartile is the largest 2
        let angles = [0.1, -0.3, 0.5, 0.0, 0.3, -0.1, 0.2, -0.2];
        let expected = (0.4f64).to_degrees();
        assert!((left_biased_steer_deg(&angles) - expected).abs() < 1e-9);

        // A single angle is its own top quartile
        assert!((left_biased_steer_deg(&[-0.2]) - (-0.2f64).to_degrees()).abs() < 1e-9);

        // 3 angles, starts from index 2
        assert!((left_biased_steer_deg(&[0.0, 0.1, 0.2]) - (0.2f64).to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn test_approach_angle() {
        assert_eq!(approach_angle_deg(&[]), 0.0);
        let expected = (0.05f64 / 3.0).to_degrees();
        assert!((approach_angle_deg(&[0.1, 0.0, -0.05]) - expected).abs() < 1e-9);
        assert_eq!(approach_angle_deg(&[1.0, 1.2]), 15.0);
        assert_eq!(approach_angle_deg(&[-1.0]), -15.0);
    }
}
