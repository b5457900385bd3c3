//! # Rover library.
//!
//! The autonomy core of the simulated sample-return rover. Each tick a driver hands over a camera
//! frame and telemetry; the perception pipeline turns the frame into classified terrain, a
//! persistent world map and a navigation signal, and the decision engine turns that signal into
//! throttle, steer, brake and pickup demands.
//!
//! The core is synchronous and does no I/O during a tick. All state which survives between ticks
//! lives in [`rover_state::RoverState`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomy module - perception, mapping and decision making
pub mod auto;

/// Rover state - the context shared by all autonomy steps
pub mod rover_state;

/// Replay module - loads simulator recordings to drive the core offline
pub mod replay;
