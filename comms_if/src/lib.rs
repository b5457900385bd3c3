//! # Communications interface crate.
//!
//! Provides the interfaces exchanged between the autonomy core and the driver which owns the
//! simulator link: camera frames in, telemetry in, demands out.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data definitions for equipment (camera, rover telemetry and demands)
pub mod eqpt;
