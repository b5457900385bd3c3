//! # Map
//!
//! This module implements the [`WorldMap`], the rover's lifetime record of where it has seen
//! navigable terrain, obstacles and targets.

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

/// Implements the [`WorldMap`] type
mod world_map;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use world_map::{WorldMap, WorldMapLayer, WorldMapParams, WorldMapStats};
