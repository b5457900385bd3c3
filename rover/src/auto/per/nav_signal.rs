//! # Navigation signal
//!
//! Chooses which classified pixel set drives navigation on this tick and converts it into
//! rover-centric distances and angles.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

use super::{
    classify::TerrainMasks,
    transform::{to_polar, to_rover_centric},
};
use crate::auto::decision::Mode;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Polar representation of the pixels the rover should navigate by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavSignal {
    /// Which mask the signal was built from.
    pub source: NavSource,

    /// Distance of each pixel from the rover, in warped pixels.
    pub dists: Vec<f64>,

    /// Angle of each pixel from the rover's forward axis, positive left.
    ///
    /// Units: radians
    pub angles: Vec<f64>,

    /// Mode change requested by perception. Only the decision engine acts on this.
    pub mode_hint: Option<ModeHint>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavSource {
    /// Navigable terrain
    Terrain,

    /// A sample (target) marker
    Target,
}

/// Mode changes perception may ask the decision engine for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModeHint {
    /// A target is in view, approach it.
    AcquireTarget,

    /// The target which was being approached is no longer in view.
    TargetLost,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavSignal {
    /// Build the signal for this tick.
    ///
    /// `target_pixels` is the number of active pixels in the target mask. The target mask takes
    /// precedence when this is more than `target_min_pixels`. Otherwise navigable terrain is
    /// used, and if the rover was approaching a target a `TargetLost` hint is raised.
    pub fn extract(
        masks: &TerrainMasks,
        target_pixels: usize,
        mode: &Mode,
        target_min_pixels: usize
    ) -> Self {
        let (source, mask, mode_hint) = if target_pixels > target_min_pixels {
            (NavSource::Target, &masks.target, Some(ModeHint::AcquireTarget))
        } else if mode.is_rock() {
            (NavSource::Terrain, &masks.navigable, Some(ModeHint::TargetLost))
        } else {
            (NavSource::Terrain, &masks.navigable, None)
        };

        let (x, y) = to_rover_centric(mask);
        let (dists, angles) = to_polar(&x, &y);

        Self {
            source,
            dists,
            angles,
            mode_hint,
        }
    }

    /// Number of pixels in the signal.
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{s, Array2};

    fn masks(nav_pixels: usize, target_pixels: usize) -> TerrainMasks {
        let mut masks = TerrainMasks {
            navigable: Array2::from_elem((20, 20), false),
            target: Array2::from_elem((20, 20), false),
            obstacle: Array2::from_elem((20, 20), false),
        };

        masks.navigable.iter_mut().take(nav_pixels).for_each(|v| *v = true);
        masks
            .target
            .slice_mut(s![10.., ..])
            .iter_mut()
            .take(target_pixels)
            .for_each(|v| *v = true);

        masks
    }

    #[test]
    fn test_terrain_signal() {
        let signal = NavSignal::extract(&masks(30, 10), 10, &Mode::forward(), 10);

        assert_eq!(signal.source, NavSource::Terrain);
        assert_eq!(signal.len(), 30);
        assert_eq!(signal.dists.len(), 30);
        assert_eq!(signal.mode_hint, None);
    }

    #[test]
    fn test_target_preempts_terrain() {
        let signal = NavSignal::extract(&masks(30, 11), 11, &Mode::Stop, 10);

        assert_eq!(signal.source, NavSource::Target);
        assert_eq!(signal.len(), 11);
        assert_eq!(signal.mode_hint, Some(ModeHint::AcquireTarget));
    }

    #[test]
    fn test_target_lost() {
        let signal = NavSignal::extract(&masks(30, 3), 3, &Mode::Rock, 10);

        assert_eq!(signal.source, NavSource::Terrain);
        assert_eq!(signal.len(), 30);
        assert_eq!(signal.mode_hint, Some(ModeHint::TargetLost));

        // Target still in view while approaching
        let signal = NavSignal::extract(&masks(30, 20), 20, &Mode::Rock, 10);
        assert_eq!(signal.mode_hint, Some(ModeHint::AcquireTarget));
    }

    #[test]
    fn test_empty_signal() {
        let signal = NavSignal::extract(&masks(0, 0), 0, &Mode::forward(), 10);

        assert!(signal.is_empty());
        assert_eq!(signal.len(), 0);
    }
}
