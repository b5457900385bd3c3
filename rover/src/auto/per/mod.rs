//! # Perception
//!
//! Turns a raw camera frame into classified terrain. Each step:
//!
//! 1. Warps the frame into a top-down view using the calibration homography.
//! 2. Classifies the warped frame into navigable, target and obstacle masks.
//! 3. Renders the classification into the vision overlay.
//! 4. Accumulates the masks into the world map, when the rover is level.
//! 5. Extracts the navigation signal for the decision engine.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod classify;
mod nav_signal;
pub mod transform;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::RgbImage;
use log::trace;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::rover_state::RoverState;
use transform::{warp_to_top_down, Homography};

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use classify::{ClassifierParams, TerrainClass, TerrainMasks};
pub use nav_signal::{ModeHint, NavSignal, NavSource};
pub use transform::HomographyError;

/// Boolean image mask indexed by (row, column).
pub type Mask = Array2<bool>;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Perception parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerParams {
    /// Size of the camera frames as (width, height).
    pub frame_size_px: [u32; 2],

    /// Corners of the calibration grid square as seen by the camera, as `[x, y]` pixels.
    ///
    /// Ordered bottom-left, bottom-right, top-right, top-left.
    pub calib_src_px: [[f64; 2]; 4],

    /// Half the side length of the calibration square in the warped image.
    ///
    /// The square occupies `2 * dst_half_size_px` warped pixels, so one world map cell (one
    /// metre) spans that many pixels.
    pub dst_half_size_px: f64,

    /// Distance from the bottom of the warped image to the near edge of the calibration square.
    pub bottom_offset_px: f64,

    /// Colour classification thresholds.
    pub classifier: ClassifierParams,

    /// The target mask must have more than this many active pixels to be navigated by.
    pub target_min_pixels: usize,
}

/// Perception manager, holds the calibration computed at initialisation.
#[derive(Debug, Clone)]
pub struct PerMgr {
    params: PerParams,
    homography: Homography,
}

/// Summary of a perception step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerReport {
    /// True if the world map was updated.
    pub map_updated: bool,

    /// Number of pixels classified as navigable.
    pub nav_pixels: usize,

    /// Number of pixels classified as target.
    pub target_pixels: usize,

    /// Number of pixels classified as obstacle.
    pub obstacle_pixels: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PerError {
    #[error("Could not compute the camera calibration: {0}")]
    Homography(HomographyError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for PerParams {
    fn default() -> Self {
        Self {
            frame_size_px: [320, 160],
            calib_src_px: [[14.0, 140.0], [301.0, 140.0], [200.0, 96.0], [118.0, 96.0]],
            dst_half_size_px: 5.0,
            bottom_offset_px: 6.0,
            classifier: ClassifierParams::default(),
            target_min_pixels: 10,
        }
    }
}

impl PerParams {
    /// Corners of the calibration square in the warped image, in the same order as
    /// `calib_src_px`.
    ///
    /// The square is centred horizontally and sits `bottom_offset_px` above the bottom edge.
    pub fn calib_dst_px(&self) -> [[f64; 2]; 4] {
        let w = self.frame_size_px[0] as f64;
        let h = self.frame_size_px[1] as f64;
        let half = self.dst_half_size_px;
        let bottom = h - self.bottom_offset_px;
        let top = bottom - 2.0 * half;

        [
            [w / 2.0 - half, bottom],
            [w / 2.0 + half, bottom],
            [w / 2.0 + half, top],
            [w / 2.0 - half, top],
        ]
    }
}

impl PerMgr {
    /// Create the manager, computing the calibration homography.
    pub fn new(params: PerParams) -> Result<Self, PerError> {
        let homography = Homography::from_quads(&params.calib_src_px, &params.calib_dst_px())
            .map_err(PerError::Homography)?;

        Ok(Self { params, homography })
    }

    pub fn params(&self) -> &PerParams {
        &self.params
    }

    /// Run the perception pipeline on a single frame.
    ///
    /// Writes the vision overlay, world map and navigation signal into `state`. The frame must be
    /// of the size given in the parameters.
    pub fn step(&self, frame: &RgbImage, state: &mut RoverState) -> PerReport {
        let warped = warp_to_top_down(frame, &self.homography);
        let masks = self.params.classifier.classify(&warped);
        let (nav_pixels, target_pixels, obstacle_pixels) = masks.counts();

        trace!(
            "Classified {} navigable, {} target, {} obstacle pixels",
            nav_pixels,
            target_pixels,
            obstacle_pixels
        );

        state.vision_image = masks.to_overlay();

        let map_updated = state.world_map.update(&masks, &state.telem);

        state.nav = Some(NavSignal::extract(
            &masks,
            target_pixels,
            &state.mode,
            self.params.target_min_pixels,
        ));

        PerReport {
            map_updated,
            nav_pixels,
            target_pixels,
            obstacle_pixels,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
