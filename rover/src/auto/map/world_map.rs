//! # World Map

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::telem::RoverTelem;
use image::{Rgb, RgbImage};
use log::debug;
use ndarray::{Array3, Axis};
use serde::{Deserialize, Serialize};
use util::maths::rem_euclid;

use crate::auto::per::{transform, Mask, TerrainMasks};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the [`WorldMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldMapParams {
    /// Number of cells along each side of the (square) map.
    pub world_size: usize,

    /// Number of warped image pixels per map cell.
    pub scale: f64,

    /// The map is only updated while `pitch mod 360` is below this value.
    ///
    /// Units: degrees
    pub max_level_pitch_deg: f64,

    /// The map is only updated while `roll mod 360` is below this value.
    ///
    /// Units: degrees
    pub max_level_roll_deg: f64,

    /// Amount added to a navigable cell each time it is observed.
    pub navigable_increment: u8,

    /// Amount added to a target cell each time it is observed.
    pub target_increment: u8,

    /// Amount added to an obstacle cell each time it is observed.
    pub obstacle_increment: u8,
}

/// World Map
///
/// A square grid of confidence counters, one layer per [`WorldMapLayer`]. Counters only ever
/// increase, saturating at 255.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldMap {
    params: WorldMapParams,

    /// Indexed by (layer, x, y)
    data: Array3<u8>,
}

/// Number of cells with any evidence in each layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorldMapStats {
    pub obstacle_cells: usize,
    pub target_cells: usize,
    pub navigable_cells: usize,

    /// Number of cells which have reached 255 in any layer.
    pub saturated_cells: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible layers in a [`WorldMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldMapLayer {
    Obstacle,
    Target,
    Navigable,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for WorldMapParams {
    fn default() -> Self {
        Self {
            world_size: 200,
            scale: 10.0,
            max_level_pitch_deg: 1.0,
            max_level_roll_deg: 1.5,
            navigable_increment: 1,
            target_increment: 5,
            obstacle_increment: 1,
        }
    }
}

impl WorldMapLayer {
    pub const ALL: [WorldMapLayer; 3] = [
        WorldMapLayer::Obstacle,
        WorldMapLayer::Target,
        WorldMapLayer::Navigable,
    ];

    fn index(self) -> usize {
        match self {
            WorldMapLayer::Obstacle => 0,
            WorldMapLayer::Target => 1,
            WorldMapLayer::Navigable => 2,
        }
    }
}

impl WorldMap {
    /// Create a new empty map.
    pub fn new(params: WorldMapParams) -> Self {
        let size = params.world_size;

        Self {
            params,
            data: Array3::zeros((WorldMapLayer::ALL.len(), size, size)),
        }
    }

    /// Number of cells along each side of the map.
    pub fn size(&self) -> usize {
        self.params.world_size
    }

    pub fn params(&self) -> &WorldMapParams {
        &self.params
    }

    /// Get the value of a cell, or `None` if the cell is outside the map.
    pub fn get(&self, layer: WorldMapLayer, x: usize, y: usize) -> Option<u8> {
        self.data.get([layer.index(), x, y]).copied()
    }

    /// True if the rover's attitude is close enough to level for its camera projection to be
    /// trusted.
    pub fn is_level(&self, telem: &RoverTelem) -> bool {
        rem_euclid(telem.pitch_deg, 360.0) < self.params.max_level_pitch_deg
            && rem_euclid(telem.roll_deg, 360.0) < self.params.max_level_roll_deg
    }

    /// Accumulate a set of classified masks into the map.
    ///
    /// Every cell hit by at least one pixel of a mask is incremented once in that mask's layer,
    /// however many pixels land on it. Nothing is changed if the rover is not level.
    ///
    /// Returns true if the map was updated.
    pub fn update(&mut self, masks: &TerrainMasks, telem: &RoverTelem) -> bool {
        if !self.is_level(telem) {
            debug!(
                "Map update skipped, rover not level (pitch {:.2} deg, roll {:.2} deg)",
                telem.pitch_deg, telem.roll_deg
            );
            return false;
        }

        let layers = [
            (WorldMapLayer::Obstacle, &masks.obstacle, self.params.obstacle_increment),
            (WorldMapLayer::Target, &masks.target, self.params.target_increment),
            (WorldMapLayer::Navigable, &masks.navigable, self.params.navigable_increment),
        ];

        for (layer, mask, increment) in layers.iter() {
            for (x, y) in self.cells_hit(mask, telem) {
                let cell = &mut self.data[[layer.index(), x, y]];
                *cell = cell.saturating_add(*increment);
            }
        }

        true
    }

    /// Unique world cells covered by the active pixels of a mask.
    fn cells_hit(&self, mask: &Mask, telem: &RoverTelem) -> Vec<(usize, usize)> {
        let (x, y) = transform::to_rover_centric(mask);

        let mut cells = transform::to_world_frame(
            &x,
            &y,
            telem.position_m,
            telem.yaw_deg,
            self.params.world_size,
            self.params.scale,
        );

        cells.sort_unstable();
        cells.dedup();
        cells
    }

    /// Render the map as an RGB image with north (increasing y) at the top.
    ///
    /// Red is obstacle, green is target and blue is navigable evidence.
    pub fn to_image(&self) -> RgbImage {
        let size = self.size();

        RgbImage::from_fn(size as u32, size as u32, |px, py| {
            let x = px as usize;
            let y = size - 1 - py as usize;

            Rgb([
                self.data[[WorldMapLayer::Obstacle.index(), x, y]],
                self.data[[WorldMapLayer::Target.index(), x, y]],
                self.data[[WorldMapLayer::Navigable.index(), x, y]],
            ])
        })
    }

    /// Count the cells with evidence in each layer.
    pub fn stats(&self) -> WorldMapStats {
        let count = |layer: WorldMapLayer| {
            self.data
                .index_axis(Axis(0), layer.index())
                .iter()
                .filter(|&&v| v > 0)
                .count()
        };

        let saturated_cells = self
            .data
            .lanes(Axis(0))
            .into_iter()
            .filter(|lane| lane.iter().any(|&v| v == u8::MAX))
            .count();

        WorldMapStats {
            obstacle_cells: count(WorldMapLayer::Obstacle),
            target_cells: count(WorldMapLayer::Target),
            navigable_cells: count(WorldMapLayer::Navigable),
            saturated_cells,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
