//! # Rover State
//!
//! [`RoverState`] is created once by the driver at mission start and lives for the whole run. The
//! autonomy steps are stateless functions which mutate it in place.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{dems::RoverDems, telem::RoverTelem};
use image::RgbImage;

use crate::auto::{
    decision::Mode,
    map::{WorldMap, WorldMapParams},
    per::NavSignal,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// State of the rover as seen by the autonomy core.
#[derive(Debug, Clone)]
pub struct RoverState {
    // ---- TELEMETRY ----

    /// Latest telemetry from the driver. The core never writes to this.
    pub telem: RoverTelem,

    // ---- DEMANDS ----

    /// Throttle demand
    pub throttle: f64,

    /// Steer demand, positive left.
    ///
    /// Units: degrees
    pub steer_deg: f64,

    /// Brake demand
    pub brake: f64,

    /// Set by the core to request a pickup, cleared by the driver once dispatched.
    pub send_pickup: bool,

    // ---- DECISION ----

    /// Current drive mode, including the counters which belong to that mode.
    pub mode: Mode,

    /// Number of consecutive ticks spent steering hard left at speed.
    pub donut_count: u32,

    // ---- PERCEPTION ----

    /// Navigation signal from the latest perception pass, `None` until the first pass.
    pub nav: Option<NavSignal>,

    /// Lifetime-accumulated map of terrain evidence.
    pub world_map: WorldMap,

    /// Classification overlay of the latest warped frame, for display only.
    pub vision_image: RgbImage,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RoverState {
    /// Create the state at mission start.
    ///
    /// `frame_size_px` is the (width, height) of the camera frames which will be processed.
    pub fn new(map_params: &WorldMapParams, frame_size_px: (u32, u32)) -> Self {
        Self {
            telem: RoverTelem::default(),
            throttle: 0.0,
            steer_deg: 0.0,
            brake: 0.0,
            send_pickup: false,
            mode: Mode::default(),
            donut_count: 0,
            nav: None,
            world_map: WorldMap::new(map_params.clone()),
            vision_image: RgbImage::new(frame_size_px.0, frame_size_px.1),
        }
    }

    /// The demands currently held in the state.
    pub fn dems(&self) -> RoverDems {
        RoverDems {
            throttle: self.throttle,
            steer_deg: self.steer_deg,
            brake: self.brake,
            mode: self.mode.drive_mode(),
            send_pickup: self.send_pickup,
        }
    }

    /// Number of pixels in the current navigation signal, 0 before the first perception pass.
    pub fn nav_pixel_count(&self) -> usize {
        self.nav.as_ref().map(NavSignal::len).unwrap_or(0)
    }
}
