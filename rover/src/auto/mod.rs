//! # Autonomy Module
//!
//! This module provides the autonomy of the rover. The [`AutoMgr`] runs once per tick, taking the
//! latest camera frame and telemetry and producing the demands for that tick:
//!
//! - `per` - Warps and classifies the frame, updates the world map and extracts the navigation
//!   signal.
//! - `decision` - Runs the drive mode state machine on the navigation signal.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Perception module - converts camera frames into classified terrain
pub mod per;

/// Map module - provides the world map
pub mod map;

/// Decision module - the drive mode state machine
pub mod decision;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{
    cam::CamImage,
    dems::{DriveMode, RoverDems},
    telem::RoverTelem,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::{self, Session},
};

use crate::rover_state::RoverState;
use decision::{decision_step, DecisionParams};
use map::WorldMapParams;
use per::{PerError, PerMgr, PerParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the autonomy system, as loaded from `auto.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoMgrParams {
    pub per: PerParams,

    pub map: WorldMapParams,

    pub decision: DecisionParams,
}

/// Autonomy Manager
///
/// Owns the [`RoverState`] for the lifetime of the mission.
#[derive(Default)]
pub struct AutoMgr {
    params: AutoMgrParams,

    per_mgr: Option<PerMgr>,

    state: Option<RoverState>,

    /// Number of ticks processed so far.
    tick: u64,

    report: AutoStatusReport,
    arch_report: Archiver,
}

/// Input to a single tick.
#[derive(Debug, Clone)]
pub struct AutoInput {
    pub telem: RoverTelem,
    pub frame: CamImage,
}

/// Status report of a single tick, archived as one CSV row.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AutoStatusReport {
    pub tick: u64,

    /// Session elapsed time
    ///
    /// Units: seconds
    pub time_s: f64,

    pub mode: DriveMode,
    pub throttle: f64,
    pub steer_deg: f64,
    pub brake: f64,
    pub send_pickup: bool,

    pub velocity_ms: f64,

    /// Number of pixels in the navigation signal
    pub nav_pixels: usize,

    /// Number of pixels classified as target
    pub target_pixels: usize,

    /// Number of pixels classified as obstacle
    pub obstacle_pixels: usize,

    pub map_updated: bool,
    pub donut_count: u32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the autonomy manager.
#[derive(Debug, thiserror::Error)]
pub enum AutoMgrError {
    #[error("Failed to load AutoMgrParams: {0}")]
    ParamLoadError(params::LoadError),

    #[error("Failed to initialise perception: {0}")]
    PerError(PerError),

    #[error("Archive error: {0}")]
    ArchiveError(ArchiveError),

    #[error("The AutoMgr has not been initialised")]
    NotInit,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AutoMgr {
    /// Create a manager directly from parameters, with no archiving.
    pub fn from_params(params: AutoMgrParams) -> Result<Self, AutoMgrError> {
        let mut mgr = Self::default();
        mgr.setup(params)?;
        Ok(mgr)
    }

    fn setup(&mut self, params: AutoMgrParams) -> Result<(), AutoMgrError> {
        let per_mgr = PerMgr::new(params.per.clone()).map_err(AutoMgrError::PerError)?;
        let [width, height] = params.per.frame_size_px;

        self.state = Some(RoverState::new(&params.map, (width, height)));
        self.per_mgr = Some(per_mgr);
        self.params = params;
        self.tick = 0;

        Ok(())
    }

    pub fn params(&self) -> &AutoMgrParams {
        &self.params
    }

    /// The rover state, or `None` before initialisation.
    pub fn state(&self) -> Option<&RoverState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut RoverState> {
        self.state.as_mut()
    }

    /// Clear the pickup request once the driver has dispatched it.
    pub fn ack_pickup(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.send_pickup = false;
        }
    }
}

impl State for AutoMgr {
    type InitData = &'static str;
    type InitError = AutoMgrError;

    type InputData = AutoInput;
    type OutputData = RoverDems;
    type StatusReport = AutoStatusReport;
    type ProcError = AutoMgrError;

    /// Initialise the AutoMgr.
    ///
    /// Expected init data is the path to the parameter file, relative to the params directory.
    fn init(&mut self, init_data: Self::InitData, session: Option<&Session>)
        -> Result<(), Self::InitError>
    {
        let params: AutoMgrParams = params::load(init_data)
            .map_err(AutoMgrError::ParamLoadError)?;

        self.setup(params)?;

        if let Some(session) = session {
            self.arch_report = Archiver::from_path(session, "auto/status_report.csv")
                .map_err(AutoMgrError::ArchiveError)?;
        }

        info!("AutoMgr initialised from {}", init_data);

        Ok(())
    }

    /// Process a single tick.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let per_mgr = self.per_mgr.as_ref().ok_or(AutoMgrError::NotInit)?;
        let state = self.state.as_mut().ok_or(AutoMgrError::NotInit)?;

        state.telem = input_data.telem;

        let per_report = per_mgr.step(&input_data.frame.image, state);
        decision_step(state, &self.params.decision);

        let dems = state.dems();

        self.tick += 1;
        self.report = AutoStatusReport {
            tick: self.tick,
            time_s: session::get_elapsed_seconds(),
            mode: dems.mode,
            throttle: dems.throttle,
            steer_deg: dems.steer_deg,
            brake: dems.brake,
            send_pickup: dems.send_pickup,
            velocity_ms: state.telem.velocity_ms,
            nav_pixels: state.nav_pixel_count(),
            target_pixels: per_report.target_pixels,
            obstacle_pixels: per_report.obstacle_pixels,
            map_updated: per_report.map_updated,
            donut_count: state.donut_count,
        };

        debug!(
            "Tick {}: {} throttle {:.2} steer {:.2} brake {:.2}",
            self.tick, dems.mode, dems.throttle, dems.steer_deg, dems.brake
        );

        Ok((dems, self.report))
    }
}

impl Archived for AutoMgr {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}
