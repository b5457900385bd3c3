//! Offline replay executable.
//!
//! Drives the autonomy core from a simulator recording, one tick per recorded frame.
//!
//! # Usage
//!
//! ```text
//! rover_replay <recording_dir>
//! ```
//!
//! # Architecture
//!
//! - Initialise the session, logger and AutoMgr
//! - For each record in the recording:
//!     - Load the frame and build the telemetry
//!     - Process the tick in the AutoMgr
//!     - Acknowledge any pickup request
//!     - Archive the status report
//! - Save the world map and the last vision overlay
//!
//! The recording is replayed open-loop: the demands produced are archived but have no effect on
//! the telemetry of the following records.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use owo_colors::OwoColorize;
use std::collections::HashMap;
use std::env;

// Internal
use comms_if::eqpt::dems::DriveMode;
use rov_lib::{
    auto::{AutoInput, AutoMgr},
    replay::ReplayLog,
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Parameter file for the AutoMgr, relative to the params directory.
const AUTO_PARAMS_FILE: &str = "auto.toml";

/// Number of ticks between logs of the world map statistics.
const STATS_PERIOD_TICKS: usize = 100;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    let session = Session::new("rover_replay", "sessions")
        .wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Rover Replay Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD RECORDING ----

    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    let recording_dir = match args.get(1) {
        Some(d) if args.len() == 2 => d,
        _ => return Err(eyre!("Expected a single argument, the path to the recording directory")),
    };

    let log = ReplayLog::load(recording_dir)
        .wrap_err_with(|| format!("Failed to load the recording from {}", recording_dir))?;

    info!("Loaded {} records from {}", log.len(), recording_dir);

    // ---- INITIALISE AUTONOMY ----

    let mut auto_mgr = AutoMgr::default();
    auto_mgr
        .init(AUTO_PARAMS_FILE, Some(&session))
        .wrap_err("Failed to initialise AutoMgr")?;

    // ---- MAIN LOOP ----

    let mut skipped = 0usize;
    let mut pickups = 0usize;
    let mut mode_ticks: HashMap<DriveMode, usize> = HashMap::new();

    for (i, record) in log.records.iter().enumerate() {
        let frame = match log.frame(record) {
            Ok(f) => f,
            Err(e) => {
                warn!("Skipping record {}: {}", i, e);
                skipped += 1;
                continue;
            }
        };

        let input = AutoInput {
            telem: record.telem(),
            frame,
        };

        let (dems, _) = auto_mgr
            .proc(&input)
            .wrap_err_with(|| format!("AutoMgr processing failed on record {}", i))?;

        // With no pickup mechanism in a recording the request is acknowledged straight away
        if dems.send_pickup {
            pickups += 1;
            auto_mgr.ack_pickup();
        }

        *mode_ticks.entry(dems.mode).or_insert(0) += 1;

        auto_mgr.write().wrap_err("Failed to write the AutoMgr archive")?;

        if (i + 1) % STATS_PERIOD_TICKS == 0 {
            if let Some(state) = auto_mgr.state() {
                let stats = state.world_map.stats();
                info!("Record {}: map {:?}", i + 1, stats);
                session.save(format!("map_stats/record_{:06}.json", i + 1), stats);
            }
        }
    }

    // ---- OUTPUTS ----

    let state = auto_mgr
        .state()
        .ok_or_else(|| eyre!("AutoMgr has no state after processing"))?;

    let map_path = session.session_root.join("world_map.png");
    state
        .world_map
        .to_image()
        .save(&map_path)
        .wrap_err("Failed to save the world map image")?;

    state
        .vision_image
        .save(session.session_root.join("last_vision.png"))
        .wrap_err("Failed to save the last vision image")?;

    session::save_with_timestamp("world_map.json", state.world_map.clone());

    // ---- SUMMARY ----

    let stats = state.world_map.stats();

    info!(
        "Replay complete: {} ticks, {} skipped, {} pickups requested",
        (log.len() - skipped).green(),
        skipped.yellow(),
        pickups.cyan()
    );
    for mode in &[DriveMode::Forward, DriveMode::Stop, DriveMode::Reverse, DriveMode::Rock] {
        info!(
            "    {}: {} ticks",
            mode.bold(),
            mode_ticks.get(mode).copied().unwrap_or(0)
        );
    }
    info!(
        "World map: {} navigable, {} obstacle, {} target cells",
        stats.navigable_cells.blue(),
        stats.obstacle_cells.red(),
        stats.target_cells.green()
    );
    info!("World map image saved to {:?}", map_path);

    session.exit();

    Ok(())
}
