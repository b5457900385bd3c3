//! Whole-tick tests of the AutoMgr, from synthetic camera frames to demands.

use comms_if::eqpt::{cam::CamImage, dems::DriveMode, telem::RoverTelem};
use image::{Rgb, RgbImage};
use rov_lib::auto::{
    decision::Mode,
    map::WorldMapLayer,
    per::NavSource,
    AutoInput, AutoMgr, AutoMgrError, AutoMgrParams,
};
use util::{module::State, params};

// ------------------------------------------------------------------------------------------------
// HELPERS
// ------------------------------------------------------------------------------------------------

const GROUND: Rgb<u8> = Rgb([190, 170, 165]);
const SAMPLE: Rgb<u8> = Rgb([200, 180, 20]);

/// A frame of open, bright ground.
fn ground_frame() -> RgbImage {
    RgbImage::from_pixel(320, 160, GROUND)
}

/// Bright ground with a sample close in front of the rover.
fn sample_frame() -> RgbImage {
    RgbImage::from_fn(320, 160, |x, y| {
        if (100..220).contains(&x) && (100..155).contains(&y) {
            SAMPLE
        } else {
            GROUND
        }
    })
}

fn input(frame: RgbImage, telem: RoverTelem) -> AutoInput {
    AutoInput {
        telem,
        frame: CamImage::new(frame),
    }
}

fn level_telem() -> RoverTelem {
    RoverTelem {
        position_m: [100.0, 100.0],
        ..Default::default()
    }
}

fn auto_mgr() -> AutoMgr {
    AutoMgr::from_params(AutoMgrParams::default()).unwrap()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[test]
fn test_proc_before_init() {
    let mut mgr = AutoMgr::default();

    assert!(matches!(
        mgr.proc(&input(ground_frame(), level_telem())),
        Err(AutoMgrError::NotInit)
    ));
}

#[test]
fn test_params_file() {
    let params_str = include_str!("../../params/auto.toml");
    let params: AutoMgrParams = params::from_str(params_str).unwrap();

    assert_eq!(params.per.frame_size_px, [320, 160]);
    assert_eq!(params.map.world_size, 200);
    assert_eq!(params.decision.go_forward, 500);

    // Everything is optional
    let params: AutoMgrParams = params::from_str("[decision]\nmax_vel = 3.0\n").unwrap();
    assert_eq!(params.decision.max_vel, 3.0);
    assert_eq!(params.decision.stop_forward, 50);
}

#[test]
fn test_open_ground() {
    let mut mgr = auto_mgr();
    let telem = RoverTelem {
        velocity_ms: 0.5,
        ..level_telem()
    };

    let (dems, report) = mgr.proc(&input(ground_frame(), telem)).unwrap();

    assert_eq!(report.tick, 1);
    assert!(report.map_updated);
    assert!(report.nav_pixels >= 500);
    assert_eq!(report.target_pixels, 0);
    assert_eq!(dems.mode, DriveMode::Forward);
    assert_eq!(dems.throttle, mgr.params().decision.throttle_set);
    assert_eq!(dems.brake, 0.0);

    let state = mgr.state().unwrap();
    assert_eq!(state.nav.as_ref().map(|n| n.source), Some(NavSource::Terrain));
    assert_eq!(state.vision_image.dimensions(), (320, 160));

    // Ground is directly ahead of the rover, and never behind it
    let stats = state.world_map.stats();
    assert!(stats.navigable_cells > 0);
    // The edge of the camera's view blends into the black border and reads as rock
    assert!(stats.obstacle_cells > 0);
    assert!(state.world_map.get(WorldMapLayer::Navigable, 101, 100).unwrap() > 0);
    assert_eq!(state.world_map.get(WorldMapLayer::Navigable, 98, 100), Some(0));
}

#[test]
fn test_tilted_frame_leaves_map() {
    let mut mgr = auto_mgr();
    let telem = RoverTelem {
        pitch_deg: 5.0,
        ..level_telem()
    };

    let (_, report) = mgr.proc(&input(ground_frame(), telem)).unwrap();

    assert!(!report.map_updated);
    assert!(report.nav_pixels > 0);

    let stats = mgr.state().unwrap().world_map.stats();
    assert_eq!(stats.navigable_cells, 0);
    assert_eq!(stats.target_cells, 0);
}

#[test]
fn test_sample_sighted() {
    let mut mgr = auto_mgr();
    let telem = RoverTelem {
        velocity_ms: 0.5,
        ..level_telem()
    };

    let (dems, report) = mgr.proc(&input(sample_frame(), telem)).unwrap();

    assert!(report.target_pixels > 10);
    assert_eq!(report.nav_pixels, report.target_pixels);
    assert_eq!(dems.mode, DriveMode::Rock);

    let state = mgr.state().unwrap();
    assert_eq!(state.nav.as_ref().map(|n| n.source), Some(NavSource::Target));
    assert!(state.world_map.stats().target_cells > 0);

    // Sample overlay is yellow
    assert!(state
        .vision_image
        .pixels()
        .any(|p| *p == Rgb([255, 255, 0])));

    // Out of sight again
    let (dems, _) = mgr.proc(&input(ground_frame(), telem)).unwrap();
    assert_eq!(dems.mode, DriveMode::Forward);
}

#[test]
fn test_pickup_round_trip() {
    let mut mgr = auto_mgr();
    let telem = RoverTelem {
        near_sample: true,
        ..level_telem()
    };

    let (dems, _) = mgr.proc(&input(sample_frame(), telem)).unwrap();
    assert!(dems.send_pickup);
    assert_eq!(dems.mode, DriveMode::Forward);

    mgr.ack_pickup();
    assert!(!mgr.state().unwrap().send_pickup);

    let telem = RoverTelem {
        picking_up: true,
        ..telem
    };
    let (dems, report) = mgr.proc(&input(sample_frame(), telem)).unwrap();
    assert!(!dems.send_pickup);
    assert_eq!(dems.mode, DriveMode::Forward);
    assert_eq!(report.tick, 2);
    assert_eq!(mgr.state().unwrap().mode, Mode::forward());
}
