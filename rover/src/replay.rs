//! # Replay
//!
//! Loads simulator recordings so the autonomy core can be driven offline. A recording is a
//! directory holding `robot_log.csv` and the camera frames it references, normally in an `IMG`
//! subdirectory. The log is `;` separated with a header row:
//!
//! ```text
//! Path;SteerAngle;Throttle;Brake;Speed;X_Position;Y_Position;Pitch;Yaw;Roll
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use comms_if::eqpt::{cam::CamImage, telem::RoverTelem};
use csv::ReaderBuilder;
use log::debug;
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Name of the log file within a recording directory.
pub const LOG_FILE_NAME: &str = "robot_log.csv";

/// Directory within a recording which holds the frames.
pub const IMG_DIR_NAME: &str = "IMG";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single row of the recording log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplayRecord {
    /// Path to the camera frame as written by the simulator.
    #[serde(rename = "Path")]
    pub path: String,

    /// Steer angle commanded during the recording.
    #[serde(rename = "SteerAngle")]
    pub steer_angle_deg: f64,

    #[serde(rename = "Throttle")]
    pub throttle: f64,

    #[serde(rename = "Brake")]
    pub brake: f64,

    #[serde(rename = "Speed")]
    pub speed_ms: f64,

    #[serde(rename = "X_Position")]
    pub x_position_m: f64,

    #[serde(rename = "Y_Position")]
    pub y_position_m: f64,

    #[serde(rename = "Pitch")]
    pub pitch_deg: f64,

    #[serde(rename = "Yaw")]
    pub yaw_deg: f64,

    #[serde(rename = "Roll")]
    pub roll_deg: f64,
}

/// A loaded recording.
#[derive(Debug, Clone)]
pub struct ReplayLog {
    /// Directory the recording lives in, frame paths are resolved relative to this.
    pub dir: PathBuf,

    pub records: Vec<ReplayRecord>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Cannot open the recording log {0:?}: {1}")]
    LogOpenError(PathBuf, std::io::Error),

    #[error("Cannot parse the recording log: {0}")]
    LogParseError(csv::Error),

    #[error("Frame {0:?} could not be found in the recording")]
    FrameNotFound(String),

    #[error("Cannot decode frame {0:?}: {1}")]
    FrameDecodeError(PathBuf, image::ImageError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ReplayRecord {
    /// Telemetry equivalent to this record.
    ///
    /// The recording has no proximity or pickup information, so those flags are cleared.
    pub fn telem(&self) -> RoverTelem {
        RoverTelem {
            position_m: [self.x_position_m, self.y_position_m],
            yaw_deg: self.yaw_deg,
            pitch_deg: self.pitch_deg,
            roll_deg: self.roll_deg,
            velocity_ms: self.speed_ms,
            near_sample: false,
            picking_up: false,
        }
    }
}

impl ReplayLog {
    /// Load the recording in the given directory.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, ReplayError> {
        let log_path = dir.as_ref().join(LOG_FILE_NAME);
        let file = File::open(&log_path).map_err(|e| ReplayError::LogOpenError(log_path, e))?;

        Self::from_reader(dir, file)
    }

    /// Parse a recording log from a reader, resolving frames relative to `dir`.
    pub fn from_reader<P: AsRef<Path>, R: Read>(dir: P, reader: R) -> Result<Self, ReplayError> {
        let records = ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .from_reader(reader)
            .deserialize()
            .collect::<Result<Vec<ReplayRecord>, _>>()
            .map_err(ReplayError::LogParseError)?;

        debug!("Loaded {} replay records", records.len());

        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find the frame referenced by a record.
    ///
    /// The path is tried as written, then relative to the recording directory, then by file name
    /// within the recording's image directory. Simulator paths are often relative to wherever the
    /// simulator was run from, so the last is the usual match.
    pub fn frame_path(&self, record: &ReplayRecord) -> Option<PathBuf> {
        let written = Path::new(&record.path);

        let mut candidates = vec![written.to_path_buf(), self.dir.join(written)];
        if let Some(name) = written.file_name() {
            candidates.push(self.dir.join(IMG_DIR_NAME).join(name));
        }

        candidates.into_iter().find(|p| p.is_file())
    }

    /// Load the frame referenced by a record.
    pub fn frame(&self, record: &ReplayRecord) -> Result<CamImage, ReplayError> {
        let path = self
            .frame_path(record)
            .ok_or_else(|| ReplayError::FrameNotFound(record.path.clone()))?;

        CamImage::open(&path).map_err(|e| ReplayError::FrameDecodeError(path, e))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
