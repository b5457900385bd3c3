//! # Camera Equipment Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::Path;
use chrono::{DateTime, Utc};
use image::{ImageResult, RgbImage};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A decoded camera frame.
///
/// The image origin is the top-left pixel. Its resolution must match the resolution the camera
/// calibration was made for.
#[derive(Debug, Clone)]
pub struct CamImage {
    /// UTC timestamp at which the frame was acquired
    pub timestamp: DateTime<Utc>,

    /// The image itself
    pub image: RgbImage
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CamImage {
    /// Wrap an already decoded image, stamping it with the current time.
    pub fn new(image: RgbImage) -> Self {
        Self {
            timestamp: Utc::now(),
            image
        }
    }

    /// Load a recorded frame from disk. Any colour type is converted to 8-bit RGB.
    pub fn open<P: AsRef<Path>>(path: P) -> ImageResult<Self> {
        Ok(Self::new(image::open(path)?.to_rgb8()))
    }

    /// Width and height of the image in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};

    #[test]
    fn test_open_converts_to_rgb() {
        // Recorded frames may carry an alpha channel
        let mut img = RgbaImage::from_pixel(8, 4, Rgba([190, 170, 165, 255]));
        img.put_pixel(3, 2, Rgba([200, 180, 20, 128]));

        let path = std::env::temp_dir()
            .join(format!("cam_open_{}.png", std::process::id()));
        img.save(&path).unwrap();

        let cam_img = CamImage::open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(cam_img.dimensions(), (8, 4));
        assert_eq!(*cam_img.image.get_pixel(0, 0), Rgb([190, 170, 165]));
        assert_eq!(*cam_img.image.get_pixel(3, 2), Rgb([200, 180, 20]));
    }

    #[test]
    fn test_open_missing_file() {
        let path = std::env::temp_dir()
            .join(format!("cam_missing_{}.png", std::process::id()));

        assert!(CamImage::open(&path).is_err());
    }
}
