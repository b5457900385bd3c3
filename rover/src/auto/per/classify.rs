//! # Terrain classification
//!
//! Fixed-threshold colour classification of a warped frame into navigable terrain, target
//! (sample) markers and obstacles. The three classes are mutually exclusive and checked in that
//! order of precedence. Pixels matching none of them, such as mid-brightness ground or the black
//! area outside the camera's view, are left unclassified.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::{Rgb, RgbImage};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::Mask;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Colour thresholds for the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierParams {
    /// Each of R, G and B must exceed these values for navigable terrain.
    pub navigable_min_rgb: [u8; 3],

    /// Red must exceed this value for a target marker.
    pub target_min_red: u8,

    /// Open range which the green/red ratio must lie in for a target marker (near equal red and
    /// green, i.e. yellow).
    pub target_green_red_ratio: [f64; 2],

    /// The red/blue ratio must exceed this value for a target marker (little blue).
    pub target_min_red_blue_ratio: f64,

    /// Each of R, G and B must be below this value for an obstacle.
    pub obstacle_max_rgb: u8,
}

/// Output of the classifier, three masks of the same shape as the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMasks {
    pub navigable: Mask,
    pub target: Mask,
    pub obstacle: Mask,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Classes a pixel can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainClass {
    Navigable,
    Target,
    Obstacle,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            navigable_min_rgb: [160, 160, 160],
            target_min_red: 100,
            target_green_red_ratio: [0.8, 1.2],
            target_min_red_blue_ratio: 2.0,
            obstacle_max_rgb: 100,
        }
    }
}

impl ClassifierParams {
    /// Classify a single pixel.
    pub fn classify_pixel(&self, pixel: &Rgb<u8>) -> Option<TerrainClass> {
        let [r, g, b] = pixel.0;

        let navigable = r > self.navigable_min_rgb[0]
            && g > self.navigable_min_rgb[1]
            && b > self.navigable_min_rgb[2];

        if navigable {
            return Some(TerrainClass::Navigable);
        }

        // Denominators are offset by one so a zero channel can't divide by zero
        let (r, g, b) = (r as f64, g as f64, b as f64);
        let green_red = g / (r + 1.0);
        let red_blue = r / (b + 1.0);

        let target = r > self.target_min_red as f64
            && green_red > self.target_green_red_ratio[0]
            && green_red < self.target_green_red_ratio[1]
            && red_blue > self.target_min_red_blue_ratio;

        if target {
            return Some(TerrainClass::Target);
        }

        // A sum of zero is outside the camera's field of view after warping
        let max = self.obstacle_max_rgb as f64;
        let obstacle = r + g + b > 0.0 && r < max && g < max && b < max;

        if obstacle {
            Some(TerrainClass::Obstacle)
        } else {
            None
        }
    }

    /// Classify every pixel of a (warped) frame.
    pub fn classify(&self, frame: &RgbImage) -> TerrainMasks {
        let shape = (frame.height() as usize, frame.width() as usize);

        let mut masks = TerrainMasks {
            navigable: Array2::from_elem(shape, false),
            target: Array2::from_elem(shape, false),
            obstacle: Array2::from_elem(shape, false),
        };

        for (x, y, pixel) in frame.enumerate_pixels() {
            let idx = [y as usize, x as usize];

            match self.classify_pixel(pixel) {
                Some(TerrainClass::Navigable) => masks.navigable[idx] = true,
                Some(TerrainClass::Target) => masks.target[idx] = true,
                Some(TerrainClass::Obstacle) => masks.obstacle[idx] = true,
                None => (),
            }
        }

        masks
    }
}

impl TerrainMasks {
    /// Render the masks as a display overlay.
    ///
    /// Red carries obstacles and targets, green carries targets only and blue carries navigable
    /// terrain, each at full intensity.
    pub fn to_overlay(&self) -> RgbImage {
        let (rows, cols) = self.navigable.dim();

        RgbImage::from_fn(cols as u32, rows as u32, |x, y| {
            let idx = [y as usize, x as usize];
            let on = |active: bool| if active { 255 } else { 0 };

            Rgb([
                on(self.obstacle[idx] || self.target[idx]),
                on(self.target[idx]),
                on(self.navigable[idx]),
            ])
        })
    }

    /// Count of active pixels in each mask, in (navigable, target, obstacle) order.
    pub fn counts(&self) -> (usize, usize, usize) {
        let count = |m: &Mask| m.iter().filter(|&&v| v).count();

        (count(&self.navigable), count(&self.target), count(&self.obstacle))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_classify_pixel() {
        let params = ClassifierParams::default();
        let class = |r, g, b| params.classify_pixel(&Rgb([r, g, b]));

        // Bright ground
        assert_eq!(class(200, 180, 170), Some(TerrainClass::Navigable));
        assert_eq!(class(255, 255, 255), Some(TerrainClass::Navigable));
        // One channel at the threshold isn't navigable
        assert_eq!(class(160, 200, 200), None);

        // Yellow sample
        assert_eq!(class(150, 140, 20), Some(TerrainClass::Target));
        assert_eq!(class(255, 255, 0), Some(TerrainClass::Target));
        // Too much blue
        assert_eq!(class(150, 140, 90), None);
        // Too little green
        assert_eq!(class(150, 100, 20), None);
        // Too dark
        assert_eq!(class(100, 100, 0), None);

        // Dark rock
        assert_eq!(class(90, 60, 40), Some(TerrainClass::Obstacle));
        assert_eq!(class(0, 0, 1), Some(TerrainClass::Obstacle));
        // Outside the field of view
        assert_eq!(class(0, 0, 0), None);
        // Mid-brightness is left alone
        assert_eq!(class(120, 110, 100), None);
    }

    #[test]
    fn test_classes_are_exclusive() {
        let params = ClassifierParams::default();

        // Sweep a coarse grid of the colour cube
        let frame = RgbImage::from_fn(64, 64, |x, y| {
            let i = y * 64 + x;
            Rgb([
                ((i % 16) * 17) as u8,
                (((i / 16) % 16) * 17) as u8,
                (((i / 256) % 16) * 17) as u8
            ])
        });

        let masks = params.classify(&frame);

        for ((n, t), o) in masks.navigable.iter()
            .zip(masks.target.iter())
            .zip(masks.obstacle.iter())
        {
            assert!((*n as u8 + *t as u8 + *o as u8) <= 1);
        }

        let (n, t, o) = masks.counts();
        assert!(n > 0 && t > 0 && o > 0);
    }

    #[test]
    fn test_overlay() {
        let params = ClassifierParams::default();
        let mut frame = RgbImage::new(3, 1);
        frame.put_pixel(0, 0, Rgb([200, 200, 200]));
        frame.put_pixel(1, 0, Rgb([150, 140, 20]));
        frame.put_pixel(2, 0, Rgb([50, 50, 50]));

        let masks = params.classify(&frame);
        assert_eq!(masks.navigable.dim(), (1, 3));

        let overlay = masks.to_overlay();
        assert_eq!(*overlay.get_pixel(0, 0), Rgb([0, 0, 255]));
        assert_eq!(*overlay.get_pixel(1, 0), Rgb([255, 255, 0]));
        assert_eq!(*overlay.get_pixel(2, 0), Rgb([255, 0, 0]));
    }
}
