//! # Coordinate transforms
//!
//! Pure geometry used by the perception pipeline:
//!
//! - Perspective warp of the camera frame into a top-down view of the ground.
//! - Conversion of active mask pixels into the rover-centric frame (x forward, y left, origin at
//!   the bottom centre of the warped image).
//! - Cartesian to polar conversion in the rover-centric frame.
//! - Rotation, scaling and translation of rover-centric pixels into world map cells.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::{Rgb, RgbImage};
use nalgebra::{DMatrix, DVector, Matrix3, Point2, Vector3};

use super::Mask;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Below this magnitude the homogeneous coordinate of a projected point is treated as zero, i.e.
/// the point lies on the horizon of the projection.
const HORIZON_EPSILON: f64 = 1e-12;

/// Below this area a triangle of calibration points is treated as collinear.
const COLLINEAR_EPSILON: f64 = 1e-9;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A projective transform between two planes, along with its inverse.
#[derive(Debug, Clone, PartialEq)]
pub struct Homography {
    /// Maps source (camera) points into destination (top-down) points.
    h: Matrix3<f64>,

    /// Maps destination points back into the source.
    h_inv: Matrix3<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, thiserror::Error)]
pub enum HomographyError {
    #[error("The calibration quads are degenerate (collinear or repeated points)")]
    Degenerate,

    #[error("The homography computed from the calibration quads is not invertible")]
    NotInvertible,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Homography {
    /// Compute the homography which maps each `src[i]` onto `dst[i]`.
    ///
    /// Points are given as `[x, y]` pixel coordinates. With `h33` fixed at 1 each correspondence
    /// gives two linear equations in the remaining eight coefficients:
    ///
    /// ```text
    /// [x y 1 0 0 0 -ux -uy] h = u
    /// [0 0 0 x y 1 -vx -vy] h = v
    /// ```
    pub fn from_quads(src: &[[f64; 2]; 4], dst: &[[f64; 2]; 4]) -> Result<Self, HomographyError> {
        if is_degenerate(src) || is_degenerate(dst) {
            return Err(HomographyError::Degenerate);
        }

        let mut a = Vec::with_capacity(64);
        let mut b = Vec::with_capacity(8);

        for (&[x, y], &[u, v]) in src.iter().zip(dst.iter()) {
            a.extend_from_slice(&[x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y]);
            b.push(u);
            a.extend_from_slice(&[0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y]);
            b.push(v);
        }

        let a = DMatrix::from_row_slice(8, 8, &a);
        let b = DVector::from_vec(b);

        let coeffs = a.lu().solve(&b).ok_or(HomographyError::Degenerate)?;

        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(HomographyError::Degenerate);
        }

        let h = Matrix3::new(
            coeffs[0], coeffs[1], coeffs[2],
            coeffs[3], coeffs[4], coeffs[5],
            coeffs[6], coeffs[7], 1.0,
        );

        let h_inv = h.try_inverse().ok_or(HomographyError::NotInvertible)?;

        Ok(Self { h, h_inv })
    }

    /// Map a source point into the destination plane, or `None` if it maps to infinity.
    pub fn project(&self, point: Point2<f64>) -> Option<Point2<f64>> {
        apply(&self.h, point)
    }

    /// Map a destination point back into the source plane, or `None` if it maps to infinity.
    pub fn unproject(&self, point: Point2<f64>) -> Option<Point2<f64>> {
        apply(&self.h_inv, point)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Reproject a camera frame into a top-down view of the ground.
///
/// The output has the same size as the input. Each output pixel is bilinearly interpolated from
/// the four source pixels around its position under the inverse homography. Neighbours outside
/// the source frame count as black, so output pixels which look outside the frame are black and
/// those along the edge of the camera's view are darkened.
pub fn warp_to_top_down(frame: &RgbImage, homography: &Homography) -> RgbImage {
    let (width, height) = frame.dimensions();

    RgbImage::from_fn(width, height, |x, y| {
        match homography.unproject(Point2::new(x as f64, y as f64)) {
            Some(src) => sample_bilinear(frame, src),
            None => Rgb([0, 0, 0]),
        }
    })
}

/// Convert every active pixel of the mask into rover-centric coordinates.
///
/// The reference point is the bottom centre of the image: `x = rows - row` (forward) and
/// `y = cols/2 - col` (left). Pixels are returned in row-major order.
pub fn to_rover_centric(mask: &Mask) -> (Vec<f64>, Vec<f64>) {
    let (rows, cols) = mask.dim();
    let half_cols = cols as f64 / 2.0;

    mask.indexed_iter()
        .filter(|(_, &active)| active)
        .map(|((row, col), _)| (rows as f64 - row as f64, half_cols - col as f64))
        .unzip()
}

/// Convert rover-centric cartesian coordinates into (distance, angle) pairs.
///
/// Angles are in radians, zero straight ahead and positive to the left.
pub fn to_polar(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y.iter())
        .map(|(&x, &y)| ((x * x + y * y).sqrt(), y.atan2(x)))
        .unzip()
}

/// Project rover-centric pixels into world map cells.
///
/// Pixels are rotated by the rover's yaw, divided by `scale` (pixels per world cell) and
/// translated by the rover's position. The result is truncated towards zero and clamped into
/// `[0, world_size - 1]` on each axis, so projections beyond the map edge land on the edge rather
/// than being dropped.
///
/// Returns `(x, y)` cell indices.
pub fn to_world_frame(
    x: &[f64],
    y: &[f64],
    position: [f64; 2],
    yaw_deg: f64,
    world_size: usize,
    scale: f64,
) -> Vec<(usize, usize)> {
    let (sin_yaw, cos_yaw) = yaw_deg.to_radians().sin_cos();

    x.iter()
        .zip(y.iter())
        .map(|(&x, &y)| {
            let x_rot = x * cos_yaw - y * sin_yaw;
            let y_rot = x * sin_yaw + y * cos_yaw;

            (
                clamp_to_map(position[0] + x_rot / scale, world_size),
                clamp_to_map(position[1] + y_rot / scale, world_size),
            )
        })
        .collect()
}

/// Truncate a world coordinate to a cell index inside the map.
fn clamp_to_map(value: f64, world_size: usize) -> usize {
    let max_cell = world_size.saturating_sub(1) as i64;

    // `as` truncates towards zero, and saturates for out of range values
    (value as i64).max(0).min(max_cell) as usize
}

/// Bilinear sample of the frame at a sub-pixel position, with a black border.
fn sample_bilinear(frame: &RgbImage, point: Point2<f64>) -> Rgb<u8> {
    let (width, height) = frame.dimensions();

    // Entirely outside, including non-finite positions
    if !(point.x > -1.0 && point.y > -1.0 && point.x < width as f64 && point.y < height as f64) {
        return Rgb([0, 0, 0]);
    }

    let (x0, y0) = (point.x.floor(), point.y.floor());
    let (fx, fy) = (point.x - x0, point.y - y0);

    let neighbours = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1.0, y0, fx * (1.0 - fy)),
        (x0, y0 + 1.0, (1.0 - fx) * fy),
        (x0 + 1.0, y0 + 1.0, fx * fy),
    ];

    let mut acc = [0f64; 3];
    for &(nx, ny, weight) in neighbours.iter() {
        if nx < 0.0 || ny < 0.0 || nx >= width as f64 || ny >= height as f64 {
            continue;
        }

        let pixel = frame.get_pixel(nx as u32, ny as u32);
        for (a, &c) in acc.iter_mut().zip(pixel.0.iter()) {
            *a += weight * c as f64;
        }
    }

    Rgb([to_channel(acc[0]), to_channel(acc[1]), to_channel(acc[2])])
}

fn to_channel(value: f64) -> u8 {
    value.round().max(0.0).min(255.0) as u8
}

/// A quad is degenerate if any three of its points are collinear (including repeated points).
fn is_degenerate(quad: &[[f64; 2]; 4]) -> bool {
    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];

    TRIPLES.iter().any(|&[i, j, k]| {
        let (a, b, c) = (quad[i], quad[j], quad[k]);
        let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);

        cross.abs() < COLLINEAR_EPSILON
    })
}

fn apply(m: &Matrix3<f64>, point: Point2<f64>) -> Option<Point2<f64>> {
    let p = m * Vector3::new(point.x, point.y, 1.0);

    if p.z.abs() < HORIZON_EPSILON {
        None
    } else {
        Some(Point2::new(p.x / p.z, p.y / p.z))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::Array2;

    const CALIB_SRC: [[f64; 2]; 4] = [[14.0, 140.0], [301.0, 140.0], [200.0, 96.0], [118.0, 96.0]];
    const CALIB_DST: [[f64; 2]; 4] = [[155.0, 154.0], [165.0, 154.0], [165.0, 144.0], [155.0, 144.0]];

    fn assert_close(a: Point2<f64>, b: [f64; 2]) {
        assert!(
            (a.x - b[0]).abs() < 1e-6 && (a.y - b[1]).abs() < 1e-6,
            "{:?} != {:?}", a, b
        );
    }

    #[test]
    fn test_homography_maps_calibration_points() -> Result<(), HomographyError> {
        let h = Homography::from_quads(&CALIB_SRC, &CALIB_DST)?;

        for (src, dst) in CALIB_SRC.iter().zip(CALIB_DST.iter()) {
            assert_close(h.project(Point2::new(src[0], src[1])).unwrap(), *dst);
            assert_close(h.unproject(Point2::new(dst[0], dst[1])).unwrap(), *src);
        }

        Ok(())
    }

    #[test]
    fn test_homography_rejects_degenerate_quads() {
        let collinear = [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let repeated = [[0.0, 0.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];

        assert!(Homography::from_quads(&collinear, &CALIB_DST).is_err());
        assert!(Homography::from_quads(&repeated, &CALIB_DST).is_err());
    }

    #[test]
    fn test_warp() -> Result<(), HomographyError> {
        let square = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
        let frame = RgbImage::from_fn(6, 4, |x, y| Rgb([x as u8 * 10, y as u8 * 10, 200]));

        // Identical quads give back the same frame
        let identity = Homography::from_quads(&square, &square)?;
        assert_eq!(warp_to_top_down(&frame, &identity), frame);

        // Shifting the destination right by two pixels leaves two black columns on the left
        let mut shifted = square;
        for p in shifted.iter_mut() {
            p[0] += 2.0;
        }
        let shift = Homography::from_quads(&square, &shifted)?;
        let warped = warp_to_top_down(&frame, &shift);

        assert_eq!(warped.dimensions(), (6, 4));
        for y in 0..4 {
            assert_eq!(*warped.get_pixel(0, y), Rgb([0, 0, 0]));
            assert_eq!(*warped.get_pixel(1, y), Rgb([0, 0, 0]));
            assert_eq!(warped.get_pixel(5, y), frame.get_pixel(3, y));
        }

        Ok(())
    }

    #[test]
    fn test_warp_interpolates() -> Result<(), HomographyError> {
        let square = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
        let frame = RgbImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgb([100, 100, 100])
            } else {
                Rgb([200, 200, 200])
            }
        });

        // Half a pixel to the right, so each output pixel sits between two source pixels
        let mut shifted = square;
        for p in shifted.iter_mut() {
            p[0] += 0.5;
        }
        let shift = Homography::from_quads(&square, &shifted)?;
        let warped = warp_to_top_down(&frame, &shift);

        for y in 0..2 {
            // Half black border, half frame
            assert_eq!(*warped.get_pixel(0, y), Rgb([50, 50, 50]));
            assert_eq!(*warped.get_pixel(1, y), Rgb([100, 100, 100]));
            assert_eq!(*warped.get_pixel(2, y), Rgb([150, 150, 150]));
            assert_eq!(*warped.get_pixel(3, y), Rgb([200, 200, 200]));
        }

        Ok(())
    }

    #[test]
    fn test_to_rover_centric() {
        let mut mask = Array2::from_elem((4, 8), false);
        mask[[0, 0]] = true;
        mask[[3, 4]] = true;
        mask[[2, 7]] = true;

        let (x, y) = to_rover_centric(&mask);

        assert_eq!(x, vec![4.0, 2.0, 1.0]);
        assert_eq!(y, vec![4.0, -3.0, 0.0]);

        let (x, y) = to_rover_centric(&Array2::from_elem((4, 8), false));
        assert!(x.is_empty() && y.is_empty());
    }

    #[test]
    fn test_to_polar() {
        let (dist, angle) = to_polar(&[1.0, 0.0, 3.0], &[0.0, 2.0, -4.0]);

        assert_eq!(dist, vec![1.0, 2.0, 5.0]);
        assert_eq!(angle[0], 0.0);
        assert!((angle[1] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!(angle[2] < 0.0);
    }

    #[test]
    fn test_to_world_frame() {
        // Facing along world Y, a pixel 10 ahead is one cell up in Y
        let cells = to_world_frame(&[10.0], &[0.0], [50.0, 50.0], 90.0, 200, 10.0);
        assert_eq!(cells, vec![(50, 51)]);

        // Fractional positions truncate
        let cells = to_world_frame(&[0.0], &[0.0], [10.9, 12.99], 0.0, 200, 10.0);
        assert_eq!(cells, vec![(10, 12)]);
    }

    #[test]
    fn test_to_world_frame_clamps() {
        let world_size = 200;
        let cells = to_world_frame(
            &[0.0, 5000.0],
            &[0.0, 0.0],
            [-3.0, (world_size + 10) as f64],
            0.0,
            world_size,
            10.0
        );

        assert_eq!(cells, vec![(0, world_size - 1), (world_size - 1, world_size - 1)]);
    }
}
