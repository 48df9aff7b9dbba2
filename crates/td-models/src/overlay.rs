//! Privacy blur zones rasterized or burned in by the overlay compiler.

use serde::{Deserialize, Serialize};

use crate::camera::Camera;

/// A point in normalized tile space, `[0, 1]` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A region of one camera's tile to obscure with a strong blur.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlurZone {
    pub camera: Camera,
    /// Simple (non-self-intersecting) polygon, at least 3 non-collinear points.
    pub polygon: Vec<Point2>,
    /// Caller-supplied precomputed mask; when present it is used directly instead of
    /// rasterizing `polygon`.
    pub mask_png_bytes: Option<Vec<u8>>,
    pub mask_width: u32,
    pub mask_height: u32,
}

impl BlurZone {
    /// Bit-area of the polygon via the shoelace formula (unsigned). Zero (or indistinguishable
    /// from zero) means the points are collinear / degenerate.
    pub fn polygon_area(&self) -> f64 {
        let n = self.polygon.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let p0 = self.polygon[i];
            let p1 = self.polygon[(i + 1) % n];
            sum += p0.x * p1.y - p1.x * p0.y;
        }
        (sum / 2.0).abs()
    }

    /// A zone is usable only if it has at least 3 points and non-zero area (rejects collinear
    /// "polygons", §8 boundary behavior `InvalidBlurZone`).
    pub fn is_valid(&self) -> bool {
        self.polygon.len() >= 3 && self.polygon_area() > 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_triangle_has_zero_area() {
        let zone = BlurZone {
            camera: Camera::Front,
            polygon: vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.5, 0.5),
                Point2::new(1.0, 1.0),
            ],
            mask_png_bytes: None,
            mask_width: 100,
            mask_height: 100,
        };
        assert!(!zone.is_valid());
    }

    #[test]
    fn proper_triangle_is_valid() {
        let zone = BlurZone {
            camera: Camera::Front,
            polygon: vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
            ],
            mask_png_bytes: None,
            mask_width: 100,
            mask_height: 100,
        };
        assert!(zone.is_valid());
    }
}
