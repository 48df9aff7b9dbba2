//! Rasterizes privacy blur-zone polygons into PNG alpha masks FFmpeg composites as a strong blur
//! mask over the source tile (§4.5.4). Zones with a caller-supplied `mask_png_bytes` skip
//! rasterization entirely.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use td_models::{BlurZone, Point2};

use crate::error::{OverlayError, OverlayResult};

/// Opaque white where the polygon covers a pixel, transparent elsewhere, scaled to
/// `zone.mask_width x zone.mask_height`. Uses `mask_png_bytes` directly when the caller supplied
/// one rather than re-deriving it from `polygon`.
pub fn rasterize_blur_mask(zone: &BlurZone) -> OverlayResult<Vec<u8>> {
    if let Some(bytes) = &zone.mask_png_bytes {
        return Ok(bytes.clone());
    }
    if !zone.is_valid() {
        return Err(OverlayError::InvalidBlurZone);
    }

    let width = zone.mask_width.max(1);
    let height = zone.mask_height.max(1);
    let mut image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));

    let polygon_px: Vec<(f64, f64)> = zone
        .polygon
        .iter()
        .map(|p: &Point2| (p.x * width as f64, p.y * height as f64))
        .collect();

    for y in 0..height {
        let scan_y = y as f64 + 0.5;
        let mut crossings = scanline_crossings(&polygon_px, scan_y);
        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in crossings.chunks(2) {
            let [start, end] = pair else { continue };
            let x0 = start.max(0.0).round() as u32;
            let x1 = (end.min(width as f64 - 1.0)).round() as u32;
            for x in x0..=x1.min(width.saturating_sub(1)) {
                image.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
    }

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|source| OverlayError::Encode(source.to_string()))?;
    Ok(bytes)
}

/// x-coordinates where the polygon edges cross the horizontal line `y == scan_y`.
fn scanline_crossings(polygon: &[(f64, f64)], scan_y: f64) -> Vec<f64> {
    let n = polygon.len();
    let mut crossings = Vec::new();
    for i in 0..n {
        let (x0, y0) = polygon[i];
        let (x1, y1) = polygon[(i + 1) % n];
        if (y0 <= scan_y && y1 > scan_y) || (y1 <= scan_y && y0 > scan_y) {
            let t = (scan_y - y0) / (y1 - y0);
            crossings.push(x0 + t * (x1 - x0));
        }
    }
    crossings
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_models::Camera;

    fn square_zone() -> BlurZone {
        BlurZone {
            camera: Camera::Front,
            polygon: vec![
                Point2::new(0.25, 0.25),
                Point2::new(0.75, 0.25),
                Point2::new(0.75, 0.75),
                Point2::new(0.25, 0.75),
            ],
            mask_png_bytes: None,
            mask_width: 40,
            mask_height: 40,
        }
    }

    #[test]
    fn rasterizes_a_valid_zone_to_png_bytes() {
        let bytes = rasterize_blur_mask(&square_zone()).unwrap();
        assert_eq!(&bytes[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn rejects_degenerate_polygon() {
        let mut zone = square_zone();
        zone.polygon = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        assert!(rasterize_blur_mask(&zone).is_err());
    }

    #[test]
    fn caller_supplied_mask_bypasses_rasterization() {
        let mut zone = square_zone();
        zone.mask_png_bytes = Some(vec![1, 2, 3]);
        assert_eq!(rasterize_blur_mask(&zone).unwrap(), vec![1, 2, 3]);
    }
}
