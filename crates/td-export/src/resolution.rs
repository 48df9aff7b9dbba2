//! Per-tile resolution table and grid derivation (§4.5.1, bit-exact).

use td_models::{Camera, Quality};

/// `(width, height)` for one camera tile at `quality`, before grid multiplication.
///
/// The front-only table applies when exactly one camera is selected and it is [`Camera::Front`];
/// otherwise the multi table applies, even for a single non-front camera.
pub fn tile_dimensions(quality: Quality, front_only: bool) -> (u32, u32) {
    match (quality, front_only) {
        (Quality::Mobile, true) => (724, 469),
        (Quality::Medium, true) => (1448, 938),
        (Quality::High, true) => (2172, 1407),
        (Quality::Max, true) => (2896, 1876),
        (Quality::Mobile, false) => (484, 314),
        (Quality::Medium, false) => (724, 469),
        (Quality::High, false) => (1086, 704),
        (Quality::Max, false) => (1448, 938),
    }
}

/// `true` iff `cameras` is exactly `{ Camera::Front }` (§4.5.1).
pub fn is_front_only(cameras: &[Camera]) -> bool {
    cameras == [Camera::Front]
}

/// `cols x rows` for `camera_count` cameras when no explicit layout is given (§4.5.1).
pub fn default_grid(camera_count: usize) -> (u32, u32) {
    match camera_count {
        0 | 1 => (1, 1),
        2 => (2, 1),
        3 => (3, 1),
        4 => (2, 2),
        5 | 6 => (3, 2),
        n => {
            let cols = (n as f64).sqrt().ceil() as u32;
            let rows = (n as u32 + cols - 1) / cols;
            (cols, rows)
        }
    }
}

/// Final canvas size: `perCamW x cols`, `perCamH x rows`. Even alignment is only needed for
/// `xstack` grid tiling; a single-tile (1x1) canvas is the per-tile resolution verbatim (§4.5.1,
/// §8 scenario 2: front-only high quality is `2172x1407`, an odd height, left unrounded).
pub fn canvas_size(tile: (u32, u32), grid: (u32, u32)) -> (u32, u32) {
    if grid == (1, 1) {
        return tile;
    }
    let width = round_down_even(tile.0 * grid.0);
    let height = round_down_even(tile.1 * grid.1);
    (width, height)
}

fn round_down_even(value: u32) -> u32 {
    value - (value % 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_only_uses_the_front_only_table() {
        assert_eq!(tile_dimensions(Quality::Medium, true), (1448, 938));
        assert_eq!(tile_dimensions(Quality::Medium, false), (724, 469));
    }

    #[test]
    fn default_grid_matches_the_spec_table() {
        assert_eq!(default_grid(1), (1, 1));
        assert_eq!(default_grid(2), (2, 1));
        assert_eq!(default_grid(3), (3, 1));
        assert_eq!(default_grid(4), (2, 2));
        assert_eq!(default_grid(5), (3, 2));
        assert_eq!(default_grid(6), (3, 2));
    }

    #[test]
    fn six_camera_medium_canvas_matches_worked_example() {
        let tile = tile_dimensions(Quality::Medium, false);
        let grid = default_grid(6);
        assert_eq!(canvas_size(tile, grid), (2172, 938));
    }

    #[test]
    fn canvas_dimensions_round_down_to_even() {
        assert_eq!(round_down_even(485), 484);
        assert_eq!(round_down_even(484), 484);
    }

    #[test]
    fn front_only_single_tile_canvas_is_not_rounded() {
        let tile = tile_dimensions(Quality::High, true);
        let grid = default_grid(1);
        assert_eq!(canvas_size(tile, grid), (2172, 1407));
    }
}
