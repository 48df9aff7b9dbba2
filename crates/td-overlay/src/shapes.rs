//! Deterministic vector path fragments for dashboard glyphs, as pure `(scale, style) -> path`
//! functions (§9 redesign: no shared mutable drawing-helper state).
//!
//! Every function returns an ASS drawing-command fragment (the content placed between
//! `{\p1}` / `{\p0}` override tags), rooted at `(0, 0)` and scaled by `scale`.

use std::fmt::Write as _;

fn polygon(points: &[(f64, f64)]) -> String {
    let mut out = String::new();
    for (i, (x, y)) in points.iter().enumerate() {
        let cmd = if i == 0 { "m" } else { "l" };
        write!(out, "{cmd} {:.1} {:.1} ", x, y).unwrap();
    }
    out
}

fn circle_points(cx: f64, cy: f64, r: f64, segments: usize) -> Vec<(f64, f64)> {
    (0..segments)
        .map(|i| {
            let theta = (i as f64 / segments as f64) * std::f64::consts::TAU;
            (cx + r * theta.cos(), cy + r * theta.sin())
        })
        .collect()
}

/// Outer disc + inner ring with three grip cutouts, rotated to `-steering_angle_deg`. `scale` is
/// the disc radius in canvas pixels.
pub fn steering_wheel_path(scale: f64, steering_angle_deg: f64) -> String {
    let rotation = -steering_angle_deg.to_radians();
    let outer = circle_points(0.0, 0.0, scale, 24);
    let inner = circle_points(0.0, 0.0, scale * 0.6, 20);

    let rotate = |(x, y): (f64, f64)| -> (f64, f64) {
        (
            x * rotation.cos() - y * rotation.sin(),
            x * rotation.sin() + y * rotation.cos(),
        )
    };

    let mut path = polygon(&outer.into_iter().map(rotate).collect::<Vec<_>>());
    path.push_str(&polygon(&inner.into_iter().map(rotate).collect::<Vec<_>>()));

    for grip_index in 0..3 {
        let base_angle = std::f64::consts::TAU / 3.0 * grip_index as f64;
        let angle = base_angle + rotation;
        let (dx, dy) = (angle.cos(), angle.sin());
        let half_width = scale * 0.08;
        let inner_r = scale * 0.6;
        let outer_r = scale;
        let (nx, ny) = (-dy, dx);
        let grip = [
            (dx * inner_r + nx * half_width, dy * inner_r + ny * half_width),
            (dx * outer_r + nx * half_width, dy * outer_r + ny * half_width),
            (dx * outer_r - nx * half_width, dy * outer_r - ny * half_width),
            (dx * inner_r - nx * half_width, dy * inner_r - ny * half_width),
        ];
        path.push_str(&polygon(&grip));
    }
    path
}

/// A rounded-rectangle-ish pedal icon, `scale` pixels tall.
pub fn pedal_path(scale: f64) -> String {
    let w = scale * 0.6;
    let h = scale;
    polygon(&[
        (-w / 2.0, -h / 2.0),
        (w / 2.0, -h / 2.0),
        (w / 2.0, h / 2.0),
        (-w / 2.0, h / 2.0),
    ])
}

/// A left- or right-pointing blinker chevron, `scale` pixels across.
pub fn blinker_arrow_path(scale: f64, pointing_left: bool) -> String {
    let tip = if pointing_left { -scale } else { scale };
    polygon(&[
        (tip, 0.0),
        (tip / 3.0, -scale * 0.6),
        (tip / 3.0, scale * 0.6),
    ])
}

/// A rounded background panel for the dashboard, `width` x `height` pixels, corner radius
/// `radius`. Corners are approximated with short straight chamfers rather than beziers to keep
/// path emission deterministic and simple.
pub fn rounded_panel_path(width: f64, height: f64, radius: f64) -> String {
    let r = radius.min(width / 2.0).min(height / 2.0);
    let (hw, hh) = (width / 2.0, height / 2.0);
    polygon(&[
        (-hw + r, -hh),
        (hw - r, -hh),
        (hw, -hh + r),
        (hw, hh - r),
        (hw - r, hh),
        (-hw + r, hh),
        (-hw, hh - r),
        (-hw, -hh + r),
    ])
}

/// An arrow rotated to `-heading_deg`, `scale` pixels long, for the minimap heading marker.
pub fn heading_arrow_path(scale: f64, heading_deg: f64) -> String {
    let rotation = -heading_deg.to_radians();
    let rotate = |(x, y): (f64, f64)| -> (f64, f64) {
        (
            x * rotation.cos() - y * rotation.sin(),
            x * rotation.sin() + y * rotation.cos(),
        )
    };
    let points = [
        (0.0, -scale),
        (scale * 0.5, scale * 0.5),
        (0.0, scale * 0.2),
        (-scale * 0.5, scale * 0.5),
    ];
    polygon(&points.into_iter().map(rotate).collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steering_wheel_path_starts_with_moveto() {
        let path = steering_wheel_path(40.0, 0.0);
        assert!(path.starts_with("m "));
    }

    #[test]
    fn blinker_arrow_points_opposite_directions() {
        let left = blinker_arrow_path(10.0, true);
        let right = blinker_arrow_path(10.0, false);
        assert_ne!(left, right);
    }

    #[test]
    fn rounded_panel_has_eight_vertices() {
        let path = rounded_panel_path(200.0, 100.0, 12.0);
        assert_eq!(path.matches('l').count(), 7);
    }
}
