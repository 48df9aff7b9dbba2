//! Compiles a GPS polyline into an ASS vector minimap overlay (§4.5.5).

use td_models::{DashboardSize, GpsPath, PositionPreset};

use crate::ass::{AssDocument, Event, Style};
use crate::shapes::heading_arrow_path;

#[derive(Debug, Clone)]
pub struct MinimapOptions {
    pub size: DashboardSize,
    pub position: PositionPreset,
    pub dark_mode: bool,
    pub canvas_w: u32,
    pub canvas_h: u32,
}

impl MinimapOptions {
    fn panel_dimensions(&self) -> f64 {
        let scale = match self.size {
            DashboardSize::Small => 0.16,
            DashboardSize::Medium => 0.22,
            DashboardSize::Large => 0.3,
            DashboardSize::Xlarge => 0.38,
        };
        self.canvas_w as f64 * scale
    }

    fn anchor_px(&self, panel: f64) -> (f64, f64) {
        let (nx, ny) = self.position.normalized();
        let x = (nx * self.canvas_w as f64).clamp(panel / 2.0, self.canvas_w as f64 - panel / 2.0);
        let y = (ny * self.canvas_h as f64).clamp(panel / 2.0, self.canvas_h as f64 - panel / 2.0);
        (x, y)
    }
}

/// `(lat, lon)` bounding box over `path`, padded 15% on each side (§4.5.5).
fn padded_bounds(path: &GpsPath) -> Option<(f64, f64, f64, f64)> {
    if path.is_empty() {
        return None;
    }
    let (mut min_lat, mut max_lat) = (f64::MAX, f64::MIN);
    let (mut min_lon, mut max_lon) = (f64::MAX, f64::MIN);
    for point in path {
        min_lat = min_lat.min(point.lat);
        max_lat = max_lat.max(point.lat);
        min_lon = min_lon.min(point.lon);
        max_lon = max_lon.max(point.lon);
    }
    let lat_pad = (max_lat - min_lat).max(1e-6) * 0.15;
    let lon_pad = (max_lon - min_lon).max(1e-6) * 0.15;
    Some((
        min_lat - lat_pad,
        max_lat + lat_pad,
        min_lon - lon_pad,
        max_lon + lon_pad,
    ))
}

fn project(lat: f64, lon: f64, bounds: (f64, f64, f64, f64), panel: f64) -> (f64, f64) {
    let (min_lat, max_lat, min_lon, max_lon) = bounds;
    let lat_span = (max_lat - min_lat).max(1e-9);
    let lon_span = (max_lon - min_lon).max(1e-9);
    let x = ((lon - min_lon) / lon_span) * panel - panel / 2.0;
    // Latitude increases northward; canvas y increases downward.
    let y = (1.0 - (lat - min_lat) / lat_span) * panel - panel / 2.0;
    (x, y)
}

/// Quantize heading to the nearest 5 degrees for event-minimization purposes (§4.5.5).
fn quantize_heading(heading_deg: f64) -> i64 {
    ((heading_deg / 5.0).round() as i64).rem_euclid(72)
}

/// Quantize the marker's projected screen position to the nearest pixel, so a new event is
/// emitted whenever the drawn marker would actually move (§4.5.5: one event per quantized
/// (position, heading) state change).
fn quantize_position(x: f64, y: f64) -> (i64, i64) {
    (x.round() as i64, y.round() as i64)
}

/// Compile the GPS polyline + heading marker into a minimap overlay document.
pub fn compile_minimap(path: &GpsPath, duration_ms: u64, options: &MinimapOptions) -> AssDocument {
    let panel = options.panel_dimensions();
    let mut doc = AssDocument::new(options.canvas_w, options.canvas_h).with_style(
        Style::new("Minimap")
            .with_color(if options.dark_mode {
                "&H00FFFFFF"
            } else {
                "&H00202020"
            }),
    );

    let Some(bounds) = padded_bounds(path) else {
        return doc;
    };
    let (anchor_x, anchor_y) = options.anchor_px(panel);

    let route_line = route_path(path, bounds, panel);
    if !route_line.is_empty() {
        doc.push_event(Event {
            start_ms: 0,
            end_ms: duration_ms,
            style: "Minimap".to_string(),
            text: format!(
                "{{\\an5\\pos({:.0},{:.0})\\1c&H00A0FF&\\bord2\\shad0\\p1}}{}{{\\p0}}",
                anchor_x, anchor_y, route_line
            ),
        });
    }

    let mut last_state: Option<(i64, (i64, i64))> = None;
    for (idx, point) in path.iter().enumerate() {
        let heading_deg = heading_between(path, point.timestamp_ms).unwrap_or(0.0);
        let (x, y) = project(point.lat, point.lon, bounds, panel);
        let state = (quantize_heading(heading_deg), quantize_position(x, y));
        if last_state == Some(state) {
            continue;
        }
        if last_state.is_some() {
            if let Some(last_event) = doc.events.last_mut() {
                if last_event.style == "Heading" {
                    last_event.end_ms = point.timestamp_ms.max(0) as u64;
                }
            }
        }
        last_state = Some(state);

        // The very first heading event always starts at 0, not at the first point's own
        // timestamp, so the event union covers [0, duration_ms) with no gap (§4.5.5).
        let start_ms = if idx == 0 { 0 } else { point.timestamp_ms.max(0) as u64 };
        doc.push_event(Event {
            start_ms,
            end_ms: duration_ms,
            style: "Heading".to_string(),
            text: format!(
                "{{\\an5\\pos({:.0},{:.0})\\1c&H00FFFF&\\p1}}{}{{\\p0}}",
                anchor_x + x,
                anchor_y + y,
                heading_arrow_path(panel * 0.06, heading_deg)
            ),
        });
    }

    doc
}

fn route_path(path: &GpsPath, bounds: (f64, f64, f64, f64), panel: f64) -> String {
    use std::fmt::Write as _;
    let mut out = String::new();
    for (i, point) in path.iter().enumerate() {
        let (x, y) = project(point.lat, point.lon, bounds, panel);
        let cmd = if i == 0 { "m" } else { "l" };
        write!(out, "{cmd} {:.1} {:.1} ", x, y).unwrap();
    }
    out
}

/// Bearing from the previous point to the point at `at_ms`, degrees clockwise from north.
fn heading_between(path: &GpsPath, at_ms: i64) -> Option<f64> {
    let idx = path.iter().position(|p| p.timestamp_ms == at_ms)?;
    let prev = path.get(idx.checked_sub(1)?)?;
    let current = &path[idx];
    let (lat1, lon1) = (prev.lat.to_radians(), prev.lon.to_radians());
    let (lat2, lon2) = (current.lat.to_radians(), current.lon.to_radians());
    let dlon = lon2 - lon1;
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    Some(y.atan2(x).to_degrees().rem_euclid(360.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use td_models::GpsPoint;

    fn options() -> MinimapOptions {
        MinimapOptions {
            size: DashboardSize::Medium,
            position: PositionPreset::TopRight,
            dark_mode: false,
            canvas_w: 1920,
            canvas_h: 1080,
        }
    }

    #[test]
    fn empty_path_yields_no_events() {
        let doc = compile_minimap(&vec![], 1000, &options());
        assert!(doc.events.is_empty());
    }

    #[test]
    fn route_and_heading_events_emitted_for_a_path() {
        let path: GpsPath = vec![
            GpsPoint { lat: 37.0, lon: -122.0, timestamp_ms: 0 },
            GpsPoint { lat: 37.001, lon: -122.0, timestamp_ms: 1000 },
        ];
        let doc = compile_minimap(&path, 2000, &options());
        assert!(doc.events.iter().any(|e| e.style == "Minimap"));
        assert!(doc.events.iter().any(|e| e.style == "Heading"));
    }

    #[test]
    fn first_heading_event_starts_at_zero_even_when_first_point_does_not() {
        let path: GpsPath = vec![
            GpsPoint { lat: 37.0, lon: -122.0, timestamp_ms: 500 },
            GpsPoint { lat: 37.001, lon: -122.0, timestamp_ms: 1500 },
        ];
        let doc = compile_minimap(&path, 2000, &options());
        let first_heading = doc.events.iter().find(|e| e.style == "Heading").unwrap();
        assert_eq!(first_heading.start_ms, 0);
    }

    #[test]
    fn heading_event_re_emitted_when_position_advances_even_if_heading_unchanged() {
        // Three colinear points: same bearing throughout, but the marker moves each step.
        let path: GpsPath = vec![
            GpsPoint { lat: 37.000, lon: -122.000, timestamp_ms: 0 },
            GpsPoint { lat: 37.001, lon: -122.000, timestamp_ms: 1000 },
            GpsPoint { lat: 37.002, lon: -122.000, timestamp_ms: 2000 },
        ];
        let doc = compile_minimap(&path, 3000, &options());
        let heading_events: Vec<_> = doc.events.iter().filter(|e| e.style == "Heading").collect();
        assert_eq!(heading_events.len(), 3);
    }
}
