//! Compiles telemetry into an ASS dashboard overlay (§4.5.5).

use td_models::{Autopilot, DashboardSize, DashboardStyle, Gear, PositionPreset, TelemetrySample};

use crate::ass::{AssDocument, Event, Style};
use crate::shapes::{blinker_arrow_path, pedal_path, rounded_panel_path, steering_wheel_path};
use crate::translate::{Label, Translator};

/// Blinkers alternate visible/hidden on a 0.8s cycle — 400ms per half (§4.5.5).
const BLINK_HALF_CYCLE_MS: u64 = 400;
const DASHBOARD_FPS: f64 = 36.0;

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub style: DashboardStyle,
    pub size: DashboardSize,
    pub position: PositionPreset,
    pub use_metric: bool,
    pub language: String,
    pub canvas_w: u32,
    pub canvas_h: u32,
}

impl DashboardOptions {
    fn panel_dimensions(&self) -> (f64, f64) {
        let scale = match self.size {
            DashboardSize::Small => 0.18,
            DashboardSize::Medium => 0.24,
            DashboardSize::Large => 0.32,
            DashboardSize::Xlarge => 0.4,
        };
        let width = self.canvas_w as f64 * scale;
        let height = width * 0.45;
        (width, height)
    }

    fn anchor_px(&self, panel_w: f64, panel_h: f64) -> (f64, f64) {
        let (nx, ny) = self.position.normalized();
        let x = (nx * self.canvas_w as f64).clamp(panel_w / 2.0, self.canvas_w as f64 - panel_w / 2.0);
        let y = (ny * self.canvas_h as f64).clamp(panel_h / 2.0, self.canvas_h as f64 - panel_h / 2.0);
        (x, y)
    }
}

/// The subset of telemetry that drives dashboard *state* (event minimization, §4.5.5); blinker
/// visibility is handled separately as an independent animation layered on top of state runs.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DashboardState {
    speed_int: i64,
    gear: Gear,
    autopilot: Autopilot,
    brake: bool,
    accel_decile: i64,
    steering_decile: i64,
    blinker_left: bool,
    blinker_right: bool,
}

impl DashboardState {
    fn from_sample(sample: &TelemetrySample, use_metric: bool) -> Self {
        let speed = if use_metric {
            sample.speed_kmh()
        } else {
            sample.speed_mph()
        };
        Self {
            speed_int: speed.round() as i64,
            gear: sample.gear,
            autopilot: sample.autopilot,
            brake: sample.brake,
            accel_decile: (sample.accelerator_pct / 10.0).round() as i64,
            steering_decile: (sample.steering_angle_deg / 5.0).round() as i64,
            blinker_left: sample.blinker_left,
            blinker_right: sample.blinker_right,
        }
    }
}

struct StateRun {
    start_ms: u64,
    end_ms: u64,
    sample: TelemetrySample,
    state: DashboardState,
}

fn state_runs(samples: &[TelemetrySample], duration_ms: u64, use_metric: bool) -> Vec<StateRun> {
    let mut runs: Vec<StateRun> = Vec::new();
    for sample in samples {
        let state = DashboardState::from_sample(sample, use_metric);
        // The very first run always starts at 0, not at the first sample's own timestamp, so the
        // event union covers [0, duration_ms) with no gap (§4.5.5).
        let start_ms = if runs.is_empty() { 0 } else { sample.timestamp_ms.max(0) as u64 };
        if let Some(last) = runs.last_mut() {
            if last.state == state {
                continue;
            }
            last.end_ms = start_ms;
        }
        runs.push(StateRun {
            start_ms,
            end_ms: duration_ms,
            sample: *sample,
            state,
        });
    }
    runs.retain(|run| run.end_ms > run.start_ms);
    runs
}

/// `true` iff the blinker half-cycle starting at `ms` is the "visible" half.
fn blink_visible_at(ms: u64) -> bool {
    (ms / BLINK_HALF_CYCLE_MS) % 2 == 0
}

/// Split `[start_ms, end_ms)` into alternating visible/hidden blink sub-intervals, frame-aligned
/// to [`DASHBOARD_FPS`].
fn blink_intervals(start_ms: u64, end_ms: u64) -> Vec<(u64, u64, bool)> {
    let frame_ms = 1000.0 / DASHBOARD_FPS;
    let mut intervals = Vec::new();
    let mut cursor = start_ms;
    while cursor < end_ms {
        let cycle_index = cursor / BLINK_HALF_CYCLE_MS;
        let next_boundary = ((cycle_index + 1) * BLINK_HALF_CYCLE_MS).min(end_ms);
        let aligned_boundary = ((next_boundary as f64 / frame_ms).round() * frame_ms) as u64;
        let boundary = aligned_boundary.clamp(cursor + 1, end_ms);
        intervals.push((cursor, boundary, blink_visible_at(cursor)));
        cursor = boundary;
    }
    intervals
}

fn format_clock(sample: &TelemetrySample) -> String {
    format!("{:+05}ms", sample.timestamp_ms)
}

fn render_event_text(
    state: &DashboardState,
    sample: &TelemetrySample,
    options: &DashboardOptions,
    translator: &dyn Translator,
    panel_w: f64,
    panel_h: f64,
    show_left_blinker: bool,
    show_right_blinker: bool,
) -> String {
    let mut text = String::new();
    text.push_str(&format!(
        "{{\\an5\\pos(0,0)\\1c&H2B2B2B&\\bord0\\shad0\\p1}}{}{{\\p0}}",
        rounded_panel_path(panel_w, panel_h, panel_h * 0.15)
    ));

    if state.brake {
        text.push_str(&format!(
            "{{\\1c&H0000FF&\\p1}}{}{{\\p0}}",
            pedal_path(panel_h * 0.22)
        ));
    }
    if state.accel_decile > 0 {
        text.push_str(&format!(
            "{{\\1c&HFFA500&\\p1}}{}{{\\p0}}",
            pedal_path(panel_h * 0.22)
        ));
    }

    if show_left_blinker {
        text.push_str(&format!(
            "{{\\1c&H00FF00&\\p1}}{}{{\\p0}}",
            blinker_arrow_path(panel_h * 0.12, true)
        ));
    }
    if show_right_blinker {
        text.push_str(&format!(
            "{{\\1c&H00FF00&\\p1}}{}{{\\p0}}",
            blinker_arrow_path(panel_h * 0.12, false)
        ));
    }

    text.push_str(&format!(
        "{{\\1c&H0080FF&\\p1}}{}{{\\p0}}",
        steering_wheel_path(panel_h * 0.3, state.steering_decile as f64 * 5.0)
    ));

    let unit_label = translator.translate(
        if options.use_metric {
            Label::UnitKmh
        } else {
            Label::UnitMph
        },
        &options.language,
    );
    let gear_label = translator.translate(Label::Gear(state.gear), &options.language);
    let autopilot_label = translator.translate(Label::Autopilot(state.autopilot), &options.language);

    text.push_str(&format!(
        "{{\\an5\\fs28\\1c&HFFFFFF&}}{} {}\\N{} / {}\\N{}",
        state.speed_int,
        unit_label,
        gear_label,
        autopilot_label,
        format_clock(sample)
    ));

    text
}

/// Compile a full dashboard overlay document from a telemetry series.
pub fn compile_dashboard(
    samples: &[TelemetrySample],
    duration_ms: u64,
    options: &DashboardOptions,
    translator: &dyn Translator,
) -> AssDocument {
    let mut doc = AssDocument::new(options.canvas_w, options.canvas_h)
        .with_style(Style::new("Dashboard").with_font_size(28));

    if samples.is_empty() {
        return doc;
    }

    let (panel_w, panel_h) = options.panel_dimensions();
    let (anchor_x, anchor_y) = options.anchor_px(panel_w, panel_h);

    for run in state_runs(samples, duration_ms, options.use_metric) {
        let left_intervals = if run.state.blinker_left {
            blink_intervals(run.start_ms, run.end_ms)
        } else {
            vec![(run.start_ms, run.end_ms, false)]
        };
        let right_intervals = if run.state.blinker_right {
            blink_intervals(run.start_ms, run.end_ms)
        } else {
            vec![(run.start_ms, run.end_ms, false)]
        };

        // When neither blinker is active this collapses to a single interval spanning the run.
        let boundaries = merge_boundaries(&left_intervals, &right_intervals);
        for (start, end) in boundaries {
            let show_left = run.state.blinker_left && blink_visible_at(start);
            let show_right = run.state.blinker_right && blink_visible_at(start);
            let text = render_event_text(
                &run.state,
                &run.sample,
                options,
                translator,
                panel_w,
                panel_h,
                show_left,
                show_right,
            );
            doc.push_event(Event {
                start_ms: start,
                end_ms: end,
                style: "Dashboard".to_string(),
                text: format!("{{\\pos({:.0},{:.0})}}{}", anchor_x, anchor_y, text),
            });
        }
    }

    doc
}

fn merge_boundaries(a: &[(u64, u64, bool)], b: &[(u64, u64, bool)]) -> Vec<(u64, u64)> {
    let mut cut_points: Vec<u64> = a
        .iter()
        .flat_map(|(s, e, _)| [*s, *e])
        .chain(b.iter().flat_map(|(s, e, _)| [*s, *e]))
        .collect();
    cut_points.sort_unstable();
    cut_points.dedup();
    cut_points.windows(2).map(|w| (w[0], w[1])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::BuiltinTranslator;

    fn sample(timestamp_ms: i64, speed_mps: f32, blinker_left: bool) -> TelemetrySample {
        TelemetrySample {
            timestamp_ms,
            speed_mps,
            gear: Gear::Drive,
            autopilot: Autopilot::Manual,
            blinker_left,
            blinker_right: false,
            brake: false,
            accelerator_pct: 0.0,
            steering_angle_deg: 0.0,
            latitude_deg: None,
            longitude_deg: None,
            heading_deg: None,
        }
    }

    fn options() -> DashboardOptions {
        DashboardOptions {
            style: DashboardStyle::Compact,
            size: DashboardSize::Medium,
            position: PositionPreset::BottomLeft,
            use_metric: false,
            language: "en".to_string(),
            canvas_w: 1920,
            canvas_h: 1080,
        }
    }

    #[test]
    fn unchanged_state_yields_single_event() {
        let samples = vec![sample(0, 10.0, false), sample(1000, 10.0, false)];
        let doc = compile_dashboard(&samples, 5000, &options(), &BuiltinTranslator);
        assert_eq!(doc.events.len(), 1);
        assert_eq!(doc.events[0].end_ms, 5000);
    }

    #[test]
    fn blinker_produces_multiple_sub_events() {
        let samples = vec![sample(0, 10.0, true)];
        let doc = compile_dashboard(&samples, 2000, &options(), &BuiltinTranslator);
        assert!(doc.events.len() > 1);
    }

    #[test]
    fn speed_change_starts_a_new_run() {
        let samples = vec![sample(0, 10.0, false), sample(1000, 20.0, false)];
        let doc = compile_dashboard(&samples, 5000, &options(), &BuiltinTranslator);
        assert_eq!(doc.events.len(), 2);
        assert_eq!(doc.events[0].end_ms, 1000);
    }

    #[test]
    fn first_run_starts_at_zero_even_when_first_sample_does_not() {
        let samples = vec![sample(500, 10.0, false), sample(1500, 20.0, false)];
        let doc = compile_dashboard(&samples, 5000, &options(), &BuiltinTranslator);
        assert_eq!(doc.events[0].start_ms, 0);
    }
}
