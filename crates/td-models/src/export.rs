//! Export request — the exhaustive, tagged-record option set for one export (§3).

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::collection::DayCollection;
use crate::overlay::BlurZone;

/// Per-tile resolution quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Mobile,
    Medium,
    High,
    Max,
}

/// Dashboard content density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardStyle {
    Standard,
    Compact,
}

/// Dashboard / minimap panel size tier (shared between the two overlays, §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardSize {
    Small,
    Medium,
    Large,
    Xlarge,
}

/// How the minimap is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimapRenderMode {
    /// ASS vector drawing of the route (in scope here).
    Vector,
    /// Rasterized external map tiles, produced by a caller-supplied collaborator (§4.5.5: out of
    /// scope for this engine beyond accepting the mode).
    TileImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampDateFormat {
    Mdy,
    Dmy,
    Ymd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampTimeFormat {
    H12,
    H24,
}

/// Anchor position for an overlay panel, in the final canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionPreset {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    /// Explicit normalized `(x, y)` anchor, `[0, 1]` on both axes.
    Custom(f64, f64),
}

impl PositionPreset {
    /// Resolve to a normalized `(x, y)` anchor within the canvas.
    pub fn normalized(&self) -> (f64, f64) {
        match self {
            PositionPreset::TopLeft => (0.02, 0.02),
            PositionPreset::TopRight => (0.98, 0.02),
            PositionPreset::BottomLeft => (0.02, 0.98),
            PositionPreset::BottomRight => (0.98, 0.98),
            PositionPreset::Custom(x, y) => (*x, *y),
        }
    }
}

/// One of the accepted timelapse multipliers (§3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelapseSpeed(f64);

impl TimelapseSpeed {
    pub const ALLOWED: &'static [f64] = &[0.5, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0];

    pub fn new(speed: f64) -> Option<Self> {
        Self::ALLOWED
            .iter()
            .any(|allowed| (allowed - speed).abs() < f64::EPSILON)
            .then_some(Self(speed))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for TimelapseSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Explicit tile layout overriding the default grid derived from camera count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutData {
    pub cols: u32,
    pub rows: u32,
    /// Placement order of cameras into the `cols x rows` grid, row-major.
    pub order: Vec<Camera>,
}

/// The full, exhaustive set of export options (§3). Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    pub collection: DayCollection,
    pub start_ms: i64,
    pub end_ms: i64,
    pub cameras: BTreeSet<Camera>,
    pub layout_data: Option<LayoutData>,
    pub quality: Quality,
    pub output_path: PathBuf,
    pub mirror_cameras: bool,
    pub use_metric: bool,
    pub language: String,

    pub include_dashboard: bool,
    pub dashboard_style: DashboardStyle,
    pub dashboard_position: PositionPreset,
    pub dashboard_size: DashboardSize,

    pub include_minimap: bool,
    pub minimap_position: PositionPreset,
    pub minimap_size: DashboardSize,
    pub minimap_render_mode: MinimapRenderMode,
    pub minimap_dark_mode: bool,

    pub include_timestamp: bool,
    pub timestamp_position: PositionPreset,
    pub timestamp_date_format: TimestampDateFormat,
    pub timestamp_time_format: TimestampTimeFormat,

    pub blur_zones: Vec<BlurZone>,

    pub enable_timelapse: bool,
    pub timelapse_speed: TimelapseSpeed,
}

impl ExportRequest {
    /// Builder entry point with the spec's defaults for everything but the required fields.
    pub fn new(
        collection: DayCollection,
        start_ms: i64,
        end_ms: i64,
        cameras: BTreeSet<Camera>,
        output_path: PathBuf,
    ) -> Self {
        Self {
            collection,
            start_ms,
            end_ms,
            cameras,
            layout_data: None,
            quality: Quality::Medium,
            output_path,
            mirror_cameras: false,
            use_metric: false,
            language: "en".to_string(),
            include_dashboard: false,
            dashboard_style: DashboardStyle::Compact,
            dashboard_position: PositionPreset::BottomLeft,
            dashboard_size: DashboardSize::Medium,
            include_minimap: false,
            minimap_position: PositionPreset::TopRight,
            minimap_size: DashboardSize::Medium,
            minimap_render_mode: MinimapRenderMode::Vector,
            minimap_dark_mode: false,
            include_timestamp: false,
            timestamp_position: PositionPreset::TopLeft,
            timestamp_date_format: TimestampDateFormat::Ymd,
            timestamp_time_format: TimestampTimeFormat::H24,
            blur_zones: Vec::new(),
            enable_timelapse: false,
            timelapse_speed: TimelapseSpeed::default(),
        }
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_dashboard(mut self, style: DashboardStyle, size: DashboardSize) -> Self {
        self.include_dashboard = true;
        self.dashboard_style = style;
        self.dashboard_size = size;
        // Dashboard already contains a timestamp; mutually exclusive with the bare caption (§3).
        self.include_timestamp = false;
        self
    }

    pub fn with_minimap(mut self, mode: MinimapRenderMode) -> Self {
        self.include_minimap = true;
        self.minimap_render_mode = mode;
        self
    }

    pub fn with_timestamp_caption(mut self) -> Self {
        if !self.include_dashboard {
            self.include_timestamp = true;
        }
        self
    }

    pub fn with_blur_zones(mut self, zones: Vec<BlurZone>) -> Self {
        self.blur_zones = zones;
        self
    }

    pub fn with_timelapse(mut self, speed: TimelapseSpeed) -> Self {
        self.enable_timelapse = true;
        self.timelapse_speed = speed;
        self
    }
}
