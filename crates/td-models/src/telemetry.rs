//! Per-frame telemetry sample decoded from SEI metadata.

use serde::{Deserialize, Serialize};

/// Selected gear, as reported by the vehicle's gear-state SEI field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gear {
    Park,
    Drive,
    Reverse,
    Neutral,
    #[default]
    Unknown,
}

/// Autopilot engagement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Autopilot {
    #[default]
    Manual,
    SelfDriving,
    Autosteer,
    Tacc,
}

/// One decoded telemetry sample, timestamped in collection-relative milliseconds.
///
/// Samples are sparse and non-uniform; consumers locate samples by nearest-neighbor on
/// `timestamp_ms` (see `td_telemetry::nearest`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub timestamp_ms: i64,
    pub speed_mps: f32,
    pub gear: Gear,
    pub autopilot: Autopilot,
    pub blinker_left: bool,
    pub blinker_right: bool,
    pub brake: bool,
    pub accelerator_pct: f32,
    pub steering_angle_deg: f32,
    pub latitude_deg: Option<f64>,
    pub longitude_deg: Option<f64>,
    pub heading_deg: Option<f64>,
}

impl TelemetrySample {
    pub fn speed_mph(&self) -> f32 {
        self.speed_mps * 2.236_936
    }

    pub fn speed_kmh(&self) -> f32 {
        self.speed_mps * 3.6
    }
}
