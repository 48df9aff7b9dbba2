//! Shared data models for the Tesla dashcam post-processing engine.
//!
//! This crate provides `serde`-serializable types for:
//! - Clip files, groups, and day-level collections (library index)
//! - Telemetry samples and GPS paths
//! - Export request options and job state
//! - Progress event / error taxonomy shared across the engine
//!
//! No I/O happens here; every type is a plain data holder.

pub mod camera;
pub mod clip;
pub mod collection;
pub mod error;
pub mod export;
pub mod gps;
pub mod job;
pub mod overlay;
pub mod progress;
pub mod telemetry;

pub use camera::Camera;
pub use clip::{ClipFile, ClipGroup, ClipType, EventMeta, FileDescriptor, FileIdentity};
pub use collection::{DayCollection, LibraryIndex, NOMINAL_SEGMENT_DURATION_MS};
pub use error::ErrorKind;
pub use export::{
    DashboardSize, DashboardStyle, ExportRequest, LayoutData, MinimapRenderMode, PositionPreset,
    Quality, TimelapseSpeed, TimestampDateFormat, TimestampTimeFormat,
};
pub use gps::{is_valid_gps, GpsPath, GpsPoint};
pub use job::{EncoderCapability, ExportJob, JobId, JobState};
pub use overlay::{BlurZone, Point2};
pub use progress::{Message, ProgressEvent, ProgressKind};
pub use telemetry::{Autopilot, Gear, TelemetrySample};
