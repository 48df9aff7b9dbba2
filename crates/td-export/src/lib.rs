//! Export Planner and Process Supervisor (§4.5, §4.6): turns an [`td_models::ExportRequest`]
//! into an FFmpeg invocation, compiles overlay sidecars once telemetry is available, and drives
//! the job through its state machine while multiplexing progress events.

mod config;
mod encoder_select;
mod error;
mod planner;
mod resolution;
mod supervisor;

pub use config::EngineConfig;
pub use encoder_select::{select_encoder, target_bitrate_kbps, EncoderChoice};
pub use error::{PlannerError, PlannerResult, SupervisorError, SupervisorResult};
pub use planner::{plan_export, ExportPlan};
pub use resolution::{canvas_size, default_grid, is_front_only, tile_dimensions};
pub use supervisor::ProcessSupervisor;
