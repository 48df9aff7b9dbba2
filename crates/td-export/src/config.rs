//! Engine-wide tunables, loaded from the environment with compiled-in defaults (§5, §1.3).

use std::time::Duration;

/// Configuration for the planner and supervisor, following the teacher's
/// `WorkerConfig::from_env()` pattern.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Override for the discovered `ffmpeg` binary; bypasses [`td_media::discovery`].
    pub ffmpeg_path_override: Option<String>,
    /// Batch size for the Library Indexer's cooperative scan (§5).
    pub indexer_batch_size: usize,
    /// Timeout for an `ffmpeg -encoders`/help-style query (§5 floor: 2s).
    pub probe_help_timeout: Duration,
    /// Timeout for one encoder-probe test encode (§5 floor: 5s).
    pub probe_encode_timeout: Duration,
    /// Timeout for the GPU-name shell-out (§5 floor: 5s).
    pub probe_gpu_name_timeout: Duration,
    /// Nominal duration of one dashcam segment, used when a group has no authoritative duration.
    pub default_segment_duration_ms: i64,
    /// Bounded interval the supervisor waits after a graceful termination signal before
    /// force-killing the child (§4.6).
    pub graceful_termination_grace: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path_override: None,
            indexer_batch_size: 500,
            probe_help_timeout: Duration::from_secs(2),
            probe_encode_timeout: Duration::from_secs(5),
            probe_gpu_name_timeout: Duration::from_secs(5),
            default_segment_duration_ms: td_models::NOMINAL_SEGMENT_DURATION_MS,
            graceful_termination_grace: Duration::from_secs(5),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ffmpeg_path_override: std::env::var("TD_FFMPEG_PATH").ok(),
            indexer_batch_size: std::env::var("TD_INDEXER_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.indexer_batch_size),
            probe_help_timeout: Duration::from_secs(
                std::env::var("TD_PROBE_HELP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.probe_help_timeout.as_secs()),
            ),
            probe_encode_timeout: Duration::from_secs(
                std::env::var("TD_PROBE_ENCODE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.probe_encode_timeout.as_secs()),
            ),
            probe_gpu_name_timeout: Duration::from_secs(
                std::env::var("TD_PROBE_GPU_NAME_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.probe_gpu_name_timeout.as_secs()),
            ),
            default_segment_duration_ms: std::env::var("TD_DEFAULT_SEGMENT_DURATION_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_segment_duration_ms),
            graceful_termination_grace: Duration::from_secs(
                std::env::var("TD_GRACEFUL_TERMINATION_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.graceful_termination_grace.as_secs()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_floor_values() {
        let config = EngineConfig::default();
        assert_eq!(config.indexer_batch_size, 500);
        assert_eq!(config.probe_help_timeout, Duration::from_secs(2));
        assert_eq!(config.probe_encode_timeout, Duration::from_secs(5));
    }
}
