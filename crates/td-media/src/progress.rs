//! Parses FFmpeg's `-progress pipe:2` textual output (§4.5.8).

/// One parsed snapshot of FFmpeg's progress output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FfmpegProgress {
    pub frame: u64,
    pub fps: f64,
    pub out_time_ms: i64,
    pub speed: f64,
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// `processedMs / (endMs - startMs)`, clamped to `[0, 100]` (§4.5.8).
    pub fn percentage(&self, start_ms: i64, end_ms: i64) -> f32 {
        let span = (end_ms - start_ms).max(1);
        ((self.out_time_ms as f64 / span as f64) * 100.0).clamp(0.0, 100.0) as f32
    }
}

/// Feed one line of FFmpeg's `-progress` output into `current`, mutating it. Returns a snapshot
/// when the line completes a reporting block (`progress=continue` or `progress=end`).
pub fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> Option<FfmpegProgress> {
    let line = line.trim();
    let (key, value) = line.split_once('=')?;

    match key {
        "out_time_us" => {
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_ms = us / 1000;
            }
        }
        "out_time_ms" => {
            if let Ok(ms) = value.parse::<i64>() {
                current.out_time_ms = ms;
            }
        }
        "frame" => {
            if let Ok(frame) = value.parse() {
                current.frame = frame;
            }
        }
        "fps" => {
            if let Ok(fps) = value.parse() {
                current.fps = fps;
            }
        }
        "speed" => {
            if let Some(stripped) = value.strip_suffix('x') {
                if let Ok(speed) = stripped.parse() {
                    current.speed = speed;
                }
            }
        }
        "progress" => {
            current.is_complete = value == "end";
            return Some(current.clone());
        }
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_clamps_to_100() {
        let progress = FfmpegProgress {
            out_time_ms: 20_000,
            ..Default::default()
        };
        assert_eq!(progress.percentage(0, 10_000), 100.0);
    }

    #[test]
    fn percentage_midpoint() {
        let progress = FfmpegProgress {
            out_time_ms: 5_000,
            ..Default::default()
        };
        assert_eq!(progress.percentage(0, 10_000), 50.0);
    }

    #[test]
    fn progress_end_emits_complete_snapshot() {
        let mut current = FfmpegProgress::default();
        parse_progress_line("out_time_ms=3000", &mut current);
        let snapshot = parse_progress_line("progress=end", &mut current).unwrap();
        assert!(snapshot.is_complete);
        assert_eq!(snapshot.out_time_ms, 3000);
    }
}
