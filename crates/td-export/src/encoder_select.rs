//! Encoder selection decision tree and bitrate derivation (§4.5.7).

use td_models::{EncoderCapability, Quality};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderChoice {
    /// Carries the actual `codec_id` the capability probe found working on this platform (e.g.
    /// `h264_videotoolbox` on macOS, `h264_nvenc`/`h264_amf`/`h264_qsv` elsewhere) rather than a
    /// hardcoded name, so `codec_arg` always reflects what `find_working_encoder` verified (§4.4).
    GpuH264(String),
    GpuHevc(String),
    Cpu,
}

impl EncoderChoice {
    pub fn codec_arg(&self) -> &str {
        match self {
            EncoderChoice::GpuH264(codec_id) => codec_id,
            EncoderChoice::GpuHevc(codec_id) => codec_id,
            EncoderChoice::Cpu => "libx264",
        }
    }
}

/// `true` iff `(w, h)` fits within the codec's measured limit (inclusive — "canvas exactly at
/// the max" is in-bounds, §8).
fn fits(canvas: (u32, u32), limit: (u32, u32)) -> bool {
    canvas.0 <= limit.0 && canvas.1 <= limit.1
}

/// Decision tree: GPU H.264 if it fits, else GPU HEVC if it fits, else CPU (§4.5.7).
pub fn select_encoder(canvas: (u32, u32), capability: &EncoderCapability) -> EncoderChoice {
    if let Some(h264) = &capability.h264 {
        if fits(canvas, (h264.max_width, h264.max_height)) {
            return EncoderChoice::GpuH264(h264.codec_id.clone());
        }
    }
    if let Some(hevc) = &capability.hevc {
        if fits(canvas, (hevc.max_width, hevc.max_height)) {
            return EncoderChoice::GpuHevc(hevc.codec_id.clone());
        }
    }
    EncoderChoice::Cpu
}

/// `true` iff hardware encoders exist but neither fits `canvas` — the planner's cue to downgrade
/// quality rather than silently truncating the frame (§7 `CanvasExceedsEncoderLimit`).
pub fn exceeds_all_hardware_limits(canvas: (u32, u32), capability: &EncoderCapability) -> bool {
    let h264_ok = capability
        .h264
        .as_ref()
        .is_some_and(|h264| fits(canvas, (h264.max_width, h264.max_height)));
    let hevc_ok = capability
        .hevc
        .as_ref()
        .is_some_and(|hevc| fits(canvas, (hevc.max_width, hevc.max_height)));
    !h264_ok && !hevc_ok && capability.has_hardware_encoder()
}

/// Deterministic target bitrate (kbps) for `canvas` at `quality`, derived from pixel count and a
/// per-tier bits-per-pixel-per-frame budget at the engine's nominal 36fps (§4.5.7).
pub fn target_bitrate_kbps(canvas: (u32, u32), quality: Quality) -> u64 {
    const NOMINAL_FPS: f64 = 36.0;
    let bits_per_pixel_per_frame = match quality {
        Quality::Mobile => 0.04,
        Quality::Medium => 0.07,
        Quality::High => 0.10,
        Quality::Max => 0.14,
    };
    let pixels = canvas.0 as f64 * canvas.1 as f64;
    ((pixels * bits_per_pixel_per_frame * NOMINAL_FPS) / 1000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use td_models::CodecCapability;

    fn capability(h264_limit: Option<(u32, u32)>, hevc_limit: Option<(u32, u32)>) -> EncoderCapability {
        EncoderCapability {
            ffmpeg_path: PathBuf::from("/usr/bin/ffmpeg"),
            h264: h264_limit.map(|(w, h)| CodecCapability {
                codec_id: "h264_videotoolbox".to_string(),
                vendor_name: None,
                max_width: w,
                max_height: h,
            }),
            hevc: hevc_limit.map(|(w, h)| CodecCapability {
                codec_id: "hevc_videotoolbox".to_string(),
                vendor_name: None,
                max_width: w,
                max_height: h,
            }),
            gpu_name: None,
        }
    }

    #[test]
    fn prefers_gpu_h264_when_it_fits() {
        let cap = capability(Some((4096, 4096)), Some((8192, 8192)));
        let choice = select_encoder((2172, 938), &cap);
        assert_eq!(choice, EncoderChoice::GpuH264("h264_videotoolbox".to_string()));
        assert_eq!(choice.codec_arg(), "h264_videotoolbox");
    }

    #[test]
    fn canvas_exactly_at_limit_uses_h264_not_hevc() {
        let cap = capability(Some((4096, 4096)), Some((8192, 8192)));
        assert_eq!(
            select_encoder((4096, 4096), &cap),
            EncoderChoice::GpuH264("h264_videotoolbox".to_string())
        );
    }

    #[test]
    fn falls_back_to_hevc_past_h264_limit() {
        let cap = capability(Some((4096, 4096)), Some((8192, 8192)));
        assert_eq!(
            select_encoder((4097, 4096), &cap),
            EncoderChoice::GpuHevc("hevc_videotoolbox".to_string())
        );
    }

    #[test]
    fn codec_arg_reflects_the_probed_codec_id_not_a_hardcoded_literal() {
        let cap = capability(Some((4096, 4096)), None);
        let mut probed = cap;
        probed.h264.as_mut().unwrap().codec_id = "h264_nvenc".to_string();
        let choice = select_encoder((1920, 1080), &probed);
        assert_eq!(choice.codec_arg(), "h264_nvenc");
    }

    #[test]
    fn falls_back_to_cpu_with_no_hardware() {
        let cap = capability(None, None);
        assert_eq!(select_encoder((1920, 1080), &cap), EncoderChoice::Cpu);
    }

    #[test]
    fn bitrate_is_deterministic_per_canvas_and_quality() {
        let a = target_bitrate_kbps((1920, 1080), Quality::High);
        let b = target_bitrate_kbps((1920, 1080), Quality::High);
        assert_eq!(a, b);
        assert!(target_bitrate_kbps((1920, 1080), Quality::Max) > a);
    }
}
