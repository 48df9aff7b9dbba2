//! Determines once per process which hardware video encoders actually work (§4.4).

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use td_models::{CodecCapability, EncoderCapability};
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Timeout floors for the three shell-outs the probe makes (§5). Mirrors the relevant fields of
/// `td_export::EngineConfig`; kept as a standalone struct here so `td-media` doesn't need to
/// depend on `td-export` for it.
#[derive(Debug, Clone, Copy)]
pub struct ProbeTimeouts {
    pub help: Duration,
    pub encode: Duration,
    pub gpu_name: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            help: Duration::from_secs(2),
            encode: Duration::from_secs(5),
            gpu_name: Duration::from_secs(5),
        }
    }
}

/// Textual markers that indicate a hardware encoder is present but non-functional. Strict:
/// only a clean zero exit with none of these present counts as a pass (§4.4 step 3).
const FAILURE_MARKERS: &[&str] = &[
    "No such device",
    "No capable devices found",
    "Device creation failed",
    "Task finished with error",
    "Cannot load",
    "Error initializing output stream",
];

fn h264_candidates() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        &["h264_videotoolbox"]
    } else if cfg!(target_os = "windows") {
        &["h264_nvenc", "h264_amf", "h264_qsv"]
    } else {
        &["h264_nvenc", "h264_qsv"]
    }
}

fn hevc_candidates() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        &["hevc_videotoolbox"]
    } else if cfg!(target_os = "windows") {
        &["hevc_nvenc", "hevc_amf", "hevc_qsv"]
    } else {
        &["hevc_nvenc", "hevc_qsv"]
    }
}

static CACHE: OnceCell<EncoderCapability> = OnceCell::const_new();

/// Probe `ffmpeg_path` for usable hardware encoders, caching the result for the process
/// lifetime (§3 `EncoderCapability` lifecycle). Every shell-out is bounded by `timeouts` so a
/// hung or misbehaving `ffmpeg` can't block probing indefinitely (§5).
pub async fn probe(ffmpeg_path: &Path, timeouts: ProbeTimeouts) -> EncoderCapability {
    CACHE
        .get_or_init(|| async { run_probe(ffmpeg_path, timeouts).await })
        .await
        .clone()
}

async fn run_probe(ffmpeg_path: &Path, timeouts: ProbeTimeouts) -> EncoderCapability {
    let listed = list_encoders(ffmpeg_path, timeouts.help).await.unwrap_or_default();

    let h264 = find_working_encoder(ffmpeg_path, &listed, h264_candidates(), 320, 240, timeouts.encode).await;
    let hevc = find_working_encoder(ffmpeg_path, &listed, hevc_candidates(), 640, 480, timeouts.encode).await;
    let gpu_name = detect_gpu_name(timeouts.gpu_name).await;

    EncoderCapability {
        ffmpeg_path: ffmpeg_path.to_path_buf(),
        h264,
        hevc,
        gpu_name,
    }
}

async fn list_encoders(ffmpeg_path: &Path, timeout: Duration) -> std::io::Result<Vec<String>> {
    let output = tokio::time::timeout(
        timeout,
        Command::new(ffmpeg_path)
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output(),
    )
    .await
    .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "ffmpeg -encoders timed out"))??;
    let text = String::from_utf8_lossy(&output.stdout);
    Ok(text
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1).map(str::to_string))
        .collect())
}

async fn find_working_encoder(
    ffmpeg_path: &Path,
    listed: &[String],
    candidates: &[&str],
    width: u32,
    height: u32,
    timeout: Duration,
) -> Option<CodecCapability> {
    for candidate in candidates {
        if !listed.iter().any(|id| id == candidate) {
            continue;
        }
        if test_encode(ffmpeg_path, candidate, width, height, timeout).await {
            return Some(CodecCapability {
                codec_id: candidate.to_string(),
                vendor_name: None,
                max_width: width,
                max_height: height,
            });
        }
    }
    None
}

/// Attempt a single-frame encode of a synthesized test pattern to the null muxer.
async fn test_encode(ffmpeg_path: &Path, codec_id: &str, width: u32, height: u32, timeout: Duration) -> bool {
    let source = format!("color=c=black:s={width}x{height}:d=0.1");
    let output = tokio::time::timeout(
        timeout,
        Command::new(ffmpeg_path)
            .args([
                "-hide_banner",
                "-v",
                "error",
                "-f",
                "lavfi",
                "-i",
                &source,
                "-frames:v",
                "1",
                "-c:v",
                codec_id,
                "-f",
                "null",
                "-",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output(),
    )
    .await;

    let output = match output {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            warn!(codec_id, error = %err, "failed to spawn ffmpeg for encoder test");
            return false;
        }
        Err(_) => {
            warn!(codec_id, "encoder test timed out");
            return false;
        }
    };

    if !output.status.success() {
        debug!(codec_id, "encoder test exited non-zero");
        return false;
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if FAILURE_MARKERS.iter().any(|marker| stderr.contains(marker)) {
        debug!(codec_id, "encoder test reported a failure marker despite zero exit");
        return false;
    }

    true
}

/// Best-effort GPU name for diagnostics; never blocks encoder selection on failure (§4.4).
async fn detect_gpu_name(timeout: Duration) -> Option<String> {
    let (program, args): (&str, &[&str]) = if cfg!(target_os = "windows") {
        ("wmic", &["path", "win32_VideoController", "get", "name"])
    } else if cfg!(target_os = "macos") {
        ("system_profiler", &["SPDisplaysDataType"])
    } else {
        ("lspci", &["-v"])
    };

    let output = tokio::time::timeout(
        timeout,
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output(),
    )
    .await
    .ok()?
    .ok()?;

    let text = String::from_utf8_lossy(&output.stdout);
    extract_gpu_line(&text)
}

fn extract_gpu_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| {
            !line.is_empty()
                && !line.eq_ignore_ascii_case("name")
                && (line.contains("VGA")
                    || line.contains("3D controller")
                    || line.contains("Chipset Model")
                    || cfg!(target_os = "windows"))
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_order_matches_platform_expectations() {
        // Every platform list is non-empty and starts with an nvenc/videotoolbox entry as
        // appropriate (§4.4 step 2).
        assert!(!h264_candidates().is_empty());
        assert!(!hevc_candidates().is_empty());
    }

    #[test]
    fn extracts_lspci_vga_line() {
        let text = "00:02.0 VGA compatible controller: Intel Corporation UHD Graphics\n00:00.0 Host bridge: Intel";
        assert!(extract_gpu_line(text).unwrap().contains("VGA"));
    }
}
