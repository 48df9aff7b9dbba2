//! Locates the `ffmpeg` / `ffprobe` binaries (§6): bundled location relative to the current
//! executable, then standard OS install locations, then `PATH`.

use std::path::{Path, PathBuf};

use crate::error::{MediaError, MediaResult};

#[cfg(unix)]
fn standard_locations(binary: &str) -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/local/bin").join(binary),
        PathBuf::from("/opt/homebrew/bin").join(binary),
        PathBuf::from("/usr/bin").join(binary),
    ]
}

#[cfg(windows)]
fn standard_locations(binary: &str) -> Vec<PathBuf> {
    vec![
        PathBuf::from(r"C:\Program Files\ffmpeg\bin").join(format!("{binary}.exe")),
        PathBuf::from(r"C:\ffmpeg\bin").join(format!("{binary}.exe")),
    ]
}

fn bundled_location(binary: &str) -> Option<PathBuf> {
    let exe_dir = std::env::current_exe().ok()?.parent()?.to_path_buf();
    let name = if cfg!(windows) {
        format!("{binary}.exe")
    } else {
        binary.to_string()
    };
    let candidate = exe_dir.join(name);
    candidate.is_file().then_some(candidate)
}

/// Ensure the binary at `path` is executable. No-op on Windows, where file-mode bits don't gate
/// execution.
#[cfg(unix)]
fn ensure_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = std::fs::metadata(path)?;
    let mut perms = metadata.permissions();
    if perms.mode() & 0o111 == 0 {
        perms.set_mode(perms.mode() | 0o111);
        std::fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(windows)]
fn ensure_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn discover(binary: &str) -> Option<PathBuf> {
    if let Some(bundled) = bundled_location(binary) {
        return Some(bundled);
    }
    for candidate in standard_locations(binary) {
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    which::which(binary).ok()
}

/// Find a usable `ffmpeg`, ensuring its executable bit is set (§6).
pub fn find_ffmpeg() -> MediaResult<PathBuf> {
    let path = discover("ffmpeg").ok_or(MediaError::FfmpegNotFound)?;
    ensure_executable(&path)?;
    Ok(path)
}

/// Find a usable `ffprobe`, ensuring its executable bit is set.
pub fn find_ffprobe() -> MediaResult<PathBuf> {
    let path = discover("ffprobe").ok_or(MediaError::FfprobeNotFound)?;
    ensure_executable(&path)?;
    Ok(path)
}
