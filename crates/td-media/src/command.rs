//! FFmpeg command builder and runner (§4.5, §4.6).

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::discovery::find_ffmpeg;
use crate::error::{MediaError, MediaResult};
use crate::progress::{parse_progress_line, FfmpegProgress};

/// Builder for a (possibly multi-input) FFmpeg invocation.
///
/// Export renders supply one input per selected camera (§4.5.2); the same seek/duration args are
/// repeated ahead of every `-i` so the window applies uniformly across all camera streams.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    ffmpeg_path: Option<PathBuf>,
    per_input_args: Vec<String>,
    inputs: Vec<PathBuf>,
    output_args: Vec<String>,
    output: PathBuf,
    overwrite: bool,
    log_level: String,
}

impl FfmpegCommand {
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            ffmpeg_path: None,
            per_input_args: Vec::new(),
            inputs: Vec::new(),
            output_args: Vec::new(),
            output: output.as_ref().to_path_buf(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Override the discovered `ffmpeg` binary (used by the Process Supervisor once an
    /// [`crate::encoder_probe`] probe has already located one).
    pub fn with_ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.ffmpeg_path = Some(path);
        self
    }

    pub fn add_input(mut self, input: impl AsRef<Path>) -> Self {
        self.inputs.push(input.as_ref().to_path_buf());
        self
    }

    pub fn add_inputs<I, P>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.inputs
            .extend(inputs.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// Seek applied before every input (§4.5.2 window applies uniformly to all inputs).
    pub fn seek(mut self, seconds: f64) -> Self {
        self.per_input_args.push("-ss".to_string());
        self.per_input_args.push(format!("{seconds:.3}"));
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.per_input_args.push("-t".to_string());
        self.per_input_args.push(format!("{seconds:.3}"));
        self
    }

    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    pub fn pix_fmt(self, fmt: impl Into<String>) -> Self {
        self.output_arg("-pix_fmt").output_arg(fmt)
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.overwrite {
            args.push("-y".to_string());
        }
        args.push("-v".to_string());
        args.push(self.log_level.clone());
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        for input in &self.inputs {
            args.extend(self.per_input_args.clone());
            args.push("-i".to_string());
            args.push(input.to_string_lossy().to_string());
        }

        args.extend(self.output_args.clone());
        args.push(self.output.to_string_lossy().to_string());
        args
    }
}

/// Runs an [`FfmpegCommand`], parsing progress and honoring cancellation (§4.6).
pub struct FfmpegRunner {
    cancel_rx: Option<watch::Receiver<bool>>,
    termination_grace: Duration,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self {
            cancel_rx: None,
            termination_grace: Duration::from_secs(5),
        }
    }

    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Bounded interval to wait for the child to exit after it's been killed, before giving up on
    /// a clean exit and reporting cancelled regardless (`EngineConfig::graceful_termination_grace`,
    /// §4.6).
    pub fn with_termination_grace(mut self, grace: Duration) -> Self {
        self.termination_grace = grace;
        self
    }

    pub async fn run<F>(&self, cmd: &FfmpegCommand, on_progress: F) -> MediaResult<()>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        let ffmpeg_path = match &cmd.ffmpeg_path {
            Some(path) => path.clone(),
            None => find_ffmpeg()?,
        };

        let args = cmd.build_args();
        debug!(ffmpeg = %ffmpeg_path.display(), args = %args.join(" "), "running ffmpeg");

        let mut child = Command::new(&ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr = child.stderr.take().expect("stderr not captured");
        let mut reader = BufReader::new(stderr).lines();

        let progress_handle = tokio::spawn(async move {
            let mut current = FfmpegProgress::default();
            while let Ok(Some(line)) = reader.next_line().await {
                if let Some(snapshot) = parse_progress_line(&line, &mut current) {
                    on_progress(snapshot);
                }
            }
        });

        let result = self.wait_for_completion(&mut child).await;
        let _ = progress_handle.await;
        result
    }

    async fn wait_for_completion(&self, child: &mut Child) -> MediaResult<()> {
        let Some(cancel_rx) = &self.cancel_rx else {
            return self.finish(child.wait().await?);
        };
        let mut cancel_rx = cancel_rx.clone();

        if *cancel_rx.borrow() {
            return self.kill_and_report_cancelled(child).await;
        }

        tokio::select! {
            status = child.wait() => self.finish(status?),
            changed = cancel_rx.changed() => {
                if changed.is_ok() && *cancel_rx.borrow() {
                    self.kill_and_report_cancelled(child).await
                } else {
                    self.finish(child.wait().await?)
                }
            }
        }
    }

    /// Sends the termination signal, waits up to `termination_grace` for a clean exit, then
    /// force-kills if the child hasn't gone away (§4.6).
    async fn kill_and_report_cancelled(&self, child: &mut Child) -> MediaResult<()> {
        info!("ffmpeg cancelled, terminating child process");
        let _ = child.start_kill();
        if tokio::time::timeout(self.termination_grace, child.wait())
            .await
            .is_err()
        {
            warn!("ffmpeg did not exit within the grace period, forcing kill");
            let _ = child.start_kill();
            let _ = child.wait().await;
        }
        Err(MediaError::Cancelled)
    }

    fn finish(&self, status: std::process::ExitStatus) -> MediaResult<()> {
        if status.success() {
            Ok(())
        } else {
            warn!(code = ?status.code(), "ffmpeg exited non-zero");
            Err(MediaError::ffmpeg_failed(
                "ffmpeg exited with non-zero status",
                None,
                status.code(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_args_repeats_seek_before_each_input() {
        let cmd = FfmpegCommand::new("out.mp4")
            .add_input("front.mp4")
            .add_input("back.mp4")
            .seek(5.0)
            .duration(10.0)
            .video_codec("libx264");

        let args = cmd.build_args();
        let seek_count = args.iter().filter(|a| a.as_str() == "-ss").count();
        assert_eq!(seek_count, 2);
        assert!(args.contains(&"front.mp4".to_string()));
        assert!(args.contains(&"back.mp4".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }
}
