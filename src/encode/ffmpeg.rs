use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::encode::sink::{FrameOrder, FrameSink};
use crate::foundation::core::Resolution;
use crate::foundation::error::{TypemotionError, TypemotionResult};
use crate::render::frame::FrameRGBA;

/// Fixed encoder parameters for one output file.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeSettings {
    pub ffmpeg: PathBuf,
    pub resolution: Resolution,
    pub fps: u32,
    pub codec: String,
    pub preset: String,
    pub bitrate: String,
    pub timeout: Duration,
    pub out_path: PathBuf,
}

impl EncodeSettings {
    pub fn from_config(
        config: &EngineConfig,
        out_path: impl Into<PathBuf>,
        resolution: Resolution,
        fps: u32,
    ) -> Self {
        Self {
            ffmpeg: config.ffmpeg_path.clone(),
            resolution,
            fps,
            codec: config.codec.clone(),
            preset: config.preset.clone(),
            bitrate: config.bitrate.clone(),
            timeout: Duration::from_secs(config.encoder_timeout_secs),
            out_path: out_path.into(),
        }
    }

    pub fn validate(&self) -> TypemotionResult<()> {
        self.resolution.validate()?;
        if self.fps == 0 {
            return Err(TypemotionError::validation("encode fps must be non-zero"));
        }
        if !self.resolution.width.is_multiple_of(2) || !self.resolution.height.is_multiple_of(2) {
            return Err(TypemotionError::validation(
                "encode width/height must be even (required for yuv420p output)",
            ));
        }
        if self.timeout.is_zero() {
            return Err(TypemotionError::validation("encoder timeout must be > 0"));
        }
        Ok(())
    }

    /// Arguments passed to ffmpeg after the binary name.
    pub fn ffmpeg_args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(format!(
            "{}x{}",
            self.resolution.width, self.resolution.height
        ));
        args.extend(["-r".to_string(), self.fps.to_string()]);
        args.extend(
            ["-i", "pipe:0", "-an", "-c:v"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(self.codec.clone());
        args.extend(["-preset".to_string(), self.preset.clone()]);
        args.extend(["-b:v".to_string(), self.bitrate.clone()]);
        args.extend(
            ["-pix_fmt", "yuv420p", "-movflags", "+faststart"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(self.out_path.to_string_lossy().into_owned());
        args
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    is_ffmpeg_available(Path::new("ffmpeg"))
}

pub fn is_ffmpeg_available(ffmpeg: &Path) -> bool {
    Command::new(ffmpeg)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> TypemotionResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Streams raw RGBA frames into an ffmpeg child process.
///
/// Dropping an encoder that was never finished closes stdin and waits for ffmpeg, logging any
/// failure.
pub struct FfmpegEncoder {
    settings: EncodeSettings,
    order: FrameOrder,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<String>>,
}

impl std::fmt::Debug for FfmpegEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegEncoder")
            .field("settings", &self.settings)
            .field("written", &self.order.written())
            .field("running", &self.child.is_some())
            .finish()
    }
}

impl FfmpegEncoder {
    pub fn start(settings: EncodeSettings) -> TypemotionResult<Self> {
        settings.validate()?;
        ensure_parent_dir(&settings.out_path)?;

        let mut child = Command::new(&settings.ffmpeg)
            .args(settings.ffmpeg_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                TypemotionError::encoding(format!(
                    "failed to spawn '{}' (is it installed and on PATH?): {e}",
                    settings.ffmpeg.display()
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TypemotionError::encoding("failed to open ffmpeg stdin"))?;
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = pipe.read_to_string(&mut buf);
                buf
            })
        });

        tracing::info!(
            out = %settings.out_path.display(),
            width = settings.resolution.width,
            height = settings.resolution.height,
            fps = settings.fps,
            codec = %settings.codec,
            "ffmpeg encoder started"
        );
        Ok(Self {
            order: FrameOrder::new(settings.resolution),
            settings,
            child: Some(child),
            stdin: Some(stdin),
            stderr,
        })
    }

    pub fn settings(&self) -> &EncodeSettings {
        &self.settings
    }

    fn collect_stderr(&mut self) -> String {
        self.stderr
            .take()
            .and_then(|h| h.join().ok())
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    fn wait_with_timeout(&mut self, mut child: Child) -> TypemotionResult<std::process::ExitStatus> {
        let deadline = Instant::now() + self.settings.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(TypemotionError::encoding(format!(
                        "ffmpeg did not exit within {}s",
                        self.settings.timeout.as_secs_f64()
                    )));
                }
                Ok(None) => std::thread::sleep(Duration::from_millis(20)),
                Err(e) => {
                    return Err(TypemotionError::encoding(format!(
                        "failed to wait for ffmpeg: {e}"
                    )));
                }
            }
        }
    }
}

impl FrameSink for FfmpegEncoder {
    fn write_frame(&mut self, index: u64, frame: &FrameRGBA) -> TypemotionResult<()> {
        self.order.check(index, frame)?;
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(TypemotionError::encoding("ffmpeg encoder is already finalized"));
        };
        if let Err(e) = stdin.write_all(frame.as_bytes()) {
            let stderr = self.collect_stderr();
            return Err(TypemotionError::encoding(format!(
                "failed to write frame {index} to ffmpeg stdin: {e}; {stderr}"
            )));
        }
        self.order.advance();
        Ok(())
    }

    fn finish(&mut self) -> TypemotionResult<()> {
        let Some(child) = self.child.take() else {
            return Ok(());
        };
        if let Some(mut stdin) = self.stdin.take() {
            let _ = stdin.flush();
        }

        let status = self.wait_with_timeout(child)?;
        let stderr = self.collect_stderr();
        if !status.success() {
            return Err(TypemotionError::encoding(format!(
                "ffmpeg exited with status {status}: {stderr}"
            )));
        }

        let out = &self.settings.out_path;
        let size = std::fs::metadata(out).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(TypemotionError::encoding(format!(
                "ffmpeg finished but '{}' is missing or empty",
                out.display()
            )));
        }
        tracing::info!(
            out = %out.display(),
            frames = self.order.written(),
            bytes = size,
            "ffmpeg encoder finished"
        );
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if self.child.is_some()
            && let Err(e) = self.finish()
        {
            tracing::warn!(error = %e, "ffmpeg encoder finalized on drop with error");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
