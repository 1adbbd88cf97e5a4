use std::path::{Path, PathBuf};

use crate::config::EngineConfig;
use crate::foundation::core::Resolution;
use crate::foundation::error::{TypemotionError, TypemotionResult};
use crate::render::font_cache::FifoCache;
use crate::render::frame::FrameRGBA;

/// Source of frames composited under the text layer.
pub trait BackgroundSource {
    /// Frame shown at `timestamp` seconds, or `None` once the source has run out.
    fn frame_at(&mut self, timestamp: f64) -> TypemotionResult<Option<FrameRGBA>>;

    /// Scale `frame` to `target`.
    fn resize(&self, frame: FrameRGBA, target: Resolution) -> TypemotionResult<FrameRGBA> {
        resize_frame(frame, target)
    }
}

/// Open `path` as a still image (by extension) or as a video.
pub fn open_background(
    path: &Path,
    config: &EngineConfig,
) -> TypemotionResult<Box<dyn BackgroundSource>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" | "jpg" | "jpeg" | "bmp" | "webp" | "gif" => {
            Ok(Box::new(ImageBackground::open(path)?))
        }
        _ => Ok(Box::new(VideoBackground::open(path, config)?)),
    }
}

/// Bilinear resize; a frame already at `target` is returned unchanged.
pub fn resize_frame(frame: FrameRGBA, target: Resolution) -> TypemotionResult<FrameRGBA> {
    target.validate()?;
    if frame.resolution() == target {
        return Ok(frame);
    }
    let (w, h) = (frame.width, frame.height);
    let img = image::RgbaImage::from_raw(w, h, frame.into_bytes()).ok_or_else(|| {
        TypemotionError::render(format!("background frame buffer does not match {w}x{h}"))
    })?;
    let resized = image::imageops::resize(
        &img,
        target.width,
        target.height,
        image::imageops::FilterType::Triangle,
    );
    FrameRGBA::new(target.width, target.height, resized.into_raw())
}

/// Still image used for every frame.
#[derive(Clone, Debug)]
pub struct ImageBackground {
    frame: FrameRGBA,
}

impl ImageBackground {
    pub fn open(path: &Path) -> TypemotionResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            TypemotionError::encoding(format!(
                "failed to read background image '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> TypemotionResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| TypemotionError::encoding(format!("decode background image: {e}")))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            frame: FrameRGBA::new(width, height, img.into_raw())?,
        })
    }
}

impl BackgroundSource for ImageBackground {
    fn frame_at(&mut self, timestamp: f64) -> TypemotionResult<Option<FrameRGBA>> {
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Ok(None);
        }
        Ok(Some(self.frame.clone()))
    }
}

/// Stream metadata reported by `ffprobe`.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: u64,
}

impl VideoInfo {
    /// Index of the frame shown at `timestamp`, if the video has one.
    pub fn frame_index(&self, timestamp: f64) -> Option<u64> {
        if !timestamp.is_finite() || timestamp < 0.0 || self.fps <= 0.0 {
            return None;
        }
        let idx = (timestamp * self.fps).floor() as u64;
        (idx < self.frame_count).then_some(idx)
    }

    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Decodes consecutive frames starting at a frame index.
pub(crate) trait FrameDecoder {
    fn decode_batch(
        &mut self,
        info: &VideoInfo,
        start: u64,
        count: u32,
    ) -> TypemotionResult<Vec<Vec<u8>>>;
}

struct FfmpegDecoder {
    ffmpeg: PathBuf,
}

impl FrameDecoder for FfmpegDecoder {
    fn decode_batch(
        &mut self,
        info: &VideoInfo,
        start: u64,
        count: u32,
    ) -> TypemotionResult<Vec<Vec<u8>>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let start_sec = start as f64 / info.fps;
        let out = std::process::Command::new(&self.ffmpeg)
            .args(["-v", "error", "-ss", &format!("{start_sec:.9}")])
            .arg("-i")
            .arg(&info.path)
            .args([
                "-frames:v",
                &count.to_string(),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .output()
            .map_err(|e| {
                TypemotionError::encoding(format!("failed to run ffmpeg for background decode: {e}"))
            })?;
        if !out.status.success() {
            return Err(TypemotionError::encoding(format!(
                "ffmpeg background decode failed for '{}': {}",
                info.path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        split_frames(&out.stdout, info.frame_len(), count)
    }
}

fn split_frames(bytes: &[u8], frame_len: usize, max: u32) -> TypemotionResult<Vec<Vec<u8>>> {
    if frame_len == 0 {
        return Err(TypemotionError::encoding(
            "background frame size is zero (invalid source dimensions)",
        ));
    }
    if !bytes.len().is_multiple_of(frame_len) {
        return Err(TypemotionError::encoding(format!(
            "decoded background batch is {} bytes, not a multiple of {frame_len}",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(frame_len)
        .take(max as usize)
        .map(<[u8]>::to_vec)
        .collect())
}

/// Background video decoded through ffmpeg in prefetched batches.
///
/// A miss at frame `i` decodes `i..i + prefetch` in one ffmpeg call; decoded frames sit in a FIFO
/// cache so sequential playback spawns one process per batch.
pub struct VideoBackground {
    info: VideoInfo,
    decoder: Box<dyn FrameDecoder>,
    cache: FifoCache<u64, FrameRGBA>,
    prefetch: u32,
}

impl std::fmt::Debug for VideoBackground {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoBackground")
            .field("info", &self.info)
            .field("cached", &self.cache.len())
            .field("prefetch", &self.prefetch)
            .finish()
    }
}

impl VideoBackground {
    /// Probe `path` and prepare a decoder using the configured ffmpeg/ffprobe binaries.
    pub fn open(path: &Path, config: &EngineConfig) -> TypemotionResult<Self> {
        if !path.exists() {
            return Err(TypemotionError::encoding(format!(
                "background video not found: {}",
                path.display()
            )));
        }
        let info = probe_video(&config.ffprobe_path, path)?;
        tracing::info!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            frames = info.frame_count,
            "background video opened"
        );
        Ok(Self::with_decoder(
            info,
            Box::new(FfmpegDecoder {
                ffmpeg: config.ffmpeg_path.clone(),
            }),
            config.video_prefetch_frames,
            config.video_cache_capacity,
        ))
    }

    pub(crate) fn with_decoder(
        info: VideoInfo,
        decoder: Box<dyn FrameDecoder>,
        prefetch: u32,
        cache_capacity: usize,
    ) -> Self {
        let prefetch = prefetch.max(1);
        Self {
            info,
            decoder,
            cache: FifoCache::new(cache_capacity.max(prefetch as usize)),
            prefetch,
        }
    }

    pub fn info(&self) -> &VideoInfo {
        &self.info
    }
}

impl BackgroundSource for VideoBackground {
    fn frame_at(&mut self, timestamp: f64) -> TypemotionResult<Option<FrameRGBA>> {
        let Some(idx) = self.info.frame_index(timestamp) else {
            return Ok(None);
        };
        if let Some(frame) = self.cache.get(&idx) {
            return Ok(Some(frame.clone()));
        }

        let count = (self.info.frame_count - idx).min(u64::from(self.prefetch)) as u32;
        let batch = self.decoder.decode_batch(&self.info, idx, count)?;
        tracing::debug!(start = idx, requested = count, decoded = batch.len(), "background prefetch");

        let mut first = None;
        for (offset, bytes) in batch.into_iter().enumerate() {
            let frame = FrameRGBA::new(self.info.width, self.info.height, bytes)?;
            if offset == 0 {
                first = Some(frame.clone());
            }
            self.cache.insert(idx + offset as u64, frame);
        }
        Ok(first)
    }
}

/// Read size, frame rate and frame count of the first video stream.
pub fn probe_video(ffprobe: &Path, path: &Path) -> TypemotionResult<VideoInfo> {
    let out = std::process::Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| TypemotionError::encoding(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(TypemotionError::encoding(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe_json(path, &out.stdout)
}

pub(crate) fn parse_probe_json(path: &Path, json: &[u8]) -> TypemotionResult<VideoInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        nb_frames: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| TypemotionError::encoding(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| TypemotionError::encoding("no video stream found"))?;
    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(TypemotionError::encoding("missing video size from ffprobe")),
    };
    let fps = stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_ff_ratio)
        .ok_or_else(|| TypemotionError::encoding("invalid video r_frame_rate"))?;

    let duration = stream
        .duration
        .as_deref()
        .or(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let frame_count = stream
        .nb_frames
        .as_deref()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|&n| n > 0)
        .unwrap_or_else(|| (duration * fps).floor().max(0.0) as u64);

    Ok(VideoInfo {
        path: path.to_path_buf(),
        width,
        height,
        fps,
        frame_count,
    })
}

fn parse_ff_ratio(s: &str) -> Option<f64> {
    let (a, b) = s.split_once('/').unwrap_or((s, "1"));
    let a = a.trim().parse::<f64>().ok()?;
    let b = b.trim().parse::<f64>().ok()?;
    (b > 0.0 && a > 0.0).then(|| a / b)
}

#[cfg(test)]
#[path = "../../tests/unit/media/background.rs"]
mod tests;
