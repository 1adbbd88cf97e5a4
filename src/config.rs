use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{TypemotionError, TypemotionResult};

/// Process-level engine configuration.
///
/// Values come from defaults, optionally overridden by environment variables
/// ([`EngineConfig::from_env`]) or a JSON file ([`EngineConfig::from_json_file`]).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `ffmpeg` executable used for encoding and background decode.
    pub ffmpeg_path: PathBuf,
    /// `ffprobe` executable used to probe background videos.
    pub ffprobe_path: PathBuf,
    /// Output video codec passed to `-c:v`.
    pub codec: String,
    /// Encoder preset passed to `-preset`.
    pub preset: String,
    /// Target bitrate passed to `-b:v`.
    pub bitrate: String,
    /// Seconds to wait for the encoder to exit after stdin is closed.
    pub encoder_timeout_secs: u64,
    /// Compute device name for the effect chain (`cpu`).
    pub device: String,
    /// Device memory ceiling in GiB, fixed for the lifetime of an engine.
    pub max_gpu_memory_gb: f64,
    /// Maximum number of sized fonts kept by the font cache.
    pub font_cache_size: usize,
    /// Maximum number of free surfaces retained by the surface pool.
    pub surface_pool_size: usize,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` files.
    pub font_dirs: Vec<PathBuf>,
    /// Emit a progress line every this many frames.
    pub progress_interval: u64,
    /// Frames decoded per background prefetch batch.
    pub video_prefetch_frames: u32,
    /// Decoded background frames retained in memory.
    pub video_cache_capacity: usize,
    /// Default log filter used by the binary when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            codec: "libx264".to_string(),
            preset: "medium".to_string(),
            bitrate: "10M".to_string(),
            encoder_timeout_secs: 30,
            device: "cpu".to_string(),
            max_gpu_memory_gb: 4.0,
            font_cache_size: 100,
            surface_pool_size: 10,
            font_dirs: Vec::new(),
            progress_interval: 1000,
            video_prefetch_frames: 12,
            video_cache_capacity: 64,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by any recognised environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg
    }

    /// Load a JSON config file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> TypemotionResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read engine config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes).map_err(|e| {
            TypemotionError::parse(format!("invalid engine config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub(crate) fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        let string = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = string("FFMPEG_PATH") {
            self.ffmpeg_path = PathBuf::from(v);
        }
        if let Some(v) = string("FFPROBE_PATH") {
            self.ffprobe_path = PathBuf::from(v);
        }
        if let Some(v) = string("VIDEO_CODEC").or_else(|| string("NVENC_CODEC")) {
            self.codec = v;
        }
        if let Some(v) = string("VIDEO_PRESET").or_else(|| string("NVENC_PRESET")) {
            self.preset = v;
        }
        if let Some(v) = string("OUTPUT_BITRATE") {
            self.bitrate = v;
        }
        if let Some(v) = string("TYPEMOTION_DEVICE") {
            self.device = v;
        }
        if let Some(v) = string("LOG_LEVEL") {
            self.log_level = v.to_ascii_lowercase();
        }
        if let Some(v) = string("FONT_DIRS") {
            self.font_dirs = std::env::split_paths(&v).collect();
        }

        self.encoder_timeout_secs = get("ENCODER_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(self.encoder_timeout_secs);
        self.max_gpu_memory_gb = get("MAX_GPU_MEMORY_GB")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|&n| n.is_finite() && n > 0.0)
            .unwrap_or(self.max_gpu_memory_gb);
        self.font_cache_size = get("FONT_CACHE_SIZE")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(self.font_cache_size);
        self.surface_pool_size = get("SURFACE_POOL_SIZE")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(self.surface_pool_size);
        self.progress_interval = get("PROGRESS_INTERVAL")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(self.progress_interval);
        self.video_prefetch_frames = get("VIDEO_PREFETCH_FRAMES")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(self.video_prefetch_frames);
        self.video_cache_capacity = get("VIDEO_CACHE_CAPACITY")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(self.video_cache_capacity);
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> TypemotionResult<()> {
        if self.font_cache_size == 0 {
            return Err(TypemotionError::validation("font_cache_size must be >= 1"));
        }
        if self.surface_pool_size == 0 {
            return Err(TypemotionError::validation("surface_pool_size must be >= 1"));
        }
        if self.encoder_timeout_secs == 0 {
            return Err(TypemotionError::validation(
                "encoder_timeout_secs must be >= 1",
            ));
        }
        if !self.max_gpu_memory_gb.is_finite() || self.max_gpu_memory_gb <= 0.0 {
            return Err(TypemotionError::validation(
                "max_gpu_memory_gb must be finite and > 0",
            ));
        }
        if self.progress_interval == 0 {
            return Err(TypemotionError::validation("progress_interval must be >= 1"));
        }
        if self.codec.trim().is_empty() {
            return Err(TypemotionError::validation("codec must not be empty"));
        }
        Ok(())
    }

    /// Device memory ceiling in bytes.
    pub fn max_gpu_memory_bytes(&self) -> u64 {
        (self.max_gpu_memory_gb * 1024.0 * 1024.0 * 1024.0) as u64
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
