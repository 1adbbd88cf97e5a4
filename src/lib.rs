//! Typemotion renders word-synchronized motion typography.
//!
//! A time-aligned transcript and a style document are compiled into a [`Timeline`]: one list of
//! animated text [`Element`]s per output frame. An [`Engine`] then rasterizes each frame,
//! optionally composites it over a background video, runs the post-processing
//! [`EffectChain`] and streams the result into a [`FrameSink`] (ffmpeg for files).
//!
//! - Parse inputs with [`parse_transcript`] / [`parse_styles`]
//! - Compile with [`Engine::compile`]
//! - Render with [`Engine::render`] or [`Engine::render_to_sink`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod compile;
pub mod config;
pub(crate) mod dsl;
pub(crate) mod effects;
pub(crate) mod encode;
pub(crate) mod media;
pub(crate) mod model;
pub(crate) mod pipeline;
pub(crate) mod render;

pub use crate::foundation::core::{Resolution, Rgba8};
pub use crate::foundation::error::{TypemotionError, TypemotionResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::keyframes::{Keyframe, KeyframeInterpolator, Properties};
pub use crate::compile::element::Element;
pub use crate::compile::timeline::{Frame, Timeline, compile_timeline, frame_count};
pub use crate::config::EngineConfig;
pub use crate::dsl::parser::{parse_styles, parse_styles_str, parse_transcript, parse_transcript_str};
pub use crate::dsl::validate::{validate_styles, validate_transcript};
pub use crate::effects::blur::BlurEffect;
pub use crate::effects::chain::{Effect, EffectChain};
pub use crate::effects::color_grade::ColorGradeEffect;
pub use crate::effects::device::{ComputeDevice, DeviceTensor, MemoryInfo};
pub use crate::effects::glow::GlowEffect;
pub use crate::encode::ffmpeg::{EncodeSettings, FfmpegEncoder, is_ffmpeg_available, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink};
pub use crate::media::background::{
    BackgroundSource, ImageBackground, VideoBackground, VideoInfo, open_background, resize_frame,
};
pub use crate::model::color::parse_color;
pub use crate::model::style::{Animation, EffectConfig, EffectParams, StyleConfig, TextAlign};
pub use crate::model::transcript::{Segment, Transcript, Word};
pub use crate::pipeline::composite::composite_over_background;
pub use crate::pipeline::engine::{Engine, RenderOptions, RenderReport, RenderStages};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::rasterizer::{CpuRasterizer, Rasterizer};
pub use crate::render::surface_pool::SurfacePoolStats;
