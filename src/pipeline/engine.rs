use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::compile::element::Element;
use crate::compile::timeline::{Frame, Timeline, compile_timeline};
use crate::config::EngineConfig;
use crate::dsl::validate::validate_transcript;
use crate::effects::chain::EffectChain;
use crate::effects::device::ComputeDevice;
use crate::encode::ffmpeg::{EncodeSettings, FfmpegEncoder};
use crate::encode::sink::FrameSink;
use crate::foundation::error::{TypemotionError, TypemotionResult};
use crate::media::background::{BackgroundSource, open_background};
use crate::model::style::StyleConfig;
use crate::model::transcript::Transcript;
use crate::pipeline::composite::composite_over_background;
use crate::render::frame::FrameRGBA;
use crate::render::rasterizer::{CpuRasterizer, Rasterizer};

/// Options for [`Engine::render`].
#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// Video or still image composited under the text layer.
    pub background: Option<PathBuf>,
    /// Log a progress line every `progress_interval` frames.
    pub progress: bool,
}

/// Outcome of a completed render.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RenderReport {
    /// Output file, when rendering to disk.
    pub output: Option<PathBuf>,
    pub frames_total: usize,
    pub frames_written: usize,
    /// Frames replaced by a solid background frame after a render failure.
    pub fallback_frames: usize,
    /// Frames written without effects because the effect chain failed.
    pub effect_failures: usize,
    pub elapsed: Duration,
}

/// Per-render collaborators used by [`Engine::render_to_sink`].
pub struct RenderStages<'a> {
    pub rasterizer: &'a mut dyn Rasterizer,
    pub effects: &'a EffectChain,
    pub background: Option<&'a mut dyn BackgroundSource>,
}

/// Compiles transcripts into timelines and renders timelines into frame sinks.
///
/// One engine owns one compute device. Renders are sequential; frames are produced and written
/// strictly in timeline order.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    device: ComputeDevice,
}

impl Engine {
    /// Validate `config` and open its compute device.
    pub fn new(config: EngineConfig) -> TypemotionResult<Self> {
        config.validate()?;
        let device = ComputeDevice::from_config(&config)?;
        Ok(Self { config, device })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn device(&self) -> &ComputeDevice {
        &self.device
    }

    /// Repair the transcript, then compile it against `styles`.
    pub fn compile(
        &self,
        transcript: &Transcript,
        styles: &StyleConfig,
    ) -> TypemotionResult<Timeline> {
        let transcript = validate_transcript(transcript)?;
        compile_timeline(&transcript, styles)
    }

    /// Render `timeline` to a video file through ffmpeg.
    ///
    /// Encoder and background failures at open time are terminal. The output file is checked
    /// after ffmpeg exits.
    #[tracing::instrument(skip_all, fields(out = %out.display(), frames = timeline.frame_count()))]
    pub fn render(
        &self,
        timeline: &Timeline,
        out: &Path,
        opts: &RenderOptions,
    ) -> TypemotionResult<RenderReport> {
        let mut rasterizer = CpuRasterizer::new(&self.config, &timeline.styles);
        let effects = timeline
            .styles
            .effects
            .as_ref()
            .map(EffectChain::from_config)
            .unwrap_or_default();
        let mut background = opts
            .background
            .as_deref()
            .map(|p| open_background(p, &self.config))
            .transpose()?;

        let settings =
            EncodeSettings::from_config(&self.config, out, timeline.resolution, timeline.fps);
        let mut encoder = FfmpegEncoder::start(settings)?;

        let stages = RenderStages {
            rasterizer: &mut rasterizer,
            effects: &effects,
            background: match background.as_mut() {
                Some(bg) => Some(bg.as_mut() as &mut dyn BackgroundSource),
                None => None,
            },
        };
        let mut report = self.render_to_sink(timeline, stages, &mut encoder, opts.progress)?;
        report.output = Some(out.to_path_buf());
        tracing::debug!(
            pool = ?rasterizer.pool_stats(),
            fonts = rasterizer.cached_fonts(),
            memory = ?self.device.memory_info(),
            "render resources"
        );
        tracing::info!(out = %out.display(), "render complete");
        Ok(report)
    }

    /// Render every frame of `timeline` into `sink`, then finish the sink.
    ///
    /// A frame whose rasterization or compositing fails is replaced by a solid frame of the
    /// style background color. A failing effect chain leaves that frame without effects. Sink
    /// errors abort the render.
    pub fn render_to_sink(
        &self,
        timeline: &Timeline,
        mut stages: RenderStages<'_>,
        sink: &mut dyn FrameSink,
        progress: bool,
    ) -> TypemotionResult<RenderReport> {
        let started = Instant::now();
        let total = timeline.frame_count();
        let mut report = RenderReport {
            frames_total: total,
            ..RenderReport::default()
        };
        tracing::info!(
            frames = total,
            fps = timeline.fps,
            effects = ?stages.effects.names(),
            background = stages.background.is_some(),
            "rendering"
        );

        let interval = self.config.progress_interval.max(1);
        for frame in &timeline.frames {
            let rgba = match self.render_frame(timeline, frame, &mut stages, &mut report) {
                Ok(rgba) => rgba,
                Err(e) => {
                    tracing::error!(frame = frame.index, error = %e, "frame failed, writing background");
                    report.fallback_frames += 1;
                    FrameRGBA::solid(timeline.resolution, timeline.styles.background_color)
                }
            };

            sink.write_frame(frame.index as u64, &rgba)?;
            report.frames_written += 1;

            if progress && frame.index > 0 && frame.index as u64 % interval == 0 {
                tracing::info!(
                    frame = frame.index,
                    total,
                    written = report.frames_written,
                    "progress"
                );
            }
        }

        sink.finish()?;
        report.elapsed = started.elapsed();
        tracing::info!(
            written = report.frames_written,
            fallback = report.fallback_frames,
            effect_failures = report.effect_failures,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "frames written"
        );
        Ok(report)
    }

    /// Render one frame with rasterizer, background and effects, as a full render would.
    ///
    /// Unlike a full render, failures are returned instead of replaced.
    pub fn render_frame_image(
        &self,
        timeline: &Timeline,
        index: usize,
        background: Option<&mut dyn BackgroundSource>,
    ) -> TypemotionResult<FrameRGBA> {
        let frame = timeline.frames.get(index).ok_or_else(|| {
            TypemotionError::validation(format!(
                "frame index {index} out of range (timeline has {} frames)",
                timeline.frame_count()
            ))
        })?;
        let mut rasterizer = CpuRasterizer::new(&self.config, &timeline.styles);
        let effects = timeline
            .styles
            .effects
            .as_ref()
            .map(EffectChain::from_config)
            .unwrap_or_default();

        let mut rgba = rasterize_frame(&mut rasterizer, timeline, frame)?;
        if let Some(bg) = background {
            rgba = composite_background(bg, timeline, frame, rgba)?;
        }
        effects.apply(&self.device, &rgba)
    }

    fn render_frame(
        &self,
        timeline: &Timeline,
        frame: &Frame,
        stages: &mut RenderStages<'_>,
        report: &mut RenderReport,
    ) -> TypemotionResult<FrameRGBA> {
        let mut rgba = rasterize_frame(&mut *stages.rasterizer, timeline, frame)?;
        if let Some(bg) = stages.background.as_deref_mut() {
            rgba = composite_background(bg, timeline, frame, rgba)?;
        }

        if !stages.effects.is_empty() {
            match stages.effects.apply(&self.device, &rgba) {
                Ok(out) => rgba = out,
                Err(e) => {
                    tracing::warn!(frame = frame.index, error = %e, "effects failed, continuing without effects");
                    report.effect_failures += 1;
                }
            }
        }
        Ok(rgba)
    }
}

fn rasterize_frame(
    rasterizer: &mut dyn Rasterizer,
    timeline: &Timeline,
    frame: &Frame,
) -> TypemotionResult<FrameRGBA> {
    let elements: Cow<'_, [Element]> = if frame.elements.iter().all(Element::is_visible) {
        Cow::Borrowed(&frame.elements)
    } else {
        Cow::Owned(
            frame
                .elements
                .iter()
                .filter(|e| e.is_visible())
                .cloned()
                .collect(),
        )
    };

    let rgba = rasterizer.rasterize(
        &elements,
        timeline.resolution,
        timeline.styles.background_color,
    )?;
    if rgba.resolution() != timeline.resolution
        || rgba.data.len() != timeline.resolution.rgba_len()
    {
        return Err(TypemotionError::render(format!(
            "rasterizer returned {}x{}, expected {}x{}",
            rgba.width, rgba.height, timeline.resolution.width, timeline.resolution.height
        )));
    }
    Ok(rgba)
}

/// Blend `text` over the background frame at `frame`'s timestamp, if the source has one.
fn composite_background(
    background: &mut dyn BackgroundSource,
    timeline: &Timeline,
    frame: &Frame,
    text: FrameRGBA,
) -> TypemotionResult<FrameRGBA> {
    let Some(bg_frame) = background.frame_at(frame.timestamp)? else {
        return Ok(text);
    };
    let bg_frame = background.resize(bg_frame, timeline.resolution)?;
    composite_over_background(&text, &bg_frame)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/engine.rs"]
mod tests;
