use crate::compile::element::Element;
use crate::config::EngineConfig;
use crate::foundation::core::{Affine, Resolution, Rgba8};
use crate::foundation::error::{TypemotionError, TypemotionResult};
use crate::foundation::math::unpremul_rgba8;
use crate::model::color::{color_from_value, parse_color};
use crate::model::style::{EffectParams, StyleConfig, TextAlign};
use crate::render::font_cache::{FontCache, SizedFont};
use crate::render::frame::FrameRGBA;
use crate::render::surface_pool::{SurfacePool, SurfacePoolStats};
use crate::render::text::{TextBrush, TextEngine};

/// Turns a frame's elements into pixels.
pub trait Rasterizer {
    /// Draw `elements` over a canvas cleared to `background`.
    ///
    /// The result must be exactly `resolution` in size.
    fn rasterize(
        &mut self,
        elements: &[Element],
        resolution: Resolution,
        background: Rgba8,
    ) -> TypemotionResult<FrameRGBA>;
}

/// Parley + vello_cpu text rasterizer with pooled surfaces and cached fonts.
pub struct CpuRasterizer {
    pool: SurfacePool,
    fonts: FontCache,
    text: TextEngine,
    align: TextAlign,
    letter_spacing: Option<f32>,
    /// Multiple of the font size.
    line_height: Option<f32>,
    cue_box: Option<CueBox>,
}

impl CpuRasterizer {
    /// Load fonts from the system and `config.font_dirs`.
    pub fn new(config: &EngineConfig, styles: &StyleConfig) -> Self {
        let fonts = FontCache::new(&config.font_dirs, config.font_cache_size);
        tracing::debug!(faces = fonts.face_count(), "cpu rasterizer ready");
        Self::with_font_cache(fonts, config.surface_pool_size, styles)
    }

    pub(crate) fn with_font_cache(
        fonts: FontCache,
        surface_pool_size: usize,
        styles: &StyleConfig,
    ) -> Self {
        Self {
            pool: SurfacePool::new(surface_pool_size),
            fonts,
            text: TextEngine::new(),
            align: styles.text_align.unwrap_or_default(),
            letter_spacing: styles.letter_spacing,
            line_height: styles.line_height,
            cue_box: CueBox::from_styles(styles),
        }
    }

    pub fn pool_stats(&self) -> SurfacePoolStats {
        self.pool.stats()
    }

    /// Sized fonts currently held by the font cache.
    pub fn cached_fonts(&self) -> usize {
        self.fonts.cached_fonts()
    }

    fn draw_element(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        element: &Element,
    ) -> TypemotionResult<()> {
        let opacity = element.opacity.clamp(0.0, 1.0) as f32;
        if opacity <= 0.0 {
            return Ok(());
        }

        let font = self.fonts.font(
            &element.font_family,
            element.font_size,
            element.font_weight,
            false,
        )?;
        let layout = self.text.layout_line(
            element.text.trim(),
            &font,
            TextBrush::from(element.color),
            self.letter_spacing,
            self.line_height,
        )?;

        let w = f64::from(layout.width());
        let h = f64::from(layout.height());
        let anchor_x = match self.align {
            TextAlign::Left => 0.0,
            TextAlign::Center => -w / 2.0,
            TextAlign::Right => -w,
        };
        let transform = Affine::translate((element.x, element.y))
            * Affine::scale(element.scale)
            * Affine::rotate(element.rotation.to_radians())
            * Affine::translate((anchor_x, -h / 2.0));

        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        if let Some(cue) = &self.cue_box {
            let (px, py) = (cue.pad_x * element.font_size, cue.pad_y * element.font_size);
            let rect = vello_cpu::kurbo::RoundedRect::new(
                -f64::from(px),
                -f64::from(py),
                w + f64::from(px),
                h + f64::from(py),
                f64::from(cue.radius),
            );
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                cue.color.r,
                cue.color.g,
                cue.color.b,
                cue.color.a,
            ));
            ctx.fill_path(&vello_cpu::kurbo::Shape::to_path(&rect, 0.1));
        }
        if let Some(shadow) = element.shadow.as_ref().map(Shadow::from_params) {
            ctx.set_transform(affine_to_cpu(
                transform * Affine::translate((shadow.offset_x, shadow.offset_y)),
            ));
            draw_layout(ctx, &layout, &font, Some(shadow.color));
        }
        ctx.set_transform(affine_to_cpu(transform));
        draw_layout(ctx, &layout, &font, None);
        if opacity < 1.0 {
            ctx.pop_layer();
        }
        Ok(())
    }
}

impl Rasterizer for CpuRasterizer {
    fn rasterize(
        &mut self,
        elements: &[Element],
        resolution: Resolution,
        background: Rgba8,
    ) -> TypemotionResult<FrameRGBA> {
        let mut pixmap = self.pool.acquire(resolution)?;
        let (w, h) = crate::render::surface_pool::pixmap_dims(resolution)?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            background.r,
            background.g,
            background.b,
            background.a,
        ));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));

        for element in elements.iter().filter(|e| e.is_visible()) {
            if let Err(e) = self.draw_element(&mut ctx, element) {
                tracing::warn!(text = %element.text, error = %e, "failed to draw element, skipping");
            }
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        let data: Vec<u8> = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .flat_map(|px| unpremul_rgba8([px[0], px[1], px[2], px[3]]))
            .collect();
        self.pool.release(resolution, pixmap);

        if data.len() != resolution.rgba_len() {
            return Err(TypemotionError::render(format!(
                "rasterized {} bytes, expected {}",
                data.len(),
                resolution.rgba_len()
            )));
        }
        FrameRGBA::new(resolution.width, resolution.height, data)
    }
}

/// Rounded box drawn behind each word when the style sets a cue background.
#[derive(Clone, Debug, PartialEq)]
struct CueBox {
    color: Rgba8,
    /// Padding in em units.
    pad_x: f32,
    pad_y: f32,
    radius: f32,
}

impl CueBox {
    fn from_styles(styles: &StyleConfig) -> Option<Self> {
        let color = parse_color(styles.cue_background.as_deref()?);
        let (pad_x, pad_y) = styles.padding.unwrap_or((0.0, 0.0));
        Some(Self {
            color,
            pad_x: pad_x.max(0.0),
            pad_y: pad_y.max(0.0),
            radius: styles.border_radius.unwrap_or(0.0).max(0.0),
        })
    }
}

/// Hard drop shadow drawn under the text.
struct Shadow {
    offset_x: f64,
    offset_y: f64,
    color: Rgba8,
}

impl Shadow {
    fn from_params(p: &EffectParams) -> Self {
        let num = |k: &str, d: f64| p.get(k).and_then(|v| v.as_f64()).unwrap_or(d);
        let color = match p.get("color") {
            Some(serde_json::Value::String(s)) => parse_color(s),
            Some(v) => color_from_value(v).unwrap_or(Rgba8::new(0, 0, 0, 127)),
            None => Rgba8::new(0, 0, 0, 127),
        };
        Self {
            offset_x: num("offsetX", 2.0),
            offset_y: num("offsetY", 2.0),
            color,
        }
    }
}

fn draw_layout(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrush>,
    font: &SizedFont,
    color_override: Option<Rgba8>,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };

            let brush = run.style().brush;
            let c = color_override.unwrap_or(Rgba8::new(brush.r, brush.g, brush.b, brush.a));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));

            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&font.typeface.font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/rasterizer.rs"]
mod tests;
