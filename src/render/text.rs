use std::collections::HashMap;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{TypemotionError, TypemotionResult};
use crate::render::font_cache::{SizedFont, TypefaceKey};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrush {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrush {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Stateful helper for building Parley layouts from resolved typefaces.
///
/// Each typeface's bytes are registered with Parley once; the registered family name is reused
/// for later layouts.
pub(crate) struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    families: HashMap<TypefaceKey, String>,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    /// Shape and lay out a single unwrapped line of text.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        font: &SizedFont,
        brush: TextBrush,
        letter_spacing: Option<f32>,
        line_height: Option<f32>,
    ) -> TypemotionResult<parley::Layout<TextBrush>> {
        if !font.size.is_finite() || font.size <= 0.0 {
            return Err(TypemotionError::font("text size must be finite and > 0"));
        }

        let family_name = self.family_for(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(font.typeface.key.weight)),
        ));
        if let Some(spacing) = letter_spacing.filter(|s| s.is_finite()) {
            builder.push_default(parley::style::StyleProperty::LetterSpacing(spacing));
        }
        if let Some(lh) = line_height.filter(|h| h.is_finite() && *h > 0.0) {
            builder.push_default(parley::style::StyleProperty::LineHeight(
                parley::style::LineHeight::FontSizeRelative(lh),
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    fn family_for(&mut self, font: &SizedFont) -> TypemotionResult<String> {
        let key = &font.typeface.key;
        if let Some(name) = self.families.get(key) {
            return Ok(name.clone());
        }

        let registered = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.typeface.bytes.as_ref().clone()),
            None,
        );
        let family_id = registered
            .iter()
            .find(|(_, faces)| faces.iter().any(|f| f.index() == font.typeface.index))
            .or_else(|| registered.first())
            .map(|(id, _)| *id)
            .ok_or_else(|| TypemotionError::font("no font families registered from font bytes"))?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| TypemotionError::font("registered font family has no name"))?
            .to_string();

        self.families.insert(key.clone(), family_name.clone());
        Ok(family_name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
