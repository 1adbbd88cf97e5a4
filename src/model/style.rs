use std::collections::BTreeMap;

use crate::animation::keyframes::{Keyframe, Properties};
use crate::foundation::core::{Resolution, Rgba8};
use crate::foundation::error::{TypemotionError, TypemotionResult};

/// Free-form parameter bag for one effect (`{"enabled": true, "radius": 5, ...}`).
pub type EffectParams = serde_json::Map<String, serde_json::Value>;

/// One style animation: percent-keyed keyframes applied to a selector.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Animation {
    /// Target unit. Only `"word"` animations are applied by the compiler.
    pub selector: String,
    /// Keyframes keyed by percentage strings (`"0%"`, `"50%"`, `"100%"`).
    pub keyframes: BTreeMap<String, Properties>,
    /// Duration in seconds (`> 0`).
    pub duration: f64,
    /// Easing curve name, resolved case-insensitively.
    pub easing: String,
    /// Delay in seconds after the word start.
    pub delay: f64,
    /// Extra delay per word index within its segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stagger: Option<f64>,
}

impl Animation {
    /// Build a `"word"` animation with linear easing and no delay.
    pub fn word(keyframes: BTreeMap<String, Properties>, duration: f64) -> Self {
        Self {
            selector: "word".to_string(),
            keyframes,
            duration,
            easing: "linear".to_string(),
            delay: 0.0,
            stagger: None,
        }
    }

    /// Convert percent keys to normalized keyframes sorted by time.
    pub fn normalized_keyframes(&self) -> TypemotionResult<Vec<Keyframe>> {
        let mut out = Vec::with_capacity(self.keyframes.len());
        for (key, props) in &self.keyframes {
            let pct: f64 = key.trim().trim_end_matches('%').trim().parse().map_err(|_| {
                TypemotionError::timeline(format!(
                    "keyframe key '{key}' is not a percentage (selector '{}')",
                    self.selector
                ))
            })?;
            out.push(Keyframe::new(pct / 100.0, props.clone())?);
        }
        out.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(out)
    }
}

/// Optional post-processing and decoration parameters.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectConfig {
    /// Gaussian blur parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<EffectParams>,
    /// Glow/bloom parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glow: Option<EffectParams>,
    /// Text shadow parameters, attached verbatim to every element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<EffectParams>,
    /// Color grading parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_grade: Option<EffectParams>,
}

impl EffectConfig {
    /// Return `true` when no bag is present.
    pub fn is_empty(&self) -> bool {
        self.blur.is_none()
            && self.glow.is_none()
            && self.shadow.is_none()
            && self.color_grade.is_none()
    }
}

/// Horizontal anchoring of a text element relative to its `x` coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// `x` is the left edge.
    Left,
    /// `x` is the horizontal center.
    #[default]
    Center,
    /// `x` is the right edge.
    Right,
}

impl TextAlign {
    /// Parse `left` / `center` / `right` (case-insensitive); anything else is `Center`.
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Self::Left,
            "right" | "end" => Self::Right,
            _ => Self::Center,
        }
    }
}

/// Global render parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StyleConfig {
    /// Font family name.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Output resolution.
    pub resolution: Resolution,
    /// Output frames per second.
    pub fps: u32,
    /// Canvas clear color and fallback frame color.
    pub background_color: Rgba8,
    /// Animations in declared order; later ones win on conflicting keys.
    pub animations: Vec<Animation>,
    /// Optional effect bags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<EffectConfig>,
    /// Text color string (`#RRGGBB`, `rgba(...)`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Extra spacing between letters in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f32>,
    /// Line height multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    /// Normalized font weight (100..=900).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    /// Horizontal anchoring of elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    /// Padding in em units `(horizontal, vertical)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<(f32, f32)>,
    /// Cue box corner radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f32>,
    /// Cue box background color string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cue_background: Option<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 72.0,
            resolution: Resolution::default(),
            fps: 60,
            background_color: Rgba8::BLACK,
            animations: Vec::new(),
            effects: None,
            color: None,
            letter_spacing: None,
            line_height: None,
            font_weight: None,
            text_align: None,
            padding: None,
            border_radius: None,
            cue_background: None,
        }
    }
}

impl StyleConfig {
    /// Shadow parameters, if configured.
    pub fn shadow(&self) -> Option<&EffectParams> {
        self.effects.as_ref().and_then(|e| e.shadow.as_ref())
    }
}

/// Normalize a font weight given as a number or a name.
///
/// `normal` is 400, `bold` is 700, numeric strings are taken as-is. Unknown values are 400.
pub fn normalize_weight(v: &serde_json::Value) -> u16 {
    match v {
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(|w| w.round().clamp(1.0, 1000.0) as u16)
            .unwrap_or(400),
        serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "normal" => 400,
            "bold" => 700,
            "100" => 100,
            "200" => 200,
            "300" => 300,
            "400" => 400,
            "500" => 500,
            "600" => 600,
            "700" => 700,
            "800" => 800,
            "900" => 900,
            _ => 400,
        },
        _ => 400,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/style.rs"]
mod tests;
