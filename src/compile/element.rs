use serde_json::Value;

use crate::animation::keyframes::Properties;
use crate::foundation::core::Rgba8;
use crate::model::color::{color_from_value, parse_color};
use crate::model::style::{EffectParams, StyleConfig, normalize_weight};

/// One drawable text unit with resolved properties at a single instant.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub text: String,
    /// Anchor x in pixels.
    pub x: f64,
    /// Anchor y in pixels.
    pub y: f64,
    pub opacity: f64,
    pub scale: f64,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    pub color: Rgba8,
    pub font_size: f32,
    pub font_family: String,
    pub font_weight: u16,
    /// Index of the word inside its segment.
    pub word_index: usize,
    /// Animated properties without a dedicated field.
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub extra: Properties,
    /// Shadow parameters, copied from the style as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<EffectParams>,
}

impl Element {
    /// Base element for `text`: canvas center, fully opaque, unscaled, style font and color.
    pub fn base(text: &str, word_index: usize, styles: &StyleConfig) -> Self {
        let center = styles.resolution.center();
        Self {
            text: text.to_string(),
            x: center.x,
            y: center.y,
            opacity: 1.0,
            scale: 1.0,
            rotation: 0.0,
            color: styles.color.as_deref().map(parse_color).unwrap_or(Rgba8::WHITE),
            font_size: styles.font_size,
            font_family: styles.font_family.clone(),
            font_weight: styles.font_weight.unwrap_or(400),
            word_index,
            extra: Properties::new(),
            shadow: styles.shadow().cloned(),
        }
    }

    /// Merge animated properties into the element. Later calls win.
    ///
    /// Values of the wrong type for a known property are ignored.
    pub fn apply(&mut self, props: &Properties) {
        for (key, value) in props {
            if value.is_null() {
                continue;
            }
            match key.as_str() {
                "x" => set_f64(&mut self.x, value),
                "y" => set_f64(&mut self.y, value),
                "opacity" => set_f64(&mut self.opacity, value),
                "scale" => set_f64(&mut self.scale, value),
                "rotation" => set_f64(&mut self.rotation, value),
                "fontSize" => {
                    if let Some(v) = value.as_f64() {
                        self.font_size = v as f32;
                    }
                }
                "color" => {
                    let c = match value {
                        Value::String(s) => Some(parse_color(s)),
                        other => color_from_value(other),
                    };
                    if let Some(c) = c {
                        self.color = c;
                    }
                }
                "fontFamily" => {
                    if let Some(s) = value.as_str() {
                        self.font_family = s.to_string();
                    }
                }
                "fontWeight" => self.font_weight = normalize_weight(value),
                "text" => {
                    if let Some(s) = value.as_str() {
                        self.text = s.to_string();
                    }
                }
                _ => {
                    self.extra.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Whether the element has something to draw.
    pub fn is_visible(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

fn set_f64(slot: &mut f64, v: &Value) {
    if let Some(n) = v.as_f64().filter(|n| n.is_finite()) {
        *slot = n;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/element.rs"]
mod tests;
