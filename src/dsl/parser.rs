use std::collections::BTreeMap;
use std::path::Path;

use crate::animation::keyframes::Properties;
use crate::foundation::core::{Resolution, Rgba8};
use crate::foundation::error::{TypemotionError, TypemotionResult};
use crate::model::color::{color_from_value, parse_color};
use crate::model::style::{
    Animation, EffectConfig, StyleConfig, TextAlign, normalize_weight,
};
use crate::model::transcript::{Segment, Transcript, Word};

/// Read and parse a transcript JSON file.
pub fn parse_transcript(path: &Path) -> TypemotionResult<Transcript> {
    let text = read_input(path, "transcript")?;
    parse_transcript_str(&text)
        .map_err(|e| TypemotionError::parse(format!("{}: {e}", path.display())))
}

/// Parse a transcript JSON document.
///
/// Both the flat `{"segments": [...]}` form and the nested
/// `{"transcription_data": {"segments": [...]}}` form are accepted.
pub fn parse_transcript_str(json: &str) -> TypemotionResult<Transcript> {
    let doc: RawTranscriptDoc = serde_json::from_str(json)
        .map_err(|e| TypemotionError::parse(format!("invalid transcript JSON: {e}")))?;
    let body = match doc.transcription_data {
        Some(nested) => nested,
        None => doc.body,
    };
    Ok(body.into_transcript())
}

/// Read and parse a style JSON file.
pub fn parse_styles(path: &Path) -> TypemotionResult<StyleConfig> {
    let text = read_input(path, "styles")?;
    parse_styles_str(&text).map_err(|e| TypemotionError::parse(format!("{}: {e}", path.display())))
}

/// Parse a style JSON document.
///
/// Global values come from `globalStyles` (or `data`); a nested `cueStyles` block overrides the
/// text appearance keys.
pub fn parse_styles_str(json: &str) -> TypemotionResult<StyleConfig> {
    let doc: RawStyleDoc = serde_json::from_str(json)
        .map_err(|e| TypemotionError::parse(format!("invalid styles JSON: {e}")))?;
    doc.into_style()
}

fn read_input(path: &Path, what: &str) -> TypemotionResult<String> {
    if !path.exists() {
        return Err(TypemotionError::parse(format!(
            "{what} file not found: {}",
            path.display()
        )));
    }
    std::fs::read_to_string(path).map_err(|e| {
        TypemotionError::parse(format!("read {what} file '{}': {e}", path.display()))
    })
}

#[derive(serde::Deserialize)]
struct RawTranscriptDoc {
    #[serde(default)]
    transcription_data: Option<RawTranscript>,
    #[serde(flatten)]
    body: RawTranscript,
}

#[derive(Default, serde::Deserialize)]
struct RawTranscript {
    #[serde(default)]
    segments: Vec<RawSegment>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl RawTranscript {
    fn into_transcript(self) -> Transcript {
        Transcript {
            segments: self.segments.into_iter().map(RawSegment::into_segment).collect(),
            duration: self.duration.unwrap_or(0.0),
            language: self.language,
            text: self.text,
        }
    }
}

#[derive(serde::Deserialize)]
struct RawSegment {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
    #[serde(default)]
    words: Vec<RawWord>,
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    speaker_id: Option<String>,
}

impl RawSegment {
    fn into_segment(self) -> Segment {
        Segment {
            text: self.text.unwrap_or_default(),
            start: self.start.unwrap_or(0.0),
            end: self.end.unwrap_or(0.0),
            words: self.words.into_iter().map(RawWord::into_word).collect(),
            id: self.id,
            speaker_id: self.speaker_id,
        }
    }
}

#[derive(serde::Deserialize)]
struct RawWord {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
    #[serde(default)]
    id: Option<i64>,
}

impl RawWord {
    fn into_word(self) -> Word {
        Word {
            text: self.text.or(self.word).unwrap_or_default(),
            start: self.start.unwrap_or(0.0),
            end: self.end.unwrap_or(0.0),
            id: self.id,
        }
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStyleDoc {
    #[serde(default)]
    global_styles: Option<RawGlobalStyles>,
    #[serde(default)]
    data: Option<RawGlobalStyles>,
    #[serde(default)]
    animations: Vec<RawAnimation>,
    #[serde(default)]
    effects: Option<EffectConfig>,
}

#[derive(Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGlobalStyles {
    font_family: Option<String>,
    font_size: Option<f32>,
    resolution: Option<Vec<i64>>,
    fps: Option<f64>,
    background_color: Option<serde_json::Value>,
    color: Option<String>,
    letter_spacing: Option<f32>,
    line_height: Option<f32>,
    font_weight: Option<serde_json::Value>,
    text_align: Option<String>,
    border_radius: Option<f32>,
    #[serde(default)]
    cue_styles: RawCueStyles,
}

#[derive(Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCueStyles {
    font_family: Option<String>,
    color: Option<String>,
    letter_spacing: Option<f32>,
    line_height: Option<f32>,
    font_weight: Option<serde_json::Value>,
    text_align: Option<String>,
    padding: Option<serde_json::Value>,
    border_radius: Option<f32>,
    background_color: Option<serde_json::Value>,
}

#[derive(serde::Deserialize)]
struct RawAnimation {
    #[serde(default = "default_selector")]
    selector: String,
    #[serde(default)]
    keyframes: BTreeMap<String, Properties>,
    #[serde(default = "default_anim_duration")]
    duration: f64,
    #[serde(default = "default_easing")]
    easing: String,
    #[serde(default)]
    delay: f64,
    #[serde(default)]
    stagger: Option<f64>,
}

fn default_selector() -> String {
    "word".to_string()
}

fn default_anim_duration() -> f64 {
    0.5
}

fn default_easing() -> String {
    "linear".to_string()
}

impl RawStyleDoc {
    fn into_style(self) -> TypemotionResult<StyleConfig> {
        let defaults = StyleConfig::default();
        let global = self.global_styles.or(self.data).unwrap_or_default();
        let cue = global.cue_styles;

        let resolution = match global.resolution {
            None => defaults.resolution,
            Some(dims) => parse_resolution(&dims)?,
        };
        let background_color = match &global.background_color {
            None => defaults.background_color,
            Some(serde_json::Value::String(s)) => parse_color(s),
            Some(v) => color_from_value(v).ok_or_else(|| {
                TypemotionError::parse(format!("backgroundColor must be a color, got {v}"))
            })?,
        };
        // Non-positive or non-finite fps maps to 0 so validation rejects it.
        let fps = match global.fps {
            None => defaults.fps,
            Some(f) if f.is_finite() && f >= 1.0 => f.round().min(f64::from(u32::MAX)) as u32,
            Some(_) => 0,
        };

        let animations = self
            .animations
            .into_iter()
            .map(|a| Animation {
                selector: a.selector,
                keyframes: a.keyframes,
                duration: a.duration,
                easing: a.easing,
                delay: a.delay,
                stagger: a.stagger,
            })
            .collect();

        Ok(StyleConfig {
            font_family: cue
                .font_family
                .or(global.font_family)
                .unwrap_or(defaults.font_family),
            font_size: global.font_size.unwrap_or(defaults.font_size),
            resolution,
            fps,
            background_color,
            animations,
            effects: self.effects.filter(|e| !e.is_empty()),
            color: cue.color.or(global.color),
            letter_spacing: cue.letter_spacing.or(global.letter_spacing),
            line_height: cue.line_height.or(global.line_height),
            font_weight: cue
                .font_weight
                .or(global.font_weight)
                .filter(|v| !v.is_null())
                .map(|v| normalize_weight(&v)),
            text_align: cue
                .text_align
                .or(global.text_align)
                .map(|s| TextAlign::from_name(&s)),
            padding: cue.padding.as_ref().and_then(parse_padding),
            border_radius: cue.border_radius.or(global.border_radius),
            cue_background: cue.background_color.as_ref().and_then(css_color_string),
        })
    }
}

fn parse_resolution(dims: &[i64]) -> TypemotionResult<Resolution> {
    let [w, h] = dims else {
        return Err(TypemotionError::parse(format!(
            "resolution must have exactly two entries, got {}",
            dims.len()
        )));
    };
    let dim = |v: i64| {
        u32::try_from(v).map_err(|_| {
            TypemotionError::parse(format!("resolution entries must be non-negative, got {v}"))
        })
    };
    // Zero dimensions are left for validation to reject.
    Ok(Resolution {
        width: dim(*w)?,
        height: dim(*h)?,
    })
}

/// Parse padding given as a number, `"0.4em 0.8em"`, or `[x, y]`.
pub(crate) fn parse_padding(v: &serde_json::Value) -> Option<(f32, f32)> {
    match v {
        serde_json::Value::Number(n) => n.as_f64().map(|p| (p as f32, p as f32)),
        serde_json::Value::String(s) => {
            let parts: Vec<&str> = s.split_whitespace().collect();
            let [x, y] = parts.as_slice() else {
                return None;
            };
            let em = |p: &str| p.trim_end_matches("em").parse::<f32>().ok();
            Some((em(x)?, em(y)?))
        }
        serde_json::Value::Array(items) if items.len() >= 2 => {
            Some((items[0].as_f64()? as f32, items[1].as_f64()? as f32))
        }
        _ => None,
    }
}

fn css_color_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        other => color_from_value(other).map(|c: Rgba8| {
            format!("rgba({},{},{},{})", c.r, c.g, c.b, f64::from(c.a) / 255.0)
        }),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dsl/parser.rs"]
mod tests;
