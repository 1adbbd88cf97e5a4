use crate::foundation::error::{TypemotionError, TypemotionResult};
use crate::model::style::StyleConfig;
use crate::model::transcript::{Segment, Transcript};

const MIN_SEGMENT_SPAN: f64 = 0.1;
const MIN_WORD_SPAN: f64 = 0.01;

/// Return a repaired copy of `transcript` with consistent segment/word timing.
///
/// Repairs, in order, per segment:
/// - negative starts clamp to 0;
/// - segments without words are dropped;
/// - degenerate segment ranges are rebuilt from word bounds (padded if still empty);
/// - inverted words get `start + 0.01`;
/// - segment bounds expand to cover every word;
/// - zero-length words are padded, never past the expanded segment end.
///
/// Fails if the input has no segments or none survive. Validating an already valid
/// transcript returns an equal value.
pub fn validate_transcript(transcript: &Transcript) -> TypemotionResult<Transcript> {
    if transcript.segments.is_empty() {
        return Err(TypemotionError::validation(
            "transcript must have at least one segment",
        ));
    }
    if !transcript.duration.is_finite() || transcript.duration < 0.0 {
        return Err(TypemotionError::validation(format!(
            "transcript duration must be a non-negative number, got {}",
            transcript.duration
        )));
    }

    let segments: Vec<Segment> = transcript
        .segments
        .iter()
        .enumerate()
        .filter_map(|(i, seg)| repair_segment(i, seg))
        .collect();

    if segments.is_empty() {
        return Err(TypemotionError::validation(
            "no valid segments found in transcript",
        ));
    }

    Ok(Transcript {
        segments,
        duration: transcript.duration,
        language: transcript.language.clone(),
        text: transcript.text.clone(),
    })
}

fn repair_segment(i: usize, src: &Segment) -> Option<Segment> {
    let mut seg = src.clone();

    if seg.start < 0.0 {
        tracing::warn!(segment = i, start = seg.start, "negative segment start, clamping to 0");
        seg.start = 0.0;
    }
    if seg.words.is_empty() {
        tracing::warn!(segment = i, "segment has no words, dropping");
        return None;
    }

    if seg.end <= seg.start {
        seg.start = seg.words.iter().map(|w| w.start).fold(f64::INFINITY, f64::min);
        seg.end = seg.words.iter().map(|w| w.end).fold(f64::NEG_INFINITY, f64::max);
        if seg.end <= seg.start {
            seg.end = seg.start + MIN_SEGMENT_SPAN;
        }
        tracing::warn!(
            segment = i,
            start = seg.start,
            end = seg.end,
            "segment had an empty time range, rebuilt from words"
        );
    }

    for (j, word) in seg.words.iter_mut().enumerate() {
        if word.end < word.start {
            tracing::warn!(segment = i, word = j, "word ends before it starts, padding");
            word.end = word.start + MIN_WORD_SPAN;
        }
    }

    // Zero-length words pad against the expanded end, not the end seen so far.
    seg.end = seg.words.iter().map(|w| w.end).fold(seg.end, f64::max);
    seg.start = seg.words.iter().map(|w| w.start).fold(seg.start, f64::min);
    for word in seg.words.iter_mut().filter(|w| w.end == w.start) {
        word.end = (word.start + MIN_WORD_SPAN).min(seg.end);
    }

    Some(seg)
}

/// Check global style parameters and animation definitions.
pub fn validate_styles(styles: &StyleConfig) -> TypemotionResult<()> {
    if styles.fps == 0 {
        return Err(TypemotionError::validation("fps must be positive"));
    }
    if !(styles.font_size.is_finite() && styles.font_size > 0.0) {
        return Err(TypemotionError::validation(format!(
            "font size must be positive, got {}",
            styles.font_size
        )));
    }
    styles.resolution.validate()?;

    for anim in &styles.animations {
        if !(anim.duration.is_finite() && anim.duration > 0.0) {
            return Err(TypemotionError::validation(format!(
                "animation duration must be positive: {}",
                anim.selector
            )));
        }
        if anim.keyframes.is_empty() {
            return Err(TypemotionError::validation(format!(
                "animation must have keyframes: {}",
                anim.selector
            )));
        }
        if anim.delay < 0.0 {
            return Err(TypemotionError::validation(format!(
                "animation delay must be non-negative: {}",
                anim.selector
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/dsl/validate.rs"]
mod tests;
