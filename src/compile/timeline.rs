use crate::animation::ease::Ease;
use crate::animation::keyframes::KeyframeInterpolator;
use crate::compile::element::Element;
use crate::dsl::validate::validate_styles;
use crate::foundation::core::Resolution;
use crate::foundation::error::TypemotionResult;
use crate::model::style::{Animation, StyleConfig};
use crate::model::transcript::Transcript;

/// Drawable elements at one output instant.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Frame {
    pub index: usize,
    /// Seconds from the start of the output (`index / fps`).
    pub timestamp: f64,
    pub elements: Vec<Element>,
}

/// Compiled render plan: one [`Frame`] per output frame at a fixed `1 / fps` cadence.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Timeline {
    pub frames: Vec<Frame>,
    pub duration: f64,
    pub fps: u32,
    pub resolution: Resolution,
    pub styles: StyleConfig,
}

impl Timeline {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Total element count over every frame.
    pub fn element_count(&self) -> usize {
        self.frames.iter().map(|f| f.elements.len()).sum()
    }
}

/// Number of frames for `duration` seconds at `fps`: `floor(duration * fps) + 1`.
pub fn frame_count(duration: f64, fps: u32) -> usize {
    let n = (duration.max(0.0) * f64::from(fps)).floor();
    if n.is_finite() { n as usize + 1 } else { 1 }
}

/// Word animation ready to sample.
struct CompiledAnimation {
    interpolator: KeyframeInterpolator,
    duration: f64,
    delay: f64,
    stagger: f64,
}

impl CompiledAnimation {
    fn new(anim: &Animation) -> TypemotionResult<Self> {
        let keyframes = anim.normalized_keyframes()?;
        Ok(Self {
            interpolator: KeyframeInterpolator::new(keyframes, Ease::from_name(&anim.easing))?,
            duration: anim.duration,
            delay: anim.delay,
            stagger: anim.stagger.unwrap_or(0.0),
        })
    }

    fn apply(&self, element: &mut Element, word_start: f64, timestamp: f64) {
        let delay = self.delay + self.stagger * element.word_index as f64;
        let progress = ((timestamp - word_start - delay) / self.duration).clamp(0.0, 1.0);
        if progress < 1.0 {
            element.apply(&self.interpolator.interpolate(progress));
        } else {
            // Hold the 100% keyframe; base defaults must not reappear once the animation ends.
            element.apply(self.interpolator.terminal());
        }
    }
}

/// A word's activation window: the intersection of its own and its segment's bounds.
struct Activation<'a> {
    start: f64,
    end: f64,
    word_start: f64,
    word_index: usize,
    text: &'a str,
}

/// Compile a validated transcript and style into a [`Timeline`].
///
/// A word is active at `t` when both it and its segment contain `t` (inclusive). Active words
/// appear in segment order, then word order. Only `"word"` animations are applied, in declared
/// order.
#[tracing::instrument(skip_all, fields(duration = transcript.duration, fps = styles.fps))]
pub fn compile_timeline(transcript: &Transcript, styles: &StyleConfig) -> TypemotionResult<Timeline> {
    validate_styles(styles)?;

    let mut animations = Vec::with_capacity(styles.animations.len());
    for anim in &styles.animations {
        if anim.selector != "word" {
            tracing::debug!(selector = %anim.selector, "skipping non-word animation");
            continue;
        }
        animations.push(CompiledAnimation::new(anim)?);
    }

    let activations: Vec<Activation<'_>> = transcript
        .segments
        .iter()
        .flat_map(|seg| {
            seg.words.iter().enumerate().map(move |(i, w)| Activation {
                start: seg.start.max(w.start),
                end: seg.end.min(w.end),
                word_start: w.start,
                word_index: i,
                text: w.text.as_str(),
            })
        })
        .filter(|a| a.start <= a.end)
        .collect();

    let mut by_start: Vec<usize> = (0..activations.len()).collect();
    by_start.sort_by(|&a, &b| activations[a].start.total_cmp(&activations[b].start));

    let fps = f64::from(styles.fps);
    let total = frame_count(transcript.duration, styles.fps);
    let mut frames = Vec::with_capacity(total);
    let mut next = 0usize;
    let mut active: Vec<usize> = Vec::new();

    for index in 0..total {
        let timestamp = index as f64 / fps;

        while next < by_start.len() && activations[by_start[next]].start <= timestamp {
            active.push(by_start[next]);
            next += 1;
        }
        active.retain(|&i| activations[i].end >= timestamp);
        active.sort_unstable();

        let elements = active
            .iter()
            .map(|&i| {
                let a = &activations[i];
                let mut element = Element::base(a.text, a.word_index, styles);
                for anim in &animations {
                    anim.apply(&mut element, a.word_start, timestamp);
                }
                element
            })
            .collect();

        frames.push(Frame {
            index,
            timestamp,
            elements,
        });
    }

    tracing::info!(
        frames = frames.len(),
        words = activations.len(),
        animations = animations.len(),
        "compiled timeline"
    );

    Ok(Timeline {
        frames,
        duration: transcript.duration,
        fps: styles.fps,
        resolution: styles.resolution,
        styles: styles.clone(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compile/timeline.rs"]
mod tests;
