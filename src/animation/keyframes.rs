use std::collections::BTreeMap;

use serde_json::Value;

use crate::animation::ease::Ease;
use crate::foundation::error::{TypemotionError, TypemotionResult};

/// Animated property bag (`{"opacity": 0.5, "color": [255, 0, 0]}`).
///
/// `null` values are treated as absent.
pub type Properties = BTreeMap<String, Value>;

/// Property snapshot at normalized time `time` in `[0, 1]`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    pub time: f64,
    pub properties: Properties,
}

impl Keyframe {
    /// Build a keyframe, rejecting times outside `[0, 1]`.
    pub fn new(time: f64, properties: Properties) -> TypemotionResult<Self> {
        if !(0.0..=1.0).contains(&time) {
            return Err(TypemotionError::timeline(format!(
                "keyframe time must be within [0, 1], got {time}"
            )));
        }
        Ok(Self { time, properties })
    }
}

/// Interpolates between sorted keyframes after applying an easing curve.
#[derive(Clone, Debug)]
pub struct KeyframeInterpolator {
    keyframes: Vec<Keyframe>,
    ease: Ease,
}

impl KeyframeInterpolator {
    /// Sort `keyframes` and check that they span exactly `0.0..=1.0`.
    pub fn new(mut keyframes: Vec<Keyframe>, ease: Ease) -> TypemotionResult<Self> {
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        let (Some(first), Some(last)) = (keyframes.first(), keyframes.last()) else {
            return Err(TypemotionError::timeline("at least one keyframe is required"));
        };
        if first.time != 0.0 {
            return Err(TypemotionError::timeline(format!(
                "first keyframe must be at 0%, got {}%",
                first.time * 100.0
            )));
        }
        if last.time != 1.0 {
            return Err(TypemotionError::timeline(format!(
                "last keyframe must be at 100%, got {}%",
                last.time * 100.0
            )));
        }
        if ease.overshoots() {
            tracing::debug!(
                ease = ease.name(),
                "overshooting ease, eased times past 100% hold the last keyframe"
            );
        }
        Ok(Self { keyframes, ease })
    }

    pub fn ease(&self) -> Ease {
        self.ease
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Properties of the 100% keyframe.
    pub fn terminal(&self) -> &Properties {
        // `new` guarantees at least one keyframe.
        &self.keyframes[self.keyframes.len() - 1].properties
    }

    /// Properties at normalized time `t` (clamped to `[0, 1]` before easing).
    ///
    /// The eased time is not clamped again. If it lands outside every keyframe span, the last
    /// keyframe's properties are returned as-is.
    pub fn interpolate(&self, t: f64) -> Properties {
        let eased = self.ease.apply(t.clamp(0.0, 1.0));

        for pair in self.keyframes.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.time <= eased && eased <= b.time {
                let span = b.time - a.time;
                let local = if span != 0.0 { (eased - a.time) / span } else { 0.0 };
                return merge_properties(&a.properties, &b.properties, local);
            }
        }
        self.terminal().clone()
    }
}

fn merge_properties(from: &Properties, to: &Properties, t: f64) -> Properties {
    let mut out = Properties::new();
    for key in from.keys().chain(to.keys()) {
        if out.contains_key(key) {
            continue;
        }
        let a = from.get(key).filter(|v| !v.is_null());
        let b = to.get(key).filter(|v| !v.is_null());
        let v = match (a, b) {
            (Some(a), Some(b)) => interpolate_value(a, b, t),
            (Some(v), None) | (None, Some(v)) => v.clone(),
            (None, None) => continue,
        };
        out.insert(key.clone(), v);
    }
    out
}

fn interpolate_value(a: &Value, b: &Value, t: f64) -> Value {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) if t <= 0.0 => a.clone(),
        (Value::Number(_), Value::Number(_)) if t >= 1.0 => b.clone(),
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => Value::from(x + (y - x) * t),
            _ => b.clone(),
        },
        (Value::Array(xs), Value::Array(ys)) if xs.len() == ys.len() => Value::Array(
            xs.iter()
                .zip(ys)
                .map(|(x, y)| interpolate_value(x, y, t))
                .collect(),
        ),
        (Value::String(_), _) | (_, Value::String(_)) => {
            if t > 0.5 {
                b.clone()
            } else {
                a.clone()
            }
        }
        _ => b.clone(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframes.rs"]
mod tests;
