use std::f64::consts::PI;

/// Named easing curve mapping normalized time `t` in `[0, 1]` to progress.
///
/// Elastic and back curves overshoot `[0, 1]` on purpose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuartic,
    OutQuartic,
    InOutQuartic,
    InSine,
    OutSine,
    InOutSine,
    InExponential,
    OutExponential,
    InOutExponential,
    InElastic,
    OutElastic,
    InOutElastic,
    InBounce,
    OutBounce,
    InOutBounce,
    InBack,
    OutBack,
    InOutBack,
}

const BACK_C1: f64 = 1.70158;
const BACK_C2: f64 = BACK_C1 * 1.525;
const BACK_C3: f64 = BACK_C1 + 1.0;

impl Ease {
    /// Every curve, in canonical listing order.
    pub const ALL: [Ease; 25] = [
        Self::Linear,
        Self::InQuad,
        Self::OutQuad,
        Self::InOutQuad,
        Self::InCubic,
        Self::OutCubic,
        Self::InOutCubic,
        Self::InQuartic,
        Self::OutQuartic,
        Self::InOutQuartic,
        Self::InSine,
        Self::OutSine,
        Self::InOutSine,
        Self::InExponential,
        Self::OutExponential,
        Self::InOutExponential,
        Self::InElastic,
        Self::OutElastic,
        Self::InOutElastic,
        Self::InBounce,
        Self::OutBounce,
        Self::InOutBounce,
        Self::InBack,
        Self::OutBack,
        Self::InOutBack,
    ];

    /// Canonical style-file name (`easeOutCubic`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::InQuad => "easeInQuad",
            Self::OutQuad => "easeOutQuad",
            Self::InOutQuad => "easeInOutQuad",
            Self::InCubic => "easeInCubic",
            Self::OutCubic => "easeOutCubic",
            Self::InOutCubic => "easeInOutCubic",
            Self::InQuartic => "easeInQuartic",
            Self::OutQuartic => "easeOutQuartic",
            Self::InOutQuartic => "easeInOutQuartic",
            Self::InSine => "easeInSine",
            Self::OutSine => "easeOutSine",
            Self::InOutSine => "easeInOutSine",
            Self::InExponential => "easeInExponential",
            Self::OutExponential => "easeOutExponential",
            Self::InOutExponential => "easeInOutExponential",
            Self::InElastic => "easeInElastic",
            Self::OutElastic => "easeOutElastic",
            Self::InOutElastic => "easeInOutElastic",
            Self::InBounce => "easeInBounce",
            Self::OutBounce => "easeOutBounce",
            Self::InOutBounce => "easeInOutBounce",
            Self::InBack => "easeInBack",
            Self::OutBack => "easeOutBack",
            Self::InOutBack => "easeInOutBack",
        }
    }

    /// Resolve a curve by name, ignoring case.
    ///
    /// `easeIn`, `easeOut` and `easeInOut` are cubic aliases. Unknown names resolve to
    /// [`Ease::Linear`].
    pub fn from_name(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "easein" => return Self::InCubic,
            "easeout" => return Self::OutCubic,
            "easeinout" => return Self::InOutCubic,
            _ => {}
        }
        match Self::ALL
            .iter()
            .find(|e| e.name().eq_ignore_ascii_case(&lower))
        {
            Some(e) => *e,
            None => {
                tracing::debug!(easing = name, "unknown easing, using linear");
                Self::Linear
            }
        }
    }

    /// Evaluate the curve. Input is not clamped; callers pass `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => t * (2.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => (t - 1.0).powi(3) + 1.0,
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
                }
            }
            Self::InQuartic => t.powi(4),
            Self::OutQuartic => 1.0 - (t - 1.0).powi(4),
            Self::InOutQuartic => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - 8.0 * (t - 1.0).powi(4)
                }
            }
            Self::InSine => 1.0 - (t * PI / 2.0).cos(),
            Self::OutSine => (t * PI / 2.0).sin(),
            Self::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Self::InExponential => {
                if t == 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * (t - 1.0))
                }
            }
            Self::OutExponential => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Self::InOutExponential => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::InElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    -2f64.powf(10.0 * (t - 1.0)) * ((t - 1.1) * 5.0 * PI).sin()
                }
            }
            Self::OutElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    2f64.powf(-10.0 * t) * ((t - 0.1) * 5.0 * PI).sin() + 1.0
                }
            }
            Self::InOutElastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    let wave = ((20.0 * t - 11.125) * (2.0 * PI) / 4.5).sin();
                    if t < 0.5 {
                        -(2f64.powf(20.0 * t - 10.0) * wave) / 2.0
                    } else {
                        2f64.powf(-20.0 * t + 10.0) * wave / 2.0 + 1.0
                    }
                }
            }
            Self::InBounce => 1.0 - out_bounce(1.0 - t),
            Self::OutBounce => out_bounce(t),
            Self::InOutBounce => {
                if t < 0.5 {
                    (1.0 - out_bounce(1.0 - t * 2.0)) / 2.0
                } else {
                    out_bounce(t * 2.0 - 1.0) / 2.0 + 0.5
                }
            }
            Self::InBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Self::OutBack => 1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2),
            Self::InOutBack => {
                if t < 0.5 {
                    (t * t * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    let u = t * 2.0 - 2.0;
                    (u * u * ((BACK_C2 + 1.0) * u + BACK_C2) + 2.0) / 2.0
                }
            }
        }
    }

    /// Whether the curve may leave `[0, 1]` for inputs inside it.
    pub fn overshoots(self) -> bool {
        matches!(
            self,
            Self::InElastic
                | Self::OutElastic
                | Self::InOutElastic
                | Self::InBack
                | Self::OutBack
                | Self::InOutBack
        )
    }
}

fn out_bounce(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let u = t - 1.5 / D;
        N * u * u + 0.75
    } else if t < 2.5 / D {
        let u = t - 2.25 / D;
        N * u * u + 0.9375
    } else {
        let u = t - 2.625 / D;
        N * u * u + 0.984375
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
