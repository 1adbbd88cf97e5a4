use rayon::prelude::*;

use crate::effects::blur::{clamp_radius, gaussian_blur};
use crate::effects::chain::{Effect, param_color, param_f64};
use crate::effects::device::{ComputeDevice, DeviceTensor};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{TypemotionError, TypemotionResult};
use crate::model::style::EffectParams;

pub const DEFAULT_GLOW_INTENSITY: f64 = 0.3;
pub const DEFAULT_GLOW_THRESHOLD: f64 = 0.8;
pub const DEFAULT_GLOW_RADIUS: u32 = 10;
pub const DEFAULT_GLOW_COLOR: Rgba8 = Rgba8::new(255, 200, 100, 255);

/// Bloom around bright pixels.
///
/// Pixels whose RGB mean exceeds `threshold` (as a fraction of 255) are blurred, tinted by
/// `color` and added back scaled by `intensity`.
#[derive(Clone, Debug, PartialEq)]
pub struct GlowEffect {
    intensity: f32,
    threshold: f32,
    radius: u32,
    color: Rgba8,
}

impl GlowEffect {
    pub fn new(intensity: f64, threshold: f64, radius: f64, color: Rgba8) -> Self {
        Self {
            intensity: clamp_unit(intensity) as f32,
            threshold: clamp_unit(threshold) as f32,
            radius: clamp_radius(radius),
            color,
        }
    }

    pub fn from_params(params: &EffectParams) -> Self {
        Self::new(
            param_f64(params, "intensity", DEFAULT_GLOW_INTENSITY),
            param_f64(params, "threshold", DEFAULT_GLOW_THRESHOLD),
            param_f64(params, "radius", f64::from(DEFAULT_GLOW_RADIUS)),
            param_color(params, "color").unwrap_or(DEFAULT_GLOW_COLOR),
        )
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn color(&self) -> Rgba8 {
        self.color
    }
}

impl Effect for GlowEffect {
    fn name(&self) -> &'static str {
        "glow"
    }

    fn apply(&self, device: &ComputeDevice, frame: DeviceTensor) -> TypemotionResult<DeviceTensor> {
        let expected = frame.width as usize * frame.height as usize * 4;
        if frame.data.len() != expected {
            return Err(TypemotionError::effect(format!(
                "glow input is {} floats, expected {expected}",
                frame.data.len()
            )));
        }

        let cutoff = self.threshold * 255.0;
        let bright = DeviceTensor {
            width: frame.width,
            height: frame.height,
            data: device.install(|| {
                frame
                    .data
                    .par_chunks(4)
                    .flat_map_iter(|px| {
                        let mean = (px[0] + px[1] + px[2]) / 3.0;
                        let keep = if mean > cutoff { 1.0 } else { 0.0 };
                        px.iter().map(move |&v| v * keep)
                    })
                    .collect()
            }),
        };
        let blurred = gaussian_blur(device, &bright, self.radius)?;

        let k = self.intensity;
        let tint = [
            k * f32::from(self.color.r) / 255.0,
            k * f32::from(self.color.g) / 255.0,
            k * f32::from(self.color.b) / 255.0,
            k,
        ];
        let mut out = frame;
        device.install(|| {
            out.data
                .par_chunks_mut(4)
                .zip(blurred.data.par_chunks(4))
                .for_each(|(px, glow)| {
                    for c in 0..4 {
                        px[c] = (px[c] + glow[c] * tint[c]).clamp(0.0, 255.0);
                    }
                });
        });
        Ok(out)
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name(),
            "intensity": self.intensity,
            "threshold": self.threshold,
            "radius": self.radius,
            "color": [self.color.r, self.color.g, self.color.b],
        })
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/glow.rs"]
mod tests;
