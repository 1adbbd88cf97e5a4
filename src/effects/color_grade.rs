use rayon::prelude::*;

use crate::effects::chain::{Effect, param_f64};
use crate::effects::device::{ComputeDevice, DeviceTensor};
use crate::foundation::error::TypemotionResult;
use crate::model::style::EffectParams;

/// Per-pixel brightness, contrast and saturation adjustment of the RGB channels.
///
/// `brightness` is an offset in `-1..=1` (fraction of full scale), `contrast` scales around
/// mid-grey and `saturation` mixes towards Rec.601 luma. Alpha is untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorGradeEffect {
    brightness: f32,
    contrast: f32,
    saturation: f32,
}

impl Default for ColorGradeEffect {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 1.0,
            saturation: 1.0,
        }
    }
}

impl ColorGradeEffect {
    pub fn new(brightness: f64, contrast: f64, saturation: f64) -> Self {
        let finite = |v: f64, d: f64| if v.is_finite() { v } else { d };
        Self {
            brightness: finite(brightness, 0.0).clamp(-1.0, 1.0) as f32,
            contrast: finite(contrast, 1.0).clamp(0.0, 4.0) as f32,
            saturation: finite(saturation, 1.0).clamp(0.0, 4.0) as f32,
        }
    }

    pub fn from_params(params: &EffectParams) -> Self {
        Self::new(
            param_f64(params, "brightness", 0.0),
            param_f64(params, "contrast", 1.0),
            param_f64(params, "saturation", 1.0),
        )
    }

    fn grade(&self, px: &mut [f32]) {
        let offset = self.brightness * 255.0;
        let mut rgb = [px[0], px[1], px[2]];
        for c in &mut rgb {
            *c = (*c - 127.5) * self.contrast + 127.5 + offset;
        }
        let luma = 0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2];
        for (dst, c) in px.iter_mut().zip(rgb) {
            *dst = (luma + (c - luma) * self.saturation).clamp(0.0, 255.0);
        }
    }
}

impl Effect for ColorGradeEffect {
    fn name(&self) -> &'static str {
        "colorGrade"
    }

    fn apply(
        &self,
        device: &ComputeDevice,
        mut frame: DeviceTensor,
    ) -> TypemotionResult<DeviceTensor> {
        if *self == Self::default() {
            return Ok(frame);
        }
        device.install(|| frame.data.par_chunks_mut(4).for_each(|px| self.grade(px)));
        Ok(frame)
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name(),
            "brightness": self.brightness,
            "contrast": self.contrast,
            "saturation": self.saturation,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/color_grade.rs"]
mod tests;
