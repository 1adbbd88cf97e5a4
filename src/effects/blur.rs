use rayon::prelude::*;

use crate::effects::chain::{Effect, param_f64};
use crate::effects::device::{ComputeDevice, DeviceTensor};
use crate::foundation::error::{TypemotionError, TypemotionResult};
use crate::model::style::EffectParams;

pub const MAX_BLUR_RADIUS: u32 = 50;
pub const DEFAULT_BLUR_RADIUS: u32 = 5;

/// Full-frame gaussian blur, `sigma = radius / 3`.
#[derive(Clone, Debug, PartialEq)]
pub struct BlurEffect {
    radius: u32,
}

impl BlurEffect {
    /// Radius is clamped to `0..=50`; zero is the identity.
    pub fn new(radius: f64) -> Self {
        Self {
            radius: clamp_radius(radius),
        }
    }

    pub fn from_params(params: &EffectParams) -> Self {
        Self::new(param_f64(params, "radius", f64::from(DEFAULT_BLUR_RADIUS)))
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }
}

impl Effect for BlurEffect {
    fn name(&self) -> &'static str {
        "blur"
    }

    fn apply(&self, device: &ComputeDevice, frame: DeviceTensor) -> TypemotionResult<DeviceTensor> {
        gaussian_blur(device, &frame, self.radius)
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({ "name": self.name(), "radius": self.radius })
    }
}

pub(crate) fn clamp_radius(radius: f64) -> u32 {
    if !radius.is_finite() {
        return 0;
    }
    radius.round().clamp(0.0, f64::from(MAX_BLUR_RADIUS)) as u32
}

/// Normalized 1D gaussian weights for `-radius..=radius`.
pub(crate) fn gaussian_kernel(radius: u32) -> Vec<f32> {
    if radius == 0 {
        return vec![1.0];
    }
    let sigma = f64::from(radius) / 3.0;
    let denom = 2.0 * sigma * sigma;
    let r = radius as i32;
    let weights: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| (w / sum) as f32).collect()
}

/// Separable gaussian blur over all four channels. Samples outside the frame count as zero.
pub(crate) fn gaussian_blur(
    device: &ComputeDevice,
    src: &DeviceTensor,
    radius: u32,
) -> TypemotionResult<DeviceTensor> {
    let expected = src.width as usize * src.height as usize * 4;
    if src.data.len() != expected {
        return Err(TypemotionError::effect(format!(
            "blur input is {} floats, expected {expected}",
            src.data.len()
        )));
    }
    if radius == 0 || expected == 0 {
        return Ok(src.clone());
    }

    let kernel = gaussian_kernel(radius);
    let mut tmp = DeviceTensor::zeros(src.width, src.height);
    let mut out = DeviceTensor::zeros(src.width, src.height);
    device.install(|| {
        horizontal_pass(src, &mut tmp, &kernel);
        vertical_pass(&tmp, &mut out, &kernel);
    });
    Ok(out)
}

fn horizontal_pass(src: &DeviceTensor, dst: &mut DeviceTensor, k: &[f32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(src.width);
    let row_len = src.row_len();
    dst.data
        .par_chunks_mut(row_len)
        .zip(src.data.par_chunks(row_len))
        .for_each(|(out_row, in_row)| {
            for x in 0..w {
                let mut acc = [0.0f32; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = x + ki as i64 - radius;
                    if sx < 0 || sx >= w {
                        continue;
                    }
                    let idx = sx as usize * 4;
                    for c in 0..4 {
                        acc[c] += kw * in_row[idx + c];
                    }
                }
                let o = x as usize * 4;
                out_row[o..o + 4].copy_from_slice(&acc);
            }
        });
}

fn vertical_pass(src: &DeviceTensor, dst: &mut DeviceTensor, k: &[f32]) {
    let radius = (k.len() / 2) as i64;
    let h = i64::from(src.height);
    let row_len = src.row_len();
    dst.data
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, out_row)| {
            for (ki, &kw) in k.iter().enumerate() {
                let sy = y as i64 + ki as i64 - radius;
                if sy < 0 || sy >= h {
                    continue;
                }
                let start = sy as usize * row_len;
                let in_row = &src.data[start..start + row_len];
                for (o, &v) in out_row.iter_mut().zip(in_row) {
                    *o += kw * v;
                }
            }
        });
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
