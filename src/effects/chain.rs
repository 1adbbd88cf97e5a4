use crate::effects::blur::BlurEffect;
use crate::effects::color_grade::ColorGradeEffect;
use crate::effects::device::{ComputeDevice, DeviceTensor};
use crate::effects::glow::GlowEffect;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{TypemotionError, TypemotionResult};
use crate::model::color::color_from_value;
use crate::model::style::{EffectConfig, EffectParams};
use crate::render::frame::FrameRGBA;

/// One full-frame post-processing stage.
pub trait Effect: Send + Sync {
    /// Stable identifier used in logs and `describe` output.
    fn name(&self) -> &'static str;

    /// Transform a frame resident on `device`. Output dimensions must match the input.
    fn apply(&self, device: &ComputeDevice, frame: DeviceTensor) -> TypemotionResult<DeviceTensor>;

    /// Effective parameters after defaults and clamping.
    fn describe(&self) -> serde_json::Value;
}

/// Ordered effect stages applied to every rendered frame.
#[derive(Default)]
pub struct EffectChain {
    effects: Vec<Box<dyn Effect>>,
}

impl std::fmt::Debug for EffectChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl EffectChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the chain from style effect bags.
    ///
    /// Only bags with a truthy `enabled` flag produce a stage. Order is blur, glow, color grade.
    /// Shadow is drawn by the rasterizer and never becomes a stage.
    pub fn from_config(config: &EffectConfig) -> Self {
        let mut chain = Self::new();
        if let Some(p) = enabled(config.blur.as_ref()) {
            chain.push(Box::new(BlurEffect::from_params(p)));
        }
        if let Some(p) = enabled(config.glow.as_ref()) {
            chain.push(Box::new(GlowEffect::from_params(p)));
        }
        if let Some(p) = enabled(config.color_grade.as_ref()) {
            chain.push(Box::new(ColorGradeEffect::from_params(p)));
        }
        tracing::debug!(effects = ?chain.names(), "effect chain built");
        chain
    }

    pub fn push(&mut self, effect: Box<dyn Effect>) {
        self.effects.push(effect);
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.effects.iter().map(|e| e.name()).collect()
    }

    pub fn describe(&self) -> Vec<serde_json::Value> {
        self.effects.iter().map(|e| e.describe()).collect()
    }

    /// Run every stage on `frame`.
    ///
    /// Any failure, including the device transfer, is reported as [`TypemotionError::Effect`]
    /// naming the failing stage. The input frame is never modified.
    pub fn apply(&self, device: &ComputeDevice, frame: &FrameRGBA) -> TypemotionResult<FrameRGBA> {
        if self.effects.is_empty() {
            return Ok(frame.clone());
        }

        let tensor = device
            .upload(frame)
            .map_err(|e| TypemotionError::effect(format!("upload: {e}")))?;
        let tensor = match self.run_stages(device, tensor) {
            Ok(t) => t,
            Err(e) => {
                device.discard();
                return Err(e);
            }
        };
        device
            .download(&tensor)
            .map_err(|e| TypemotionError::effect(format!("download: {e}")))
    }

    fn run_stages(
        &self,
        device: &ComputeDevice,
        mut tensor: DeviceTensor,
    ) -> TypemotionResult<DeviceTensor> {
        for effect in &self.effects {
            let (w, h) = (tensor.width, tensor.height);
            tensor = effect
                .apply(device, tensor)
                .map_err(|e| TypemotionError::effect(format!("{}: {e}", effect.name())))?;
            if (tensor.width, tensor.height) != (w, h)
                || tensor.data.len() != w as usize * h as usize * 4
            {
                return Err(TypemotionError::effect(format!(
                    "{} changed frame size from {w}x{h} to {}x{}",
                    effect.name(),
                    tensor.width,
                    tensor.height
                )));
            }
        }
        Ok(tensor)
    }
}

fn enabled(params: Option<&EffectParams>) -> Option<&EffectParams> {
    let p = params?;
    let on = match p.get("enabled") {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    };
    on.then_some(p)
}

/// Numeric parameter, or `default` when missing or not a number.
pub(crate) fn param_f64(params: &EffectParams, key: &str, default: f64) -> f64 {
    params
        .get(key)
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(default)
}

pub(crate) fn param_color(params: &EffectParams, key: &str) -> Option<Rgba8> {
    params.get(key).and_then(color_from_value)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/chain.rs"]
mod tests;
