use crate::foundation::error::{TypemotionError, TypemotionResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// Blend the text layer over a background frame of the same size.
///
/// The text layer's alpha is the blend weight, and it also becomes the output alpha.
pub fn composite_over_background(
    text: &FrameRGBA,
    background: &FrameRGBA,
) -> TypemotionResult<FrameRGBA> {
    if text.resolution() != background.resolution() || text.data.len() != background.data.len() {
        return Err(TypemotionError::render(format!(
            "cannot composite {}x{} text over {}x{} background",
            text.width, text.height, background.width, background.height
        )));
    }

    let mut out = Vec::with_capacity(text.data.len());
    for (t, b) in text.data.chunks_exact(4).zip(background.data.chunks_exact(4)) {
        let a = u16::from(t[3]);
        let inv = 255 - a;
        for c in 0..3 {
            let v = mul_div255_u16(u16::from(t[c]), a) + mul_div255_u16(u16::from(b[c]), inv);
            out.push(v.min(255) as u8);
        }
        out.push(t[3]);
    }
    FrameRGBA::new(text.width, text.height, out)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/composite.rs"]
mod tests;
