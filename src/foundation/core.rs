use crate::foundation::error::{TypemotionError, TypemotionResult};

pub use kurbo::{Affine, Vec2};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a validated resolution with both dimensions non-zero.
    pub fn new(width: u32, height: u32) -> TypemotionResult<Self> {
        let r = Self { width, height };
        r.validate()?;
        Ok(r)
    }

    /// Fail unless both dimensions are positive.
    pub fn validate(self) -> TypemotionResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TypemotionError::validation(format!(
                "resolution must have two positive dimensions, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// Canvas center, using integer division like the layout defaults.
    pub fn center(self) -> Vec2 {
        Vec2::new(f64::from(self.width / 2), f64::from(self.height / 2))
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Build a color from its four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque white, the fallback text color.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Opaque black, the default canvas color.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    /// Channels as an array in RGBA order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Scale alpha by `opacity` in `[0, 1]`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let o = opacity.clamp(0.0, 1.0);
        Self {
            a: (f64::from(self.a) * o).round().clamp(0.0, 255.0) as u8,
            ..self
        }
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from(v: [u8; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
