use crate::foundation::core::{Resolution, Rgba8};
use crate::foundation::error::{TypemotionError, TypemotionResult};

/// Tightly packed straight-alpha RGBA8 frame, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Wrap `data`, checking that it holds exactly `width * height` pixels.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> TypemotionResult<Self> {
        let expected = Resolution { width, height }.rgba_len();
        if data.len() != expected {
            return Err(TypemotionError::render(format!(
                "frame buffer is {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Frame filled with a single color.
    pub fn solid(resolution: Resolution, color: Rgba8) -> Self {
        let px = color.to_array();
        let mut data = Vec::with_capacity(resolution.rgba_len());
        for _ in 0..(resolution.width as usize * resolution.height as usize) {
            data.extend_from_slice(&px);
        }
        Self {
            width: resolution.width,
            height: resolution.height,
            data,
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.width,
            height: self.height,
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
