use crate::foundation::core::Resolution;
use crate::foundation::error::{TypemotionError, TypemotionResult};
use crate::render::frame::FrameRGBA;

/// Destination for rendered frames.
///
/// Frames arrive strictly in index order starting at 0 and must match the sink's resolution.
/// `finish` flushes and closes the sink; calling it twice is a no-op.
pub trait FrameSink {
    fn write_frame(&mut self, index: u64, frame: &FrameRGBA) -> TypemotionResult<()>;

    fn finish(&mut self) -> TypemotionResult<()>;
}

/// Enforces the ordering and size contract shared by every sink.
#[derive(Clone, Debug)]
pub(crate) struct FrameOrder {
    resolution: Resolution,
    next: u64,
}

impl FrameOrder {
    pub(crate) fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            next: 0,
        }
    }

    pub(crate) fn check(&self, index: u64, frame: &FrameRGBA) -> TypemotionResult<()> {
        if index != self.next {
            return Err(TypemotionError::encoding(format!(
                "frame {index} written out of order, expected frame {}",
                self.next
            )));
        }
        if frame.resolution() != self.resolution || frame.data.len() != self.resolution.rgba_len()
        {
            return Err(TypemotionError::encoding(format!(
                "frame {index} is {}x{}, encoder expects {}x{}",
                frame.width, frame.height, self.resolution.width, self.resolution.height
            )));
        }
        Ok(())
    }

    pub(crate) fn advance(&mut self) {
        self.next += 1;
    }

    pub(crate) fn written(&self) -> u64 {
        self.next
    }
}

/// Sink that keeps every frame in memory.
#[derive(Debug)]
pub struct InMemorySink {
    order: FrameOrder,
    frames: Vec<FrameRGBA>,
    finished: bool,
}

impl InMemorySink {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            order: FrameOrder::new(resolution),
            frames: Vec::new(),
            finished: false,
        }
    }

    pub fn frames(&self) -> &[FrameRGBA] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<FrameRGBA> {
        self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn write_frame(&mut self, index: u64, frame: &FrameRGBA) -> TypemotionResult<()> {
        if self.finished {
            return Err(TypemotionError::encoding("sink is already finished"));
        }
        self.order.check(index, frame)?;
        self.frames.push(frame.clone());
        self.order.advance();
        Ok(())
    }

    fn finish(&mut self) -> TypemotionResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
