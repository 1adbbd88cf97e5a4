/// Convenience result type used across typemotion.
pub type TypemotionResult<T> = Result<T, TypemotionError>;

/// Top-level error taxonomy used by engine APIs.
///
/// `Render`, `Font` and `Effect` are raised at frame granularity and are degraded locally by the
/// render loop. Every other variant is terminal for the operation that produced it.
#[derive(thiserror::Error, Debug)]
pub enum TypemotionError {
    /// Malformed transcript or style input.
    #[error("parse error: {0}")]
    Parse(String),

    /// Timing or configuration data that could not be repaired.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure while compiling a timeline (for example an animation without 0%/100% keys).
    #[error("timeline error: {0}")]
    Timeline(String),

    /// Failure while rasterizing or compositing a single frame.
    #[error("render error: {0}")]
    Render(String),

    /// Font resolution or loading failure.
    #[error("font error: {0}")]
    Font(String),

    /// Failure inside one post-processing effect stage.
    #[error("effect error: {0}")]
    Effect(String),

    /// Compute device unavailable or device memory transfer failure.
    #[error("gpu error: {0}")]
    Gpu(String),

    /// Encoder lifecycle failure (spawn, pipe write, finalize, missing output).
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TypemotionError {
    /// Build a [`TypemotionError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`TypemotionError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TypemotionError::Timeline`] value.
    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }

    /// Build a [`TypemotionError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TypemotionError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`TypemotionError::Effect`] value.
    pub fn effect(msg: impl Into<String>) -> Self {
        Self::Effect(msg.into())
    }

    /// Build a [`TypemotionError::Gpu`] value.
    pub fn gpu(msg: impl Into<String>) -> Self {
        Self::Gpu(msg.into())
    }

    /// Build a [`TypemotionError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Whether the render loop may substitute a fallback for this error and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Render(_) | Self::Font(_) | Self::Effect(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
