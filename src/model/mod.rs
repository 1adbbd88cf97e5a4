pub(crate) mod color;
pub(crate) mod style;
pub(crate) mod transcript;
