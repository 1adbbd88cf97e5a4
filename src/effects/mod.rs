pub(crate) mod blur;
pub(crate) mod chain;
pub(crate) mod color_grade;
pub(crate) mod device;
pub(crate) mod glow;
