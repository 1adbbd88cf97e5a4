pub(crate) mod font_cache;
pub(crate) mod frame;
pub(crate) mod rasterizer;
pub(crate) mod surface_pool;
pub(crate) mod text;
