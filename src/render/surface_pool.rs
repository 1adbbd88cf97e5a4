use std::collections::VecDeque;

use crate::foundation::core::Resolution;
use crate::foundation::error::{TypemotionError, TypemotionResult};

/// Surface pool counters.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SurfacePoolStats {
    pub retained_surfaces: usize,
    pub alloc_surfaces: u64,
    pub reused_surfaces: u64,
    /// Surfaces released while the pool was full.
    pub dropped_on_release: u64,
    /// Times the pool was drained by a size change.
    pub invalidations: u64,
}

/// Fixed-capacity free list of CPU pixmaps for a single canvas size.
///
/// Requesting a different size drops every retained surface first.
pub(crate) struct SurfacePool {
    capacity: usize,
    size: Option<Resolution>,
    free: VecDeque<vello_cpu::Pixmap>,
    stats: SurfacePoolStats,
}

impl SurfacePool {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            size: None,
            free: VecDeque::with_capacity(capacity),
            stats: SurfacePoolStats::default(),
        }
    }

    pub(crate) fn stats(&self) -> SurfacePoolStats {
        SurfacePoolStats {
            retained_surfaces: self.free.len(),
            ..self.stats.clone()
        }
    }

    /// Take a surface of `size`, cleared to transparent.
    pub(crate) fn acquire(&mut self, size: Resolution) -> TypemotionResult<vello_cpu::Pixmap> {
        if self.size != Some(size) {
            if !self.free.is_empty() {
                tracing::debug!(
                    dropped = self.free.len(),
                    width = size.width,
                    height = size.height,
                    "surface size changed, draining pool"
                );
                self.stats.invalidations = self.stats.invalidations.saturating_add(1);
            }
            self.free.clear();
            self.size = Some(size);
        }

        if let Some(mut p) = self.free.pop_front() {
            p.data_as_u8_slice_mut().fill(0);
            self.stats.reused_surfaces = self.stats.reused_surfaces.saturating_add(1);
            return Ok(p);
        }

        let (w, h) = pixmap_dims(size)?;
        self.stats.alloc_surfaces = self.stats.alloc_surfaces.saturating_add(1);
        Ok(vello_cpu::Pixmap::new(w, h))
    }

    /// Return a surface previously acquired for `size`.
    pub(crate) fn release(&mut self, size: Resolution, pixmap: vello_cpu::Pixmap) {
        if self.size != Some(size) || self.free.len() >= self.capacity {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }
        self.free.push_back(pixmap);
    }
}

pub(crate) fn pixmap_dims(size: Resolution) -> TypemotionResult<(u16, u16)> {
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| TypemotionError::render(format!("surface width exceeds u16: {}", size.width)))?;
    let h: u16 = size.height.try_into().map_err(|_| {
        TypemotionError::render(format!("surface height exceeds u16: {}", size.height))
    })?;
    if w == 0 || h == 0 {
        return Err(TypemotionError::render("surface dimensions must be non-zero"));
    }
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface_pool.rs"]
mod tests;
