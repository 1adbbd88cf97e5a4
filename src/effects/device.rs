use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::EngineConfig;
use crate::foundation::error::{TypemotionError, TypemotionResult};
use crate::foundation::math::f32_to_u8;
use crate::render::frame::FrameRGBA;

/// Frame resident on a [`ComputeDevice`]: `height x width x 4` floats in `0..=255`.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceTensor {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl DeviceTensor {
    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize * 4],
        }
    }

    /// Bytes occupied by the tensor data.
    pub fn byte_len(&self) -> u64 {
        (self.data.len() as u64).saturating_mul(std::mem::size_of::<f32>() as u64)
    }

    pub(crate) fn row_len(&self) -> usize {
        self.width as usize * 4
    }
}

/// Snapshot of device memory accounting.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct MemoryInfo {
    pub device: String,
    pub ceiling_bytes: u64,
    pub in_flight_bytes: u64,
    pub peak_bytes: u64,
}

/// Compute device running effect kernels.
///
/// Only the `cpu` device (optionally `cpu:N` for `N` worker threads) is available; kernels run
/// data-parallel on a dedicated rayon pool. The memory ceiling is fixed at construction.
pub struct ComputeDevice {
    name: String,
    pool: rayon::ThreadPool,
    ceiling_bytes: u64,
    in_flight: AtomicU64,
    peak: AtomicU64,
}

impl std::fmt::Debug for ComputeDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeDevice")
            .field("name", &self.name)
            .field("threads", &self.pool.current_num_threads())
            .field("ceiling_bytes", &self.ceiling_bytes)
            .finish()
    }
}

impl ComputeDevice {
    /// Open `name` with a memory ceiling of `ceiling_bytes`.
    pub fn new(name: &str, ceiling_bytes: u64) -> TypemotionResult<Self> {
        let threads = parse_device_name(name)?;
        if ceiling_bytes == 0 {
            return Err(TypemotionError::gpu("device memory ceiling must be > 0"));
        }
        let pool = build_thread_pool(threads)?;
        tracing::info!(
            device = name,
            threads = pool.current_num_threads(),
            ceiling_bytes,
            "compute device ready"
        );
        Ok(Self {
            name: name.to_string(),
            pool,
            ceiling_bytes,
            in_flight: AtomicU64::new(0),
            peak: AtomicU64::new(0),
        })
    }

    pub fn from_config(config: &EngineConfig) -> TypemotionResult<Self> {
        Self::new(&config.device, config.max_gpu_memory_bytes())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy a frame into device memory.
    ///
    /// Fails with [`TypemotionError::Gpu`] if the tensor would exceed the memory ceiling.
    pub fn upload(&self, frame: &FrameRGBA) -> TypemotionResult<DeviceTensor> {
        let bytes = (frame.data.len() as u64).saturating_mul(std::mem::size_of::<f32>() as u64);
        if bytes > self.ceiling_bytes {
            return Err(TypemotionError::gpu(format!(
                "frame needs {bytes} bytes of device memory, ceiling is {}",
                self.ceiling_bytes
            )));
        }
        self.in_flight.store(bytes, Ordering::Relaxed);
        self.peak.fetch_max(bytes, Ordering::Relaxed);

        let data: Vec<f32> = self.install(|| {
            use rayon::prelude::*;
            frame.data.par_iter().map(|&v| f32::from(v)).collect()
        });
        Ok(DeviceTensor {
            width: frame.width,
            height: frame.height,
            data,
        })
    }

    /// Copy a tensor back to host memory, rounding and clamping to `0..=255`.
    pub fn download(&self, tensor: &DeviceTensor) -> TypemotionResult<FrameRGBA> {
        let data: Vec<u8> = self.install(|| {
            use rayon::prelude::*;
            tensor.data.par_iter().map(|&v| f32_to_u8(v)).collect()
        });
        self.in_flight.store(0, Ordering::Relaxed);
        FrameRGBA::new(tensor.width, tensor.height, data)
            .map_err(|e| TypemotionError::gpu(format!("download: {e}")))
    }

    /// Drop the resident frame without copying it back.
    pub(crate) fn discard(&self) {
        self.in_flight.store(0, Ordering::Relaxed);
    }

    /// Run `f` on the device's worker pool.
    pub fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        self.pool.install(f)
    }

    pub fn memory_info(&self) -> MemoryInfo {
        MemoryInfo {
            device: self.name.clone(),
            ceiling_bytes: self.ceiling_bytes,
            in_flight_bytes: self.in_flight.load(Ordering::Relaxed),
            peak_bytes: self.peak.load(Ordering::Relaxed),
        }
    }
}

/// `cpu` -> default threads, `cpu:N` -> `N` threads, anything else is unavailable.
fn parse_device_name(name: &str) -> TypemotionResult<Option<usize>> {
    let name = name.trim().to_ascii_lowercase();
    match name.split_once(':') {
        None if name == "cpu" => Ok(None),
        Some(("cpu", n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(TypemotionError::gpu(format!(
                "invalid cpu thread count in device '{name}'"
            ))),
        },
        _ => Err(TypemotionError::gpu(format!(
            "compute device '{name}' is not available (supported: cpu, cpu:N)"
        ))),
    }
}

fn build_thread_pool(threads: Option<usize>) -> TypemotionResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| TypemotionError::gpu(format!("failed to build compute thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/device.rs"]
mod tests;
