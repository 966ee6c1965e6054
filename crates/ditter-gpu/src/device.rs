//! GPU device initialization and capability detection.

use crate::error::GpuError;

/// Holds the wgpu device and queue.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// Adapter name and backend, for status output.
    pub adapter: String,
}

/// Result of GPU initialization attempt.
pub enum GpuAvailability {
    Available(GpuContext),
    Unavailable(String),
}

impl GpuContext {
    /// Attempt to initialize GPU. Returns Unavailable on any failure.
    pub async fn try_init() -> GpuAvailability {
        match Self::init_internal().await {
            Ok(ctx) => GpuAvailability::Available(ctx),
            Err(e) => {
                tracing::warn!("GPU initialization failed: {e}");
                GpuAvailability::Unavailable(e.to_string())
            }
        }
    }

    /// Blocking form of [`try_init`](Self::try_init).
    pub fn try_init_blocking() -> GpuAvailability {
        pollster::block_on(Self::try_init())
    }

    async fn init_internal() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        tracing::info!(name = %info.name, backend = ?info.backend, "GPU adapter");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("ditter"),
                    required_features: wgpu::Features::empty(),
                    // Storage buffers are required, so take the adapter's
                    // limits rather than the downlevel defaults.
                    required_limits: adapter.limits(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        Ok(Self {
            device,
            queue,
            adapter: format!("{} ({:?})", info.name, info.backend),
        })
    }
}
