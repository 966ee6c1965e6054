//! GPU backend for per-pixel threshold plans.

use ditter_core::{DitherBackend, EngineError, Plan, Stage, ThresholdField, WorkingImage};

use crate::buffers::{palette_data, pixel_data, threshold_data, unpack_rgb, DitherBuffers, Uniforms};
use crate::device::{GpuAvailability, GpuContext};
use crate::error::GpuError;
use crate::pipeline::{DitherPipeline, WORKGROUP_SIZE};

/// Runs the dither step of GPU-eligible plans in one compute dispatch.
///
/// Holds one device and compiled pipeline for its whole life; buffers are
/// created per call since consecutive jobs rarely share a size.
pub struct GpuEngine {
    context: GpuContext,
    pipeline: DitherPipeline,
}

impl GpuEngine {
    pub fn new(context: GpuContext) -> Self {
        let pipeline = DitherPipeline::new(&context.device);
        Self { context, pipeline }
    }

    /// Initialize a device and compile the pipeline, blocking the caller.
    pub fn try_new() -> Result<Self, GpuError> {
        match GpuContext::try_init_blocking() {
            GpuAvailability::Available(ctx) => Ok(Self::new(ctx)),
            GpuAvailability::Unavailable(reason) => Err(GpuError::Unavailable(reason)),
        }
    }

    /// Adapter description for status output.
    pub fn adapter(&self) -> &str {
        &self.context.adapter
    }

    /// Dither `image` with `plan`, one RGB triple per pixel.
    pub async fn run(&self, image: &WorkingImage, plan: &Plan) -> Result<Vec<[u8; 3]>, GpuError> {
        let (source, mode) = match plan.stage() {
            Stage::Threshold { source, mode } if !source.is_per_image() => (source, mode),
            Stage::Threshold { .. } => return Err(GpuError::Unsupported("per-image threshold")),
            Stage::Diffuse(_) => return Err(GpuError::Unsupported("error diffusion")),
        };
        let (width, height) = (image.width, image.height);
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        let quantizer = plan.quantizer();
        let options = plan.options();
        let binary = mode.is_binary(quantizer);

        let field = match source.resolve(&image.pixels, width, height, options.seed) {
            ThresholdField::Procedural(p) if !p.is_bit_exact() => {
                ThresholdField::Procedural(p).to_per_pixel(width, height)
            }
            field => field,
        };
        let mut uniforms = Uniforms::new(width, height, quantizer, binary).with_field(&field)?;
        uniforms.bias = options.threshold_bias;
        uniforms.offset_scale = options.spread * quantizer.step() * 255.0;

        let pixels = pixel_data(image);
        self.check_limits(width, height, std::mem::size_of_val(pixels.as_slice()) as u64)?;

        let device = &self.context.device;
        let queue = &self.context.queue;
        let buffers = DitherBuffers::new(
            device,
            queue,
            &uniforms,
            &pixels,
            &threshold_data(&field),
            &palette_data(quantizer),
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ditter_threshold_bind_group"),
            layout: &self.pipeline.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffers.uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.pixels.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffers.thresholds.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: buffers.palette.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: buffers.output.as_entire_binding(),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("ditter_threshold_encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("ditter_threshold_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline.compute_pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(
                (width as u32).div_ceil(WORKGROUP_SIZE),
                (height as u32).div_ceil(WORKGROUP_SIZE),
                1,
            );
        }
        encoder.copy_buffer_to_buffer(
            &buffers.output,
            0,
            &buffers.staging,
            0,
            (buffers.pixel_count * std::mem::size_of::<u32>()) as u64,
        );
        queue.submit(std::iter::once(encoder.finish()));

        let packed = self.read_buffer_u32(&buffers.staging).await?;
        Ok(packed.into_iter().map(unpack_rgb).collect())
    }

    fn check_limits(&self, width: usize, height: usize, bytes: u64) -> Result<(), GpuError> {
        let limits = self.context.device.limits();
        let limit = u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size);
        let groups = (width.max(height) as u64).div_ceil(u64::from(WORKGROUP_SIZE));
        if bytes > limit || groups > u64::from(limits.max_compute_workgroups_per_dimension) {
            return Err(GpuError::TooLarge {
                width,
                height,
                bytes,
                limit,
            });
        }
        Ok(())
    }

    async fn read_buffer_u32(&self, buffer: &wgpu::Buffer) -> Result<Vec<u32>, GpuError> {
        let slice = buffer.slice(..);

        let (tx, rx) = futures_channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        self.context.device.poll(wgpu::Maintain::Wait);

        rx.await
            .map_err(|_| GpuError::Unavailable("Channel closed".into()))?
            .map_err(GpuError::BufferMap)?;

        let data = {
            let view = slice.get_mapped_range();
            bytemuck::cast_slice(&view).to_vec()
        };
        buffer.unmap();

        Ok(data)
    }
}

impl DitherBackend for GpuEngine {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn dither(&self, image: &WorkingImage, plan: &Plan) -> Result<Vec<[u8; 3]>, EngineError> {
        pollster::block_on(self.run(image, plan)).map_err(|e| match e {
            GpuError::Unsupported(_) => EngineError::Unsupported {
                backend: "gpu",
                strategy: plan.strategy().label(),
            },
            other => EngineError::Backend {
                backend: "gpu",
                message: other.to_string(),
            },
        })
    }
}
