//! GPU buffer management for the threshold shader.

use bytemuck::{Pod, Zeroable};
use ditter_core::color::luma;
use ditter_core::{Procedural, Quantizer, ThresholdField, WorkingImage};

use crate::error::GpuError;

pub const FIELD_TILED: u32 = 0;
pub const FIELD_PROCEDURAL: u32 = 1;
pub const FIELD_CONSTANT: u32 = 2;
pub const FIELD_PER_PIXEL: u32 = 3;

/// Uniform block, laid out to match `Params` in `threshold.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub width: u32,
    pub height: u32,
    pub binary: u32,
    pub field_kind: u32,

    pub matrix_size: u32,
    pub levels: u32,
    /// 0 when quantizing to levels.
    pub palette_len: u32,
    pub proc_kind: u32,

    pub proc_seed: u32,
    pub proc_count: u32,
    pub dark_rgb: u32,
    pub light_rgb: u32,

    pub proc_a: f32,
    pub proc_b: f32,
    pub proc_c: f32,
    pub constant: f32,

    pub bias: f32,
    pub offset_scale: f32,
    /// [`Quantizer::level_factors`], unused with a palette.
    pub to_level: f32,
    pub from_level: f32,
}

impl Uniforms {
    /// Quantizer-dependent part of the block.
    pub fn new(width: usize, height: usize, quantizer: &Quantizer, binary: bool) -> Self {
        let (dark, light) = quantizer.binary_pair();
        let (levels, palette_len) = match quantizer {
            Quantizer::Palette(p) => (0, p.len() as u32),
            Quantizer::Levels(n) => (u32::from(*n), 0),
        };
        let (to_level, from_level) = match quantizer {
            Quantizer::Levels(n) => Quantizer::level_factors(*n),
            Quantizer::Palette(_) => (0.0, 0.0),
        };
        Self {
            width: width as u32,
            height: height as u32,
            binary: binary as u32,
            levels,
            palette_len,
            to_level,
            from_level,
            dark_rgb: pack_rgb(dark),
            light_rgb: pack_rgb(light),
            ..Self::default()
        }
    }

    /// Describe `field` to the shader.
    ///
    /// Procedural fields without a bit-exact shader form must be turned
    /// into a per-pixel field first ([`ThresholdField::to_per_pixel`]).
    pub fn with_field(mut self, field: &ThresholdField) -> Result<Self, GpuError> {
        match field {
            ThresholdField::Tiled { size, .. } => {
                self.field_kind = FIELD_TILED;
                self.matrix_size = *size as u32;
            }
            ThresholdField::Procedural(p) if p.is_bit_exact() => {
                self.field_kind = FIELD_PROCEDURAL;
                self.proc_kind = p.kind();
                self.set_procedural(p);
            }
            ThresholdField::Procedural(_) => {
                return Err(GpuError::Unsupported("procedural field without an exact shader form"))
            }
            ThresholdField::Constant(t) => {
                self.field_kind = FIELD_CONSTANT;
                self.constant = *t;
            }
            ThresholdField::PerImage(_) => self.field_kind = FIELD_PER_PIXEL,
        }
        Ok(self)
    }

    // Derived constants are computed here, in the same expression the CPU
    // uses, so both sides start from identical bits.
    fn set_procedural(&mut self, p: &Procedural) {
        match *p {
            Procedural::WhiteNoise { seed } => self.proc_seed = seed,
            Procedural::Lines { period } | Procedural::Crosshatch { period } => {
                let p = period.max(1);
                self.proc_count = p;
                self.proc_a = 1.0 / p as f32;
            }
            _ => {}
        }
    }
}

pub fn pack_rgb(c: [u8; 3]) -> u32 {
    u32::from(c[0]) | u32::from(c[1]) << 8 | u32::from(c[2]) << 16
}

pub fn unpack_rgb(v: u32) -> [u8; 3] {
    [v as u8, (v >> 8) as u8, (v >> 16) as u8]
}

/// Pixels as `[r, g, b, normalized luma]`.
///
/// Luma is computed here so the binary comparison on the GPU reads the
/// exact value the CPU compares.
pub fn pixel_data(image: &WorkingImage) -> Vec<[f32; 4]> {
    image
        .pixels
        .iter()
        .map(|&p| [p[0], p[1], p[2], luma(p) / 255.0])
        .collect()
}

/// Palette entries as `[r, g, b, 0]`. Never empty; the shader needs a
/// non-zero binding even when quantizing to levels.
pub fn palette_data(quantizer: &Quantizer) -> Vec<[f32; 4]> {
    match quantizer {
        Quantizer::Palette(p) => p
            .colors()
            .iter()
            .map(|c| [c.r as f32, c.g as f32, c.b as f32, 0.0])
            .collect(),
        Quantizer::Levels(_) => vec![[0.0; 4]],
    }
}

/// Normalized matrix or per-pixel values, or a single placeholder.
pub fn threshold_data(field: &ThresholdField) -> Vec<f32> {
    match field {
        ThresholdField::Tiled { values, .. } | ThresholdField::PerImage(values) => values.clone(),
        _ => vec![0.0],
    }
}

/// Device buffers for one dispatch.
pub struct DitherBuffers {
    pub uniforms: wgpu::Buffer,
    pub pixels: wgpu::Buffer,
    pub thresholds: wgpu::Buffer,
    pub palette: wgpu::Buffer,
    pub output: wgpu::Buffer,
    pub staging: wgpu::Buffer,
    pub pixel_count: usize,
}

impl DitherBuffers {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        uniforms: &Uniforms,
        pixels: &[[f32; 4]],
        thresholds: &[f32],
        palette: &[[f32; 4]],
    ) -> Self {
        let storage = |label: &str, bytes: &[u8]| {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: bytes.len() as u64,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            queue.write_buffer(&buffer, 0, bytes);
            buffer
        };

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ditter_uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        let pixel_count = pixels.len();
        let output_size = (pixel_count * std::mem::size_of::<u32>()) as u64;

        Self {
            uniforms: uniform_buffer,
            pixels: storage("ditter_pixels", bytemuck::cast_slice(pixels)),
            thresholds: storage("ditter_thresholds", bytemuck::cast_slice(thresholds)),
            palette: storage("ditter_palette", bytemuck::cast_slice(palette)),
            output: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("ditter_output"),
                size: output_size,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            }),
            staging: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("ditter_staging"),
                size: output_size,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            pixel_count,
        }
    }
}
