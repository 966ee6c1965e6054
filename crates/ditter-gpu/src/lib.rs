//! wgpu compute backend for ditter.
//!
//! Runs the per-pixel-independent strategies (tiled matrices, procedural
//! fields, constant thresholds) as one compute dispatch over the whole
//! image. Error diffusion and per-image threshold sources stay on the CPU;
//! [`GpuEngine`] reports them as unsupported rather than guessing.
//!
//! The shader reads the same normalized matrix values, hash constants and
//! palette the CPU engine uses, so output agrees with
//! [`ditter_core::dither_cpu`] up to float rounding.

mod buffers;
mod device;
mod engine;
mod error;
mod pipeline;

pub use buffers::Uniforms;
pub use device::{GpuAvailability, GpuContext};
pub use engine::GpuEngine;
pub use error::GpuError;
