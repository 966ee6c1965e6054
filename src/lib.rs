//! Ditter - palette dithering with a coalescing job coordinator.
//!
//! The dithering itself lives in `ditter-core` (CPU) and `ditter-gpu`
//! (wgpu compute). This crate adds the runtime around them: configuration,
//! the single-flight execution coordinator, the GPU capability probe and
//! PNG file I/O for the command-line front-end.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
