pub mod catalog;
pub mod config;

pub use catalog::Catalog;
pub use config::{AppConfig, GpuMode, CONFIG_ENV};
