//! Backend selection for a single job.

use std::sync::Arc;

use ditter_core::{process, process_with, CpuBackend, DitherBackend, PixelBuffer, Plan};

use crate::error::ExecutionError;
use crate::models::AppConfig;
use crate::services::capability;

/// A dither backend shareable across the blocking pool.
pub type SharedBackend = Arc<dyn DitherBackend + Send + Sync>;

/// Runs jobs on the CPU, or on an accelerator for plans it can handle.
///
/// A failure on the accelerator fails the job; the CPU is not retried, so
/// a broken device shows up instead of silently running slower.
#[derive(Clone, Default)]
pub struct Runner {
    accelerator: Option<SharedBackend>,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("accelerator", &self.accelerator.as_ref().map(|b| b.name()))
            .finish()
    }
}

impl Runner {
    pub fn cpu_only() -> Self {
        Self::default()
    }

    pub fn with_accelerator(backend: SharedBackend) -> Self {
        Self {
            accelerator: Some(backend),
        }
    }

    /// Probe the GPU (once per process) unless the config turns it off.
    pub fn from_config(config: &AppConfig) -> Self {
        if !config.gpu_enabled() {
            tracing::debug!("GPU disabled by configuration");
            return Self::cpu_only();
        }
        match capability::accelerator() {
            Some(backend) => Self::with_accelerator(backend),
            None => Self::cpu_only(),
        }
    }

    pub fn has_accelerator(&self) -> bool {
        self.accelerator.is_some()
    }

    /// Name of the backend that will run `plan`.
    pub fn backend_for(&self, plan: &Plan) -> &'static str {
        match self.pick(plan) {
            Some(backend) => backend.name(),
            None => CpuBackend.name(),
        }
    }

    fn pick(&self, plan: &Plan) -> Option<&SharedBackend> {
        self.accelerator.as_ref().filter(|_| plan.gpu_eligible())
    }

    pub fn run(&self, source: &PixelBuffer, plan: &Plan) -> Result<PixelBuffer, ExecutionError> {
        match self.pick(plan) {
            Some(backend) => Ok(process_with(source, plan, backend.as_ref())?),
            None => Ok(process(source, plan)),
        }
    }
}
