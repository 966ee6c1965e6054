//! Process-wide GPU capability probe.
//!
//! Device initialization is slow and can log noisily, so it happens at most
//! once per process, on first use.

use std::fmt;
use std::sync::OnceLock;

use crate::models::AppConfig;
use crate::services::runner::SharedBackend;

/// What the probe found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpuStatus {
    Available { adapter: String },
    Unavailable { reason: String },
    /// Turned off in the config; never probed.
    Disabled,
}

impl fmt::Display for GpuStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuStatus::Available { adapter } => write!(f, "available ({adapter})"),
            GpuStatus::Unavailable { reason } => write!(f, "unavailable ({reason})"),
            GpuStatus::Disabled => f.write_str("disabled by config"),
        }
    }
}

struct Probe {
    backend: Option<SharedBackend>,
    status: GpuStatus,
}

static PROBE: OnceLock<Probe> = OnceLock::new();

fn probe() -> &'static Probe {
    PROBE.get_or_init(run_probe)
}

/// The shared GPU backend, if this process has one.
pub fn accelerator() -> Option<SharedBackend> {
    probe().backend.clone()
}

/// Probe status, honoring `gpu: off` in the config.
pub fn status(config: &AppConfig) -> GpuStatus {
    if config.gpu_enabled() {
        probe().status.clone()
    } else {
        GpuStatus::Disabled
    }
}

#[cfg(feature = "gpu")]
fn run_probe() -> Probe {
    use std::sync::Arc;

    match ditter_gpu::GpuEngine::try_new() {
        Ok(engine) => {
            let adapter = engine.adapter().to_string();
            tracing::info!(%adapter, "GPU engine ready");
            Probe {
                backend: Some(Arc::new(engine)),
                status: GpuStatus::Available { adapter },
            }
        }
        Err(e) => {
            tracing::info!(reason = %e, "GPU engine unavailable, using CPU");
            Probe {
                backend: None,
                status: GpuStatus::Unavailable {
                    reason: e.to_string(),
                },
            }
        }
    }
}

#[cfg(not(feature = "gpu"))]
fn run_probe() -> Probe {
    Probe {
        backend: None,
        status: GpuStatus::Unavailable {
            reason: "built without the gpu feature".to_string(),
        },
    }
}
