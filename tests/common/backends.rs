//! Accelerator stand-ins for driving the coordinator deterministically.

use ditter_core::{dither_cpu, DitherBackend, EngineError, Plan, WorkingImage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Mutex};
use tokio::sync::mpsc as tokio_mpsc;

/// Runs the CPU dither step, but only after the test releases it.
///
/// Every call announces itself on `started` and then blocks until one
/// token arrives on the release channel, so a test can hold a job
/// "in flight" while it submits more.
pub struct GatedBackend {
    started: tokio_mpsc::UnboundedSender<()>,
    release: Mutex<mpsc::Receiver<()>>,
}

/// Test-side controls for a [`GatedBackend`].
pub struct Gate {
    pub started: tokio_mpsc::UnboundedReceiver<()>,
    release: mpsc::Sender<()>,
}

impl Gate {
    /// Let one blocked (or future) call proceed.
    pub fn release(&self) {
        self.release.send(()).unwrap();
    }

    pub async fn wait_started(&mut self) {
        tokio::time::timeout(super::COMPLETION_TIMEOUT, self.started.recv())
            .await
            .expect("backend was never called")
            .expect("backend dropped");
    }
}

impl GatedBackend {
    pub fn new() -> (Self, Gate) {
        let (started_tx, started_rx) = tokio_mpsc::unbounded_channel();
        let (release_tx, release_rx) = mpsc::channel();
        (
            Self {
                started: started_tx,
                release: Mutex::new(release_rx),
            },
            Gate {
                started: started_rx,
                release: release_tx,
            },
        )
    }
}

impl DitherBackend for GatedBackend {
    fn name(&self) -> &'static str {
        "gated"
    }

    fn dither(&self, image: &WorkingImage, plan: &Plan) -> Result<Vec<[u8; 3]>, EngineError> {
        let _ = self.started.send(());
        let released = self.release.lock().unwrap().recv();
        if released.is_err() {
            return Err(EngineError::Backend {
                backend: "gated",
                message: "gate dropped".into(),
            });
        }
        Ok(dither_cpu(image, plan))
    }
}

/// Panics on the first call, then behaves like the CPU.
#[derive(Default)]
pub struct PanicOnceBackend {
    panicked: AtomicBool,
}

impl DitherBackend for PanicOnceBackend {
    fn name(&self) -> &'static str {
        "panic-once"
    }

    fn dither(&self, image: &WorkingImage, plan: &Plan) -> Result<Vec<[u8; 3]>, EngineError> {
        if !self.panicked.swap(true, Ordering::SeqCst) {
            panic!("simulated device crash");
        }
        Ok(dither_cpu(image, plan))
    }
}
