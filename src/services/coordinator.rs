//! Execution coordinator: one job in flight, newer requests coalesce.
//!
//! [`Coordinator::submit`] validates parameters on the caller's thread and
//! enqueues without waiting. A single actor task owns the [`Scheduler`] and
//! runs each job on the blocking pool. Completions arrive on the receiver
//! returned by [`Coordinator::spawn`], in the order the jobs ran.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ditter_core::{PixelBuffer, Plan, ProcessingParams};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{ExecutionError, SubmitError};
use crate::services::runner::Runner;
use crate::services::scheduler::{Scheduler, Submitted};

pub type JobId = u64;

/// Outcome of a job that ran.
#[derive(Debug)]
pub struct Completion {
    pub id: JobId,
    pub result: Result<PixelBuffer, ExecutionError>,
    /// Backend that ran the dither step.
    pub backend: &'static str,
    pub elapsed: Duration,
    /// A newer job had been submitted by the time this one finished.
    pub superseded: bool,
}

struct Job {
    id: JobId,
    source: Arc<PixelBuffer>,
    plan: Plan,
}

/// Handle for submitting jobs.
///
/// Submitting takes `&mut self`: ids are handed out and enqueued in one
/// step, so the actor always sees them in increasing order. Dropping the
/// handle lets the running and queued jobs finish, after which the
/// completion stream closes.
pub struct Coordinator {
    jobs: mpsc::UnboundedSender<Job>,
    last_id: JobId,
}

impl Coordinator {
    /// Start the actor on the current tokio runtime.
    pub fn spawn(runner: Runner) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let actor = Actor {
            jobs: jobs_rx,
            completions: completions_tx,
            runner,
            scheduler: Scheduler::new(),
            latest: 0,
            running: None,
        };
        tokio::spawn(actor.run());

        let handle = Self {
            jobs: jobs_tx,
            last_id: 0,
        };
        (handle, completions_rx)
    }

    /// Validate `params` and enqueue a job. Never blocks on a running job.
    ///
    /// The source frame is shared with the job, so resubmitting one frame
    /// with new parameters never copies its pixels.
    pub fn submit(
        &mut self,
        source: impl Into<Arc<PixelBuffer>>,
        params: &ProcessingParams,
    ) -> Result<JobId, SubmitError> {
        let plan = Plan::from_params(params)?;
        self.submit_plan(source, plan)
    }

    /// Enqueue a job with an already validated plan.
    pub fn submit_plan(
        &mut self,
        source: impl Into<Arc<PixelBuffer>>,
        plan: Plan,
    ) -> Result<JobId, SubmitError> {
        let id = self.last_id + 1;
        self.jobs
            .send(Job {
                id,
                source: source.into(),
                plan,
            })
            .map_err(|_| SubmitError::Closed)?;
        self.last_id = id;
        tracing::debug!(job = id, "Job submitted");
        Ok(id)
    }
}

struct Running {
    id: JobId,
    backend: &'static str,
    started: Instant,
    handle: JoinHandle<Result<PixelBuffer, ExecutionError>>,
}

struct Actor {
    jobs: mpsc::UnboundedReceiver<Job>,
    completions: mpsc::UnboundedSender<Completion>,
    runner: Runner,
    scheduler: Scheduler<Job>,
    /// Highest job id received so far.
    latest: JobId,
    running: Option<Running>,
}

impl Actor {
    async fn run(mut self) {
        let mut open = true;
        loop {
            tokio::select! {
                // Drain submissions first so a finished job sees every newer one.
                biased;
                job = self.jobs.recv(), if open => match job {
                    Some(job) => self.accept(job),
                    None => {
                        tracing::debug!("Coordinator handle dropped, draining");
                        open = false;
                    }
                },
                result = join(&mut self.running) => self.finish(result),
            }
            if !open && self.running.is_none() {
                break;
            }
        }
        tracing::debug!("Coordinator stopped");
    }

    fn accept(&mut self, job: Job) {
        self.latest = self.latest.max(job.id);
        match self.scheduler.submit(job) {
            Submitted::Dispatch(job) => self.dispatch(job),
            Submitted::Queued { replaced } => {
                if let Some(old) = replaced {
                    tracing::debug!(job = old.id, "Job coalesced");
                }
            }
        }
    }

    fn dispatch(&mut self, job: Job) {
        let Job { id, source, plan } = job;
        let backend = self.runner.backend_for(&plan);
        tracing::info!(
            job = id,
            backend,
            strategy = plan.strategy().label(),
            width = source.width(),
            height = source.height(),
            "Job started"
        );

        let runner = self.runner.clone();
        let handle = tokio::task::spawn_blocking(move || runner.run(&source, &plan));
        self.running = Some(Running {
            id,
            backend,
            started: Instant::now(),
            handle,
        });
    }

    fn finish(&mut self, result: Result<PixelBuffer, ExecutionError>) {
        let Some(done) = self.running.take() else {
            return;
        };
        let completion = Completion {
            id: done.id,
            result,
            backend: done.backend,
            elapsed: done.started.elapsed(),
            superseded: done.id < self.latest,
        };

        match &completion.result {
            Ok(_) => tracing::info!(
                job = completion.id,
                elapsed_ms = completion.elapsed.as_millis() as u64,
                superseded = completion.superseded,
                "Job finished"
            ),
            Err(e) => tracing::warn!(job = completion.id, error = %e, "Job failed"),
        }
        if self.completions.send(completion).is_err() {
            tracing::debug!("Completion receiver dropped");
        }

        if let Some(next) = self.scheduler.complete() {
            self.dispatch(next);
        }
    }
}

/// Wait for the running job; pending forever when idle.
async fn join(running: &mut Option<Running>) -> Result<PixelBuffer, ExecutionError> {
    let Some(running) = running else {
        return std::future::pending().await;
    };
    match (&mut running.handle).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(ExecutionError::Panicked(panic_message(e.into_panic()))),
        Err(e) => Err(ExecutionError::Join(e.to_string())),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ditter_core::{AlgorithmSelector, PaletteSpec};

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(42)), "unknown panic");
    }

    #[tokio::test]
    async fn test_invalid_params_rejected_synchronously() {
        let (mut coordinator, mut completions) = Coordinator::spawn(Runner::cpu_only());
        let params = ProcessingParams::new(AlgorithmSelector::default())
            .palette(PaletteSpec::Colors(vec![]));
        let err = coordinator
            .submit(PixelBuffer::filled(2, 2, [0, 0, 0, 255]), &params)
            .unwrap_err();
        assert!(matches!(err, SubmitError::Config(_)), "got {err:?}");

        drop(coordinator);
        assert!(
            completions.recv().await.is_none(),
            "a rejected job never produces a completion"
        );
    }

    #[tokio::test]
    async fn test_single_job_completes() {
        let (mut coordinator, mut completions) = Coordinator::spawn(Runner::cpu_only());
        let id = coordinator
            .submit(
                PixelBuffer::filled(3, 2, [200, 200, 200, 255]),
                &ProcessingParams::default(),
            )
            .unwrap();

        let done = completions.recv().await.unwrap();
        assert_eq!(done.id, id);
        assert_eq!(done.backend, "cpu");
        assert!(!done.superseded);
        let image = done.result.unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[tokio::test]
    async fn test_rejected_submission_does_not_consume_an_id() {
        let (mut coordinator, mut completions) = Coordinator::spawn(Runner::cpu_only());
        let bad = ProcessingParams::default().levels(1);
        assert!(coordinator.submit(PixelBuffer::filled(1, 1, [0; 4]), &bad).is_err());

        let id = coordinator
            .submit(PixelBuffer::filled(1, 1, [0; 4]), &ProcessingParams::default())
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(completions.recv().await.unwrap().id, 1);
    }
}
