//! Single-flight job scheduling with coalescing.
//!
//! At most one job executes and at most one waits. A submission while a job
//! is running replaces whatever was waiting; the replaced job is dropped
//! without ever producing a completion.
//!
//! ```text
//! Idle           --submit-->   Running        (dispatch)
//! Running        --submit-->   RunningQueued
//! RunningQueued  --submit-->   RunningQueued  (queued job replaced)
//! Running        --complete--> Idle
//! RunningQueued  --complete--> Running        (dispatch queued job)
//! ```
//!
//! The type holds no I/O so every transition is unit-testable; the
//! coordinator actor owns one and performs the dispatches it asks for.

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    RunningQueued,
}

/// Result of [`Scheduler::submit`].
#[derive(Debug, PartialEq, Eq)]
pub enum Submitted<J> {
    /// Nothing was running: start this job now.
    Dispatch(J),
    /// A job is running: this one waits. `replaced` is the job it pushed out.
    Queued { replaced: Option<J> },
}

#[derive(Debug)]
pub struct Scheduler<J> {
    running: bool,
    queued: Option<J>,
}

impl<J> Default for Scheduler<J> {
    fn default() -> Self {
        Self {
            running: false,
            queued: None,
        }
    }
}

impl<J> Scheduler<J> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SchedulerState {
        match (self.running, self.queued.is_some()) {
            (false, _) => SchedulerState::Idle,
            (true, false) => SchedulerState::Running,
            (true, true) => SchedulerState::RunningQueued,
        }
    }

    pub fn submit(&mut self, job: J) -> Submitted<J> {
        if self.running {
            Submitted::Queued {
                replaced: self.queued.replace(job),
            }
        } else {
            self.running = true;
            Submitted::Dispatch(job)
        }
    }

    /// The running job finished. Returns the queued job, which is now running.
    pub fn complete(&mut self) -> Option<J> {
        debug_assert!(self.running, "complete() without a running job");
        let next = self.queued.take();
        self.running = next.is_some();
        next
    }

    pub fn is_idle(&self) -> bool {
        !self.running
    }
}
