pub mod capability;
pub mod coordinator;
pub mod file_watcher;
pub mod runner;
pub mod scheduler;

pub use capability::GpuStatus;
pub use coordinator::{Completion, Coordinator, JobId};
pub use file_watcher::{FileChangeEvent, FileWatcher};
pub use runner::{Runner, SharedBackend};
pub use scheduler::{Scheduler, SchedulerState, Submitted};
