//! Params-file watcher for `ditter watch`.
//!
//! Watches the directory holding the file (editors usually save by
//! renaming a temp file over it) and broadcasts one debounced event per
//! burst of writes to that file.

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Mutex};

const DEBOUNCE: Duration = Duration::from_millis(200);

/// The watched file changed.
#[derive(Debug, Clone)]
pub struct FileChangeEvent {
    pub path: PathBuf,
}

pub struct FileWatcher {
    sender: broadcast::Sender<FileChangeEvent>,
    /// Kept alive for as long as events are wanted.
    _watcher: Option<RecommendedWatcher>,
    active: bool,
}

impl FileWatcher {
    /// Watch `file`. Must be called inside a tokio runtime.
    pub fn new(file: &Path) -> Self {
        let (sender, _) = broadcast::channel(16);

        let (watcher, active) = match Self::start_watcher(file, sender.clone()) {
            Ok(watcher) => {
                tracing::info!(path = %file.display(), "File watcher started");
                (Some(watcher), true)
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %file.display(), "Failed to start file watcher");
                (None, false)
            }
        };

        Self {
            sender,
            _watcher: watcher,
            active,
        }
    }

    fn start_watcher(
        file: &Path,
        sender: broadcast::Sender<FileChangeEvent>,
    ) -> Result<RecommendedWatcher, notify::Error> {
        let target = file.to_path_buf();
        let dir = match file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let Some(name) = file.file_name().map(|n| n.to_os_string()) else {
            return Err(notify::Error::generic("watch target has no file name"));
        };

        let (tx, mut rx) = mpsc::channel::<()>(100);

        tokio::spawn(async move {
            let pending = Arc::new(Mutex::new(false));
            let pending_flag = pending.clone();

            let debounce_target = target.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(DEBOUNCE).await;
                    let mut dirty = pending_flag.lock().await;
                    if *dirty {
                        *dirty = false;
                        tracing::debug!(path = %debounce_target.display(), "File changed (debounced)");
                        let event = FileChangeEvent {
                            path: debounce_target.clone(),
                        };
                        if sender.send(event).is_err() {
                            tracing::trace!("No file change subscribers");
                        }
                    }
                }
            });

            while rx.recv().await.is_some() {
                *pending.lock().await = true;
            }
        });

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    if event.kind.is_access() {
                        return;
                    }
                    if event.paths.iter().any(|p| p.file_name() == Some(name.as_os_str())) {
                        let _ = tx.blocking_send(());
                    }
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        Ok(watcher)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FileChangeEvent> {
        self.sender.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
