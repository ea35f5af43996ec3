use std::collections::HashSet;
use std::ffi::OsString;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use notify::RecommendedWatcher;
use notify::event::{EventKind, ModifyKind};

use slippi_clipper_logging::Log;

use crate::tail::TailSession;
use crate::{ByteSink, Shared, StreamError, StreamState};

/// Messages consumed by the background stream thread.
#[derive(Debug)]
pub(crate) enum Message {
    Fs(notify::Result<notify::Event>),
    Shutdown,
}

/// Owns the watcher, the sink and the active tail session on the background thread. Every
/// filesystem event and poll tick is handled here, one at a time.
pub(crate) struct Worker<S: ByteSink> {
    pub watcher: Option<RecommendedWatcher>,
    pub extension: String,
    pub poll_interval: Duration,
    pub initial_files: HashSet<OsString>,
    pub seen: HashSet<OsString>,
    pub tail: Option<TailSession>,
    pub sink: S,
    pub shared: Arc<Mutex<Shared>>,
}

impl<S: ByteSink> Worker<S> {
    /// Runs until told to shut down (or a fault occurs), then hands the sink back. The
    /// watcher is released before returning either way.
    pub fn run(mut self, rx: Receiver<Message>) -> S {
        loop {
            let message = match rx.recv_timeout(self.poll_interval) {
                Ok(Message::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Ok(Message::Fs(event)) => Some(event),
                Err(RecvTimeoutError::Timeout) => None,
            };

            let result = self.guarded(|worker| match message {
                Some(Ok(event)) => worker.handle_event(event),
                Some(Err(error)) => Err(StreamError::Watch(error)),
                None => worker.pump(),
            });

            if let Err(error) = result {
                tracing::error!(target: Log::FolderStream, ?error, "Folder stream fault, stopping");
                self.watcher = None;

                if let Err(close_error) = self.guarded(|worker| {
                    worker.close_tail();
                    Ok(())
                }) {
                    tracing::error!(target: Log::FolderStream, error = ?close_error, "Failed to close replay after fault");
                }

                Shared::update(&self.shared, |shared| {
                    shared.state = StreamState::Stopped;
                    shared.fault = Some(error);
                });
                return self.sink;
            }
        }

        self.watcher = None;
        self.close_tail();
        self.sink
    }

    /// Runs `step`, turning a panic in the sink into a fault. The active file is abandoned
    /// without draining since the sink can't be trusted with more data.
    fn guarded<F>(&mut self, step: F) -> Result<(), StreamError>
    where
        F: FnOnce(&mut Self) -> Result<(), StreamError>,
    {
        match panic::catch_unwind(AssertUnwindSafe(|| step(&mut *self))) {
            Ok(result) => result,
            Err(_) => {
                self.tail = None;
                Err(StreamError::SinkPanicked)
            },
        }
    }

    fn handle_event(&mut self, event: notify::Event) -> Result<(), StreamError> {
        if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(_))) {
            for path in &event.paths {
                if self.is_new_replay(path) {
                    self.rotate(path)?;
                }
            }
        }

        self.pump()
    }

    /// New files have the replay extension, aren't hidden, and weren't in the folder when
    /// we started watching. Each file is only picked up once.
    fn is_new_replay(&mut self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };

        if name.to_string_lossy().starts_with('.') {
            return false;
        }

        if path.extension().is_none_or(|extension| extension != self.extension.as_str()) {
            return false;
        }

        if self.initial_files.contains(name) || !path.is_file() {
            return false;
        }

        self.seen.insert(name.to_os_string())
    }

    /// Finishes the current file before opening the next, so streams never interleave.
    fn rotate(&mut self, path: &Path) -> Result<(), StreamError> {
        if let Some(previous) = self.tail.take() {
            let previous_path = previous.path().to_path_buf();
            let forwarded = previous.finish(&mut self.sink)?;
            tracing::info!(target: Log::FolderStream, path = ?previous_path, forwarded, "Finished tailing replay");
        }

        self.tail = Some(TailSession::open(path)?);
        Shared::update(&self.shared, |shared| shared.state = StreamState::Tailing);

        tracing::info!(target: Log::FolderStream, ?path, "Tailing new replay");
        Ok(())
    }

    fn pump(&mut self) -> Result<(), StreamError> {
        if let Some(tail) = self.tail.as_mut() {
            tail.pump(&mut self.sink)?;
        }

        Ok(())
    }

    fn close_tail(&mut self) {
        if let Some(tail) = self.tail.take() {
            let path = tail.path().to_path_buf();

            match tail.finish(&mut self.sink) {
                Ok(forwarded) => {
                    tracing::info!(target: Log::FolderStream, ?path, forwarded, "Closed replay");
                },

                Err(error) => {
                    tracing::error!(target: Log::FolderStream, ?error, ?path, "Failed to drain replay on close");
                },
            }
        }
    }
}
