//! Watches a folder for new replay files and treats them as though they were a live
//! Slippi stream.
//!
//! Files already present when watching starts are considered historical and ignored.
//! Each new file is tailed as it grows and its bytes are forwarded, unmodified and in
//! order, to a `ByteSink`. When another new file shows up, the current one is drained and
//! closed before the next is opened, so at most one file is tailed at any time.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use notify::{RecursiveMode, Watcher};

use slippi_clipper_logging::Log;

mod errors;
pub use errors::StreamError;

mod sink;
pub use sink::{ByteSink, StreamEvent};

mod tail;

mod worker;
use worker::{Message, Worker};

/// Lifecycle of a folder stream. `Stopped` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Watching,
    Tailing,
    Stopped,
}

/// Configuration for a folder stream.
#[derive(Clone, Debug)]
pub struct FolderStreamOptions {
    /// Extension (without the dot) of files that count as replays.
    pub extension: String,

    /// How often the active file is checked for growth when no filesystem event arrives.
    pub poll_interval: Duration,
}

impl Default for FolderStreamOptions {
    fn default() -> Self {
        Self {
            extension: "slp".into(),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// State shared between the handle and the background thread.
#[derive(Debug)]
pub(crate) struct Shared {
    state: StreamState,
    fault: Option<StreamError>,
}

impl Shared {
    fn new() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self {
            state: StreamState::Idle,
            fault: None,
        }))
    }

    /// Locks and runs `handler`. A poisoned lock only means a panic elsewhere; the data
    /// itself is still usable.
    pub(crate) fn update<F, R>(shared: &Mutex<Self>, handler: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        let mut lock = shared.lock().unwrap_or_else(PoisonError::into_inner);
        handler(&mut lock)
    }
}

/// A folder of replay files presented as one continuous byte stream.
///
/// ```no_run
/// use std::sync::mpsc;
/// use slippi_folder_stream::{SlpFolderStream, StreamEvent};
///
/// let (tx, rx) = mpsc::channel::<StreamEvent>();
/// let mut stream = SlpFolderStream::new(tx);
/// stream.start("/home/me/Slippi").expect("Unable to watch replay folder");
///
/// while let Ok(StreamEvent::Data(bytes)) = rx.recv() {
///     println!("Got {} bytes", bytes.len());
/// }
/// ```
#[derive(Debug)]
pub struct SlpFolderStream<S: ByteSink> {
    options: FolderStreamOptions,
    sink: Option<S>,
    shared: Arc<Mutex<Shared>>,
    control: Option<Sender<Message>>,
    worker_thread: Option<thread::JoinHandle<S>>,
    ended: bool,
}

impl<S: ByteSink> SlpFolderStream<S> {
    pub fn new(sink: S) -> Self {
        Self::with_options(sink, FolderStreamOptions::default())
    }

    pub fn with_options(sink: S, options: FolderStreamOptions) -> Self {
        Self {
            options,
            sink: Some(sink),
            shared: Shared::new(),
            control: None,
            worker_thread: None,
            ended: false,
        }
    }

    pub fn state(&self) -> StreamState {
        Shared::update(&self.shared, |shared| shared.state)
    }

    /// Takes the fault that stopped the stream, if any.
    pub fn take_fault(&self) -> Option<StreamError> {
        Shared::update(&self.shared, |shared| shared.fault.take())
    }

    /// Starts watching `folder` for new replay files.
    ///
    /// Failing to start (e.g, the folder doesn't exist) is fatal: the stream moves to
    /// `Stopped` and can't be started again.
    pub fn start(&mut self, folder: impl AsRef<Path>) -> Result<(), StreamError> {
        match self.state() {
            StreamState::Idle => {},
            StreamState::Stopped => return Err(StreamError::Stopped),
            StreamState::Watching | StreamState::Tailing => return Err(StreamError::AlreadyStarted),
        }

        let folder = folder.as_ref();

        if let Err(error) = self.spawn(folder) {
            tracing::error!(target: Log::FolderStream, ?error, ?folder, "Unable to start folder stream");
            self.shutdown();
            Shared::update(&self.shared, |shared| shared.state = StreamState::Stopped);
            return Err(error);
        }

        tracing::info!(target: Log::FolderStream, ?folder, "Watching for new replays");
        Ok(())
    }

    fn spawn(&mut self, folder: &Path) -> Result<(), StreamError> {
        let initial_files = snapshot(folder)?;
        tracing::debug!(target: Log::FolderStream, existing = initial_files.len(), "Ignoring existing files");

        let (tx, rx) = mpsc::channel();

        let watcher_tx = tx.clone();
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
            watcher_tx.send(Message::Fs(event)).ok();
        })?;
        watcher.watch(folder, RecursiveMode::NonRecursive)?;

        let Some(sink) = self.sink.take() else {
            return Err(StreamError::Stopped);
        };

        let worker = Worker {
            watcher: Some(watcher),
            extension: self.options.extension.clone(),
            poll_interval: self.options.poll_interval,
            initial_files,
            seen: HashSet::new(),
            tail: None,
            sink,
            shared: self.shared.clone(),
        };

        // The sink and watcher move into the thread. If spawning fails they're dropped with
        // the closure, and a stream that couldn't start has nothing to end.
        let worker_thread = thread::Builder::new()
            .name("SlpFolderStreamThread".into())
            .spawn(move || worker.run(rx))
            .map_err(StreamError::ThreadSpawn)?;

        Shared::update(&self.shared, |shared| shared.state = StreamState::Watching);

        self.control = Some(tx);
        self.worker_thread = Some(worker_thread);
        Ok(())
    }

    /// Stops watching and closes the active file. Safe to call at any time, any number of
    /// times; before `start` it does nothing.
    pub fn stop(&mut self) {
        if self.state() == StreamState::Idle {
            return;
        }

        self.shutdown();
        Shared::update(&self.shared, |shared| shared.state = StreamState::Stopped);
    }

    /// Stops the stream and tells the sink that no more data will arrive.
    pub fn end(&mut self) {
        self.stop();
        Shared::update(&self.shared, |shared| shared.state = StreamState::Stopped);

        if self.ended {
            return;
        }

        self.ended = true;
        if let Some(sink) = self.sink.as_mut() {
            sink.end();
        }
    }

    /// Stops the stream and returns the sink.
    pub fn into_sink(mut self) -> Option<S> {
        self.stop();
        self.sink.take()
    }

    /// Stops the background thread (which releases the watcher) and recovers the sink.
    fn shutdown(&mut self) {
        if let Some(control) = self.control.take() {
            control.send(Message::Shutdown).ok();
        }

        if let Some(worker_thread) = self.worker_thread.take() {
            match worker_thread.join() {
                Ok(sink) => self.sink = Some(sink),
                Err(error) => {
                    tracing::error!(target: Log::FolderStream, ?error, "Folder stream thread failure");
                },
            }
        }
    }
}

impl<S: ByteSink> Drop for SlpFolderStream<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Names of the files present in `folder` right now.
fn snapshot(folder: &Path) -> Result<HashSet<std::ffi::OsString>, StreamError> {
    let metadata = fs::metadata(folder).map_err(|error| match error.kind() {
        ErrorKind::NotFound => StreamError::FolderNotFound(folder.to_path_buf()),
        _ => StreamError::GenericIO(error),
    })?;

    if !metadata.is_dir() {
        return Err(StreamError::NotADirectory(folder.to_path_buf()));
    }

    let mut files = HashSet::new();
    for entry in fs::read_dir(folder)? {
        files.insert(entry?.file_name());
    }

    Ok(files)
}
