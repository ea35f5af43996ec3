use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;

use tempfile::NamedTempFile;

use slippi_clipper_logging::Log;

use crate::{DolphinQueueDocument, QueueError};

/// Writes the whole document in one go.
///
/// The payload is staged in a temporary file next to `path` and then moved over it, so a
/// failed write never leaves a partial queue behind.
pub fn write_document(path: &Path, document: &DolphinQueueDocument) -> Result<(), QueueError> {
    let payload = document.to_payload(true)?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(directory)?;
    staged.write_all(payload.as_bytes())?;
    staged.as_file().sync_all()?;
    staged.persist(path)?;

    tracing::info!(
        target: Log::DolphinQueue,
        ?path,
        entries = document.queue.len(),
        "Wrote playback queue"
    );

    Ok(())
}

/// A queue write running on a background thread.
#[derive(Debug)]
pub struct PendingWrite {
    path: PathBuf,
    handle: thread::JoinHandle<Result<(), QueueError>>,
}

impl PendingWrite {
    /// Spawns a thread that writes `document` to `path`.
    pub(crate) fn spawn(path: PathBuf, document: DolphinQueueDocument) -> Result<Self, QueueError> {
        let thread_path = path.clone();

        let handle = thread::Builder::new()
            .name("DolphinQueueWriterThread".into())
            .spawn(move || write_document(&thread_path, &document))
            .map_err(QueueError::ThreadSpawn)?;

        Ok(Self { path, handle })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the write completes, returning its outcome.
    pub fn wait(self) -> Result<(), QueueError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(error) => {
                tracing::error!(target: Log::DolphinQueue, ?error, path = ?self.path, "Queue writer thread failure");
                Err(QueueError::WriterPanicked)
            },
        }
    }
}
