use std::path::PathBuf;

use thiserror::Error;

/// Any error type that can be raised by the folder stream.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("{0}")]
    GenericIO(#[from] std::io::Error),

    #[error("Replay folder does not exist: {0:?}")]
    FolderNotFound(PathBuf),

    #[error("Replay folder path is not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("Failed to watch the replay folder: {0}")]
    Watch(#[from] notify::Error),

    #[error("Failed to read {path:?}: {source}")]
    TailRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The replay sink panicked while handling stream data")]
    SinkPanicked,

    #[error("Failed to spawn thread: {0}")]
    ThreadSpawn(std::io::Error),

    #[error("The folder stream is already running")]
    AlreadyStarted,

    #[error("The folder stream has been stopped and cannot be restarted")]
    Stopped,
}
