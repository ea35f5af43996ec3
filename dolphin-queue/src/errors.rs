use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("{0}")]
    GenericIO(#[from] std::io::Error),

    #[error("Failed to serialize the playback queue: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to move the playback queue into place: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Failed to spawn thread: {0}")]
    ThreadSpawn(std::io::Error),

    #[error("The playback queue writer thread panicked")]
    WriterPanicked,
}
