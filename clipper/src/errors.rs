use thiserror::Error;

use slippi_combo::ComboError;
use slippi_config::ConfigError;
use slippi_dolphin_queue::QueueError;
use slippi_folder_stream::StreamError;

/// Any error type that can be raised by the clipper.
#[derive(Error, Debug)]
pub enum ClipperError {
    #[error(transparent)]
    Combo(#[from] ComboError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No replay folder was configured")]
    MissingFolder,
}
