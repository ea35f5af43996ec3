use thiserror::Error;

/// Raised when a combo or its match context is malformed. Business-rule mismatches are
/// never errors; a failing criterion simply evaluates to `false`.
#[derive(Debug, Error, PartialEq)]
pub enum ComboError {
    #[error("Player index {0} is not present in the match context")]
    MissingPlayer(u8),

    #[error("Unknown character id {0}")]
    UnknownCharacter(u8),

    #[error("Combo has an invalid frame range ({start}..{end})")]
    InvalidFrameRange { start: i32, end: i32 },
}
