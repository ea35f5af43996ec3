//! Builds playback queues for Dolphin out of accepted combos.
//!
//! There are two ways in: `generate_queue` maps a finished list of items into a document
//! in one pass, while `DolphinComboQueue` accumulates combos as they're found (e.g, while
//! watching a live session) and rewrites the queue file as it grows.

mod combo_queue;
pub use combo_queue::DolphinComboQueue;

mod errors;
pub use errors::QueueError;

mod generate;
pub use generate::{QueueOptions, generate_queue, generate_queue_payload, generate_queue_with_rng};

mod types;
pub use types::{
    DolphinEntry, DolphinPlaybackItem, DolphinQueueDocument, FIRST_FRAME, FrameBuffers, MAX_END_FRAME,
    PartialFrameBuffers,
};

mod writer;
pub use writer::{PendingWrite, write_document};
