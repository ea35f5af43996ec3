use std::path::{Path, PathBuf};

use slippi_clipper_logging::Log;
use slippi_combo::ComboRecord;

use crate::writer::{PendingWrite, write_document};
use crate::{DolphinEntry, DolphinQueueDocument, FrameBuffers, MAX_END_FRAME, PartialFrameBuffers, QueueError};

/// Accumulates accepted combos as they're found and writes them out as a playback queue.
///
/// Unlike `generate_queue`, every entry here has an end frame: combos seen live usually
/// haven't ended yet, so those are played out to the longest possible game instead.
#[derive(Debug, Clone, Default)]
pub struct DolphinComboQueue {
    buffers: FrameBuffers,
    entries: Vec<DolphinEntry>,
}

impl DolphinComboQueue {
    pub fn new(buffers: FrameBuffers) -> Self {
        Self {
            buffers,
            entries: Vec::new(),
        }
    }

    /// Appends `combo` using the queue's own buffer settings.
    pub fn add_combo(&mut self, path: impl Into<String>, combo: &ComboRecord) {
        let buffers = self.buffers;
        self.add_combo_with_buffers(path, combo, &buffers);
    }

    /// Appends `combo`, padded by `buffers`.
    pub fn add_combo_with_buffers(&mut self, path: impl Into<String>, combo: &ComboRecord, buffers: &FrameBuffers) {
        let start_frame = buffers.start_frame(combo.start_frame);
        let end_frame = combo
            .end_frame
            .unwrap_or(MAX_END_FRAME)
            .saturating_add(buffers.end_buffer);

        let entry = DolphinEntry {
            path: path.into(),
            start_frame: Some(start_frame),
            end_frame: Some(end_frame),
            ..Default::default()
        };

        tracing::debug!(target: Log::DolphinQueue, path = %entry.path, start_frame, end_frame, "Queued combo");
        self.entries.push(entry);
    }

    /// Empties the queue. Files that were already written are left alone.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn update_settings(&mut self, settings: PartialFrameBuffers) -> FrameBuffers {
        self.buffers = self.buffers.merged(settings);
        self.buffers
    }

    pub fn settings(&self) -> FrameBuffers {
        self.buffers
    }

    pub fn entries(&self) -> &[DolphinEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A fresh document holding a snapshot of the current entries.
    pub fn document(&self) -> DolphinQueueDocument {
        DolphinQueueDocument::queue(self.entries.clone())
    }

    pub fn write_file_sync(&self, path: impl AsRef<Path>) -> Result<(), QueueError> {
        write_document(path.as_ref(), &self.document())
    }

    /// Writes the queue on a background thread. The document is snapshotted before this
    /// returns, so later changes to the queue don't affect the pending write.
    pub fn write_file(&self, path: impl Into<PathBuf>) -> Result<PendingWrite, QueueError> {
        PendingWrite::spawn(path.into(), self.document())
    }
}
