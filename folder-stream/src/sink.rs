use std::sync::mpsc::Sender;

use slippi_clipper_logging::Log;

/// Where the folder stream forwards bytes. This is the boundary to the replay decoder: it
/// receives every chunk, in order, with no gaps.
pub trait ByteSink: Send + 'static {
    fn write_chunk(&mut self, chunk: &[u8]);

    /// Called once when the stream is ended; no more chunks will follow.
    fn end(&mut self) {}
}

/// Events delivered by the channel-backed sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Data(Vec<u8>),
    End,
}

impl ByteSink for Sender<StreamEvent> {
    fn write_chunk(&mut self, chunk: &[u8]) {
        if let Err(error) = self.send(StreamEvent::Data(chunk.to_vec())) {
            tracing::warn!(target: Log::FolderStream, ?error, "Stream receiver dropped, discarding data");
        }
    }

    fn end(&mut self) {
        self.send(StreamEvent::End).ok();
    }
}

impl ByteSink for Vec<u8> {
    fn write_chunk(&mut self, chunk: &[u8]) {
        self.extend_from_slice(chunk);
    }
}
