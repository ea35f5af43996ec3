use std::sync::mpsc::Sender;

use serde_json::Value;

use slippi_clipper_logging::Log;
use slippi_combo::{ComboRecord, MatchContext};
use slippi_folder_stream::ByteSink;

/// Structured events produced by a replay decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A new game began. `path` is the replay file the game is being written to.
    GameStart {
        path: String,
        context: MatchContext,
        metadata: Option<Value>,
    },

    /// A combo finished (or, for live games, was last observed).
    ComboEnd(ComboRecord),

    GameEnd,
}

/// Turns raw replay bytes into game events. Bytes arrive in order and without gaps, but
/// chunk boundaries are arbitrary, so implementations need to buffer partial records.
pub trait ReplayDecoder: Send + 'static {
    fn decode(&mut self, chunk: &[u8]) -> Vec<GameEvent>;

    /// Called once the byte stream has ended, to flush anything still buffered.
    fn finish(&mut self) -> Vec<GameEvent> {
        Vec::new()
    }
}

/// Feeds folder stream bytes into a decoder and forwards the resulting events.
#[derive(Debug)]
pub struct DecoderSink<D: ReplayDecoder> {
    decoder: D,
    events: Sender<GameEvent>,
}

impl<D: ReplayDecoder> DecoderSink<D> {
    pub fn new(decoder: D, events: Sender<GameEvent>) -> Self {
        Self { decoder, events }
    }

    fn forward(&self, events: Vec<GameEvent>) {
        for event in events {
            if let Err(error) = self.events.send(event) {
                tracing::warn!(target: Log::Clipper, ?error, "Event receiver dropped");
                return;
            }
        }
    }
}

impl<D: ReplayDecoder> ByteSink for DecoderSink<D> {
    fn write_chunk(&mut self, chunk: &[u8]) {
        let events = self.decoder.decode(chunk);
        self.forward(events);
    }

    fn end(&mut self) {
        let events = self.decoder.finish();
        self.forward(events);
    }
}
