//! Ties the pieces together: new replay files are streamed out of a folder, decoded into
//! combos upstream, filtered, and the combos that pass are queued up for Dolphin.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use serde_json::Value;

use slippi_clipper_logging::Log;
use slippi_combo::{ComboFilter, ComboRecord, MatchContext};
use slippi_config::ClipperConfig;
use slippi_dolphin_queue::DolphinComboQueue;
use slippi_folder_stream::{SlpFolderStream, StreamState};

mod decoder;
pub use decoder::{DecoderSink, GameEvent, ReplayDecoder};

mod errors;
pub use errors::ClipperError;

/// What happened to a single event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected,
    Ignored,
}

#[derive(Clone, Debug)]
struct ActiveGame {
    path: String,
    context: MatchContext,
    metadata: Option<Value>,
}

/// Filters combos as they come in and keeps the playback queue up to date.
#[derive(Debug)]
pub struct ComboClipper {
    pub filter: ComboFilter,
    pub queue: DolphinComboQueue,
    output_path: Option<PathBuf>,
    game: Option<ActiveGame>,
}

impl ComboClipper {
    /// `output_path` is rewritten every time a combo is accepted, if set.
    pub fn new(filter: ComboFilter, queue: DolphinComboQueue, output_path: Option<PathBuf>) -> Self {
        Self {
            filter,
            queue,
            output_path,
            game: None,
        }
    }

    pub fn from_config(config: &ClipperConfig) -> Self {
        Self::new(
            ComboFilter::new(config.filter_settings()),
            DolphinComboQueue::new(config.queue_options().buffers),
            config.output_path.clone(),
        )
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Applies one decoded event.
    ///
    /// A malformed combo is reported as an error but leaves the clipper usable; the combo
    /// simply isn't queued.
    pub fn handle_event(&mut self, event: GameEvent) -> Result<Outcome, ClipperError> {
        match event {
            GameEvent::GameStart { path, context, metadata } => {
                tracing::info!(target: Log::Clipper, %path, players = context.player_count(), "Game started");
                self.game = Some(ActiveGame { path, context, metadata });
                Ok(Outcome::Ignored)
            },

            GameEvent::ComboEnd(combo) => self.handle_combo(&combo),

            GameEvent::GameEnd => {
                if let Some(game) = self.game.take() {
                    tracing::info!(target: Log::Clipper, path = %game.path, "Game ended");
                }
                Ok(Outcome::Ignored)
            },
        }
    }

    fn handle_combo(&mut self, combo: &ComboRecord) -> Result<Outcome, ClipperError> {
        let Some(game) = &self.game else {
            tracing::warn!(target: Log::Clipper, "Received a combo outside of a game, skipping");
            return Ok(Outcome::Ignored);
        };

        if !self.filter.is_combo(combo, &game.context, game.metadata.as_ref())? {
            return Ok(Outcome::Rejected);
        }

        self.queue.add_combo(game.path.clone(), combo);
        tracing::info!(
            target: Log::Clipper,
            path = %game.path,
            start_frame = combo.start_frame,
            queued = self.queue.len(),
            "Combo accepted"
        );

        if let Some(output_path) = &self.output_path {
            self.queue.write_file_sync(output_path)?;
        }

        Ok(Outcome::Accepted)
    }
}

/// A folder stream whose bytes are decoded on the stream thread, with the resulting
/// events handed back to the caller's thread for filtering.
#[derive(Debug)]
pub struct LiveClipper<D: ReplayDecoder> {
    stream: SlpFolderStream<DecoderSink<D>>,
    events: Receiver<GameEvent>,
}

impl<D: ReplayDecoder> LiveClipper<D> {
    /// Starts watching the folder named in `config`.
    pub fn start(config: &ClipperConfig, decoder: D) -> Result<Self, ClipperError> {
        let folder = config.stream.folder.clone().ok_or(ClipperError::MissingFolder)?;
        Self::start_in(folder, config, decoder)
    }

    pub fn start_in(folder: impl AsRef<Path>, config: &ClipperConfig, decoder: D) -> Result<Self, ClipperError> {
        let (tx, events) = mpsc::channel();
        let mut stream = SlpFolderStream::with_options(DecoderSink::new(decoder, tx), config.stream_options());
        stream.start(folder)?;

        Ok(Self { stream, events })
    }

    pub fn state(&self) -> StreamState {
        self.stream.state()
    }

    /// Applies every event that has arrived so far. Returns how many combos were accepted.
    ///
    /// Surfaces a stream fault if the folder stream stopped on its own.
    pub fn pump(&self, clipper: &mut ComboClipper) -> Result<usize, ClipperError> {
        let mut accepted = 0;

        loop {
            match self.events.try_recv() {
                Ok(event) => match clipper.handle_event(event) {
                    Ok(Outcome::Accepted) => accepted += 1,
                    Ok(_) => {},
                    Err(ClipperError::Combo(error)) => {
                        tracing::warn!(target: Log::Clipper, ?error, "Skipping malformed combo");
                    },
                    Err(error) => return Err(error),
                },
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if let Some(fault) = self.stream.take_fault() {
            return Err(fault.into());
        }

        Ok(accepted)
    }

    /// Ends the stream, then applies whatever was still in flight.
    pub fn finish(mut self, clipper: &mut ComboClipper) -> Result<usize, ClipperError> {
        self.stream.end();
        self.pump(clipper)
    }
}

/// Installs the log subscriber at the configured level.
pub fn init_logging(config: &ClipperConfig) {
    slippi_clipper_logging::init(config.log_level());
}
