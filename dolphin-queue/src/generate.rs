use serde::{Deserialize, Serialize};

use crate::{DolphinEntry, DolphinPlaybackItem, DolphinQueueDocument, FrameBuffers, QueueError};

/// Options for building a queue document out of a list of playback items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueueOptions {
    pub shuffle: bool,
    pub command_id: Option<String>,
    pub mode: String,
    pub replay: String,
    pub is_real_time_mode: bool,
    pub output_overlay_files: bool,

    #[serde(flatten)]
    pub buffers: FrameBuffers,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            shuffle: false,
            command_id: None,
            mode: "queue".into(),
            replay: String::new(),
            is_real_time_mode: false,
            output_overlay_files: true,
            buffers: FrameBuffers::default(),
        }
    }
}

/// Maps `items` into a queue document, shuffling the order first if `options.shuffle` is set.
pub fn generate_queue(items: &[DolphinPlaybackItem], options: &QueueOptions) -> DolphinQueueDocument {
    generate_queue_with_rng(items, options, &mut fastrand::Rng::new())
}

/// `generate_queue`, with the source of randomness supplied by the caller.
pub fn generate_queue_with_rng(
    items: &[DolphinPlaybackItem],
    options: &QueueOptions,
    rng: &mut fastrand::Rng,
) -> DolphinQueueDocument {
    let mut ordered: Vec<&DolphinPlaybackItem> = items.iter().collect();

    if options.shuffle {
        rng.shuffle(&mut ordered);
    }

    DolphinQueueDocument {
        command_id: options.command_id.clone(),
        mode: options.mode.clone(),
        replay: options.replay.clone(),
        is_real_time_mode: options.is_real_time_mode,
        output_overlay_files: options.output_overlay_files,
        queue: ordered
            .into_iter()
            .map(|item| map_entry(item, &options.buffers))
            .collect(),
    }
}

/// Builds the queue document and serializes it to JSON.
pub fn generate_queue_payload(
    items: &[DolphinPlaybackItem],
    options: &QueueOptions,
    prettify: bool,
) -> Result<String, QueueError> {
    Ok(generate_queue(items, options).to_payload(prettify)?)
}

/// Items without a combo carry no frame bounds, and combos that haven't ended only get a
/// start frame so that they play through to the end of the file.
fn map_entry(item: &DolphinPlaybackItem, buffers: &FrameBuffers) -> DolphinEntry {
    let mut entry = DolphinEntry {
        path: item.path.clone(),
        game_station: item.game_station.clone(),
        game_start_at: item.game_start_at.clone(),
        ..Default::default()
    };

    if let Some(combo) = &item.combo {
        entry.start_frame = Some(buffers.start_frame(combo.start_frame));
        entry.end_frame = combo.end_frame.map(|end| end.saturating_add(buffers.end_buffer));
    }

    entry
}
