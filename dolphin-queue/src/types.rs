use serde::{Deserialize, Serialize};

use slippi_combo::ComboRecord;

/// The lowest frame a playback entry may start on.
pub const FIRST_FRAME: i32 = 0;

/// Games are 8 minutes long, at 60fps.
pub const MAX_END_FRAME: i32 = 8 * 60 * 60;

/// Something that can be played back, optionally narrowed down to a single combo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DolphinPlaybackItem {
    pub path: String,
    pub combo: Option<ComboRecord>,
    pub game_station: Option<String>,
    pub game_start_at: Option<String>,
}

impl DolphinPlaybackItem {
    /// An item that plays a whole replay file.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// An item that plays a single combo out of a replay file.
    pub fn combo(path: impl Into<String>, combo: ComboRecord) -> Self {
        Self {
            path: path.into(),
            combo: Some(combo),
            ..Default::default()
        }
    }
}

/// One entry in the playback queue. Entries without frame bounds play the entire file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DolphinEntry {
    pub path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_frame: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_frame: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_station: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_start_at: Option<String>,
}

/// The document Dolphin reads when launched with a playback queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DolphinQueueDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,

    pub mode: String,

    /// Unused in queue mode.
    pub replay: String,

    pub is_real_time_mode: bool,
    pub output_overlay_files: bool,
    pub queue: Vec<DolphinEntry>,
}

impl DolphinQueueDocument {
    /// A queue-mode document with the standard header.
    pub fn queue(entries: Vec<DolphinEntry>) -> Self {
        Self {
            command_id: None,
            mode: "queue".into(),
            replay: String::new(),
            is_real_time_mode: false,
            output_overlay_files: true,
            queue: entries,
        }
    }

    /// Serializes the document, pretty-printed with two space indentation if requested.
    pub fn to_payload(&self, prettify: bool) -> Result<String, serde_json::Error> {
        match prettify {
            true => serde_json::to_string_pretty(self),
            false => serde_json::to_string(self),
        }
    }
}

/// How many frames of lead-in and follow-through to pad each combo with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameBuffers {
    pub start_buffer: i32,
    pub end_buffer: i32,
}

impl Default for FrameBuffers {
    fn default() -> Self {
        Self {
            start_buffer: 240,
            end_buffer: 180,
        }
    }
}

/// Optional overrides for `FrameBuffers`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialFrameBuffers {
    pub start_buffer: Option<i32>,
    pub end_buffer: Option<i32>,
}

impl FrameBuffers {
    pub fn merged(self, partial: PartialFrameBuffers) -> Self {
        Self {
            start_buffer: partial.start_buffer.unwrap_or(self.start_buffer),
            end_buffer: partial.end_buffer.unwrap_or(self.end_buffer),
        }
    }

    /// The first frame to play for a combo starting on `start_frame`.
    pub fn start_frame(&self, start_frame: i32) -> i32 {
        start_frame.saturating_sub(self.start_buffer).max(FIRST_FRAME)
    }
}
