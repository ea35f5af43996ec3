use serde::{Deserialize, Serialize};

use crate::{ComboError, MeleeCharacter};

/// A single hit landed during a combo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveLanded {
    pub frame: i32,
    pub move_id: u8,
    pub hit_count: u32,
    pub damage: f32,
}

/// A structured combo as emitted by the replay decoder.
///
/// `end_frame` and `end_percent` are `None` while a combo is still open, which is the
/// normal state of affairs when watching a live game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboRecord {
    /// Index of the player landing the hits.
    pub attacker_index: u8,

    /// Index of the player receiving the hits.
    pub defender_index: u8,

    pub start_frame: i32,
    pub end_frame: Option<i32>,
    pub start_percent: f32,
    pub current_percent: f32,
    pub end_percent: Option<f32>,
    pub moves: Vec<MoveLanded>,
    pub did_kill: bool,
}

impl ComboRecord {
    /// Total damage dealt over the combo. Uses the current percent if the combo
    /// hasn't ended yet.
    pub fn total_damage(&self) -> f32 {
        self.end_percent.unwrap_or(self.current_percent) - self.start_percent
    }

    /// Checks the structural invariants that the decoder is expected to uphold.
    pub fn validate(&self) -> Result<(), ComboError> {
        match self.end_frame {
            Some(end) if end < self.start_frame => Err(ComboError::InvalidFrameRange {
                start: self.start_frame,
                end,
            }),
            _ => Ok(()),
        }
    }
}

/// Who is controlling a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerType {
    Human,
    Cpu,
    Demo,
}

/// A player slot as described by the game start block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub player_index: u8,

    /// The controller port, 1-4.
    pub port: u8,

    pub character_id: u8,
    pub player_type: PlayerType,

    #[serde(default)]
    pub name_tag: String,
}

impl PlayerInfo {
    /// Resolves the raw character id.
    pub fn character(&self) -> Result<MeleeCharacter, ComboError> {
        MeleeCharacter::try_from(self.character_id).map_err(|_| ComboError::UnknownCharacter(self.character_id))
    }
}

/// Per-match settings needed to interpret a combo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchContext {
    pub stage_id: u16,
    pub players: Vec<PlayerInfo>,
}

impl MatchContext {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Looks up a player by index, treating an absent player as malformed input.
    pub fn player(&self, player_index: u8) -> Result<&PlayerInfo, ComboError> {
        self.players
            .iter()
            .find(|player| player.player_index == player_index)
            .ok_or(ComboError::MissingPlayer(player_index))
    }
}
