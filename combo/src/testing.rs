//! Fixtures shared by the unit tests in this crate.

use crate::{ComboRecord, MatchContext, MeleeCharacter, MoveLanded, PlayerInfo, PlayerType};

pub(crate) fn hit(move_id: u8, damage: f32) -> MoveLanded {
    MoveLanded {
        frame: 0,
        move_id,
        hit_count: 1,
        damage,
    }
}

/// Fox (port 1, index 0) against Falco (port 2, index 1), both human.
pub(crate) fn context() -> MatchContext {
    MatchContext {
        stage_id: 31,
        players: vec![
            PlayerInfo {
                player_index: 0,
                port: 1,
                character_id: MeleeCharacter::Fox as u8,
                player_type: PlayerType::Human,
                name_tag: "FOX".into(),
            },
            PlayerInfo {
                player_index: 1,
                port: 2,
                character_id: MeleeCharacter::Falco as u8,
                player_type: PlayerType::Human,
                name_tag: String::new(),
            },
        ],
    }
}

/// A finished combo by player 0 of `hits` evenly weighted 25% hits, ending in a kill.
pub(crate) fn kill_combo(hits: usize) -> ComboRecord {
    ComboRecord {
        attacker_index: 0,
        defender_index: 1,
        start_frame: 500,
        end_frame: Some(700),
        start_percent: 0.0,
        current_percent: 25.0 * hits as f32,
        end_percent: Some(25.0 * hits as f32),
        moves: (0..hits).map(|_| hit(13, 25.0)).collect(),
        did_kill: true,
    }
}
