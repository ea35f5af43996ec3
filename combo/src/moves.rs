//! Move ids as reported on each landed hit. Only the ones the built-in criteria care
//! about are named here.

pub const GRAB_PUMMEL: u8 = 52;
pub const FORWARD_THROW: u8 = 53;
pub const BACK_THROW: u8 = 54;
pub const UP_THROW: u8 = 55;
pub const DOWN_THROW: u8 = 56;

/// Moves that make up a chain grab: the pummels and the throws that regrab.
pub fn is_chain_grab_move(move_id: u8) -> bool {
    matches!(move_id, GRAB_PUMMEL | UP_THROW | DOWN_THROW)
}
