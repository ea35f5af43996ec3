//! Combo records and the filter that decides whether a combo is worth keeping.
//!
//! Decoded combos come in from an upstream replay parser; this crate never looks at
//! raw replay bytes.

mod character;
pub use character::MeleeCharacter;

pub mod criteria;
pub use criteria::{Criterion, all_criteria};

mod errors;
pub use errors::ComboError;

mod filter;
pub use filter::{ComboFilter, check_combo};

pub mod moves;

mod settings;
pub use settings::{ComboFilterSettings, PartialComboFilterSettings};

mod types;
pub use types::{ComboRecord, MatchContext, MoveLanded, PlayerInfo, PlayerType};

#[cfg(test)]
mod testing;
