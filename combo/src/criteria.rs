//! The built-in combo criteria.
//!
//! Each criterion is a stateless predicate over a combo, its match context and the active
//! settings. They're kept apart from `ComboFilter` so that they can be tested one by one,
//! recombined into specialized checkers, or extended with custom rules.

use std::fmt::Debug;
use std::sync::Arc;

use serde_json::Value;

use crate::moves;
use crate::{ComboError, ComboFilterSettings, ComboRecord, MatchContext, PlayerType};

/// A single rule a combo has to satisfy.
///
/// Implementations must be free of side effects: evaluation short-circuits, so a
/// criterion is never guaranteed to run.
pub trait Criterion: Debug + Send + Sync {
    /// A short name, used when logging rejections.
    fn name(&self) -> &'static str;

    /// Returns `Ok(false)` when the combo doesn't satisfy this rule. `Err` is reserved for
    /// malformed input.
    fn check(
        &self,
        combo: &ComboRecord,
        context: &MatchContext,
        settings: &ComboFilterSettings,
        metadata: Option<&Value>,
    ) -> Result<bool, ComboError>;
}

/// The attacker must be playing from one of the allowed ports.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchesPortFilter;

impl Criterion for MatchesPortFilter {
    fn name(&self) -> &'static str {
        "port_filter"
    }

    fn check(
        &self,
        combo: &ComboRecord,
        context: &MatchContext,
        settings: &ComboFilterSettings,
        _metadata: Option<&Value>,
    ) -> Result<bool, ComboError> {
        let attacker = context.player(combo.attacker_index)?;
        Ok(settings.port_filter.contains(&attacker.port))
    }
}

/// The attacker must go by one of the configured names. The in-game name tag is checked
/// first, followed by the netplay name and connect code from the replay metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchesPlayerName;

impl Criterion for MatchesPlayerName {
    fn name(&self) -> &'static str {
        "player_name"
    }

    fn check(
        &self,
        combo: &ComboRecord,
        context: &MatchContext,
        settings: &ComboFilterSettings,
        metadata: Option<&Value>,
    ) -> Result<bool, ComboError> {
        if settings.name_tags.is_empty() {
            return Ok(true);
        }

        let attacker = context.player(combo.attacker_index)?;
        let mut names = vec![attacker.name_tag.as_str()];

        if let Some(metadata) = metadata {
            for key in ["netplay", "code"] {
                let pointer = format!("/players/{}/names/{key}", combo.attacker_index);
                if let Some(name) = metadata.pointer(&pointer).and_then(Value::as_str) {
                    names.push(name);
                }
            }
        }

        Ok(names
            .into_iter()
            .filter(|name| !name.is_empty())
            .any(|name| settings.name_tags.iter().any(|tag| tag == name)))
    }
}

/// The attacker must be one of the filtered characters, if any are set.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchesCharacterFilter;

impl Criterion for MatchesCharacterFilter {
    fn name(&self) -> &'static str {
        "character_filter"
    }

    fn check(
        &self,
        combo: &ComboRecord,
        context: &MatchContext,
        settings: &ComboFilterSettings,
        _metadata: Option<&Value>,
    ) -> Result<bool, ComboError> {
        if settings.character_filter.is_empty() {
            return Ok(true);
        }

        let character = context.player(combo.attacker_index)?.character()?;
        Ok(settings.character_filter.contains(&character))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinComboLength;

impl Criterion for MinComboLength {
    fn name(&self) -> &'static str {
        "min_combo_length"
    }

    fn check(
        &self,
        combo: &ComboRecord,
        _context: &MatchContext,
        settings: &ComboFilterSettings,
        _metadata: Option<&Value>,
    ) -> Result<bool, ComboError> {
        Ok(combo.moves.len() >= settings.min_combo_length)
    }
}

/// Total damage must reach the minimum percent, using the attacker's per-character
/// override when one is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinComboPercent;

impl Criterion for MinComboPercent {
    fn name(&self) -> &'static str {
        "min_combo_percent"
    }

    fn check(
        &self,
        combo: &ComboRecord,
        context: &MatchContext,
        settings: &ComboFilterSettings,
        _metadata: Option<&Value>,
    ) -> Result<bool, ComboError> {
        let character = context.player(combo.attacker_index)?.character()?;
        Ok(combo.total_damage() >= settings.min_percent_for(character))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ComboDidKill;

impl Criterion for ComboDidKill {
    fn name(&self) -> &'static str {
        "combo_did_kill"
    }

    fn check(
        &self,
        combo: &ComboRecord,
        _context: &MatchContext,
        settings: &ComboFilterSettings,
        _metadata: Option<&Value>,
    ) -> Result<bool, ComboError> {
        Ok(!settings.combo_must_kill || combo.did_kill)
    }
}

/// Rejects combos from any match that has a CPU in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcludesCpus;

impl Criterion for ExcludesCpus {
    fn name(&self) -> &'static str {
        "excludes_cpus"
    }

    fn check(
        &self,
        _combo: &ComboRecord,
        context: &MatchContext,
        settings: &ComboFilterSettings,
        _metadata: Option<&Value>,
    ) -> Result<bool, ComboError> {
        if !settings.exclude_cpus {
            return Ok(true);
        }

        Ok(!context.players.iter().any(|player| player.player_type == PlayerType::Cpu))
    }
}

/// Rejects combos by known chain grabbers that are mostly grabs and throws.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcludesChainGrabs;

impl Criterion for ExcludesChainGrabs {
    fn name(&self) -> &'static str {
        "excludes_chain_grabs"
    }

    fn check(
        &self,
        combo: &ComboRecord,
        context: &MatchContext,
        settings: &ComboFilterSettings,
        _metadata: Option<&Value>,
    ) -> Result<bool, ComboError> {
        if !settings.exclude_chain_grabs || combo.moves.is_empty() {
            return Ok(true);
        }

        let character = context.player(combo.attacker_index)?.character()?;
        if !settings.chain_grabbers.contains(&character) {
            return Ok(true);
        }

        let grab_moves = combo
            .moves
            .iter()
            .filter(|hit| moves::is_chain_grab_move(hit.move_id))
            .count();

        let proportion = grab_moves as f32 / combo.moves.len() as f32;
        Ok(proportion < settings.chain_grab_threshold)
    }
}

/// Rejects combos with more pummels than the wobble threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcludesWobbles;

impl Criterion for ExcludesWobbles {
    fn name(&self) -> &'static str {
        "excludes_wobbles"
    }

    fn check(
        &self,
        combo: &ComboRecord,
        _context: &MatchContext,
        settings: &ComboFilterSettings,
        _metadata: Option<&Value>,
    ) -> Result<bool, ComboError> {
        if !settings.exclude_wobbles {
            return Ok(true);
        }

        let pummels = combo
            .moves
            .iter()
            .filter(|hit| hit.move_id == moves::GRAB_PUMMEL)
            .count();

        Ok(pummels <= settings.wobble_threshold)
    }
}

/// Rejects combos where one hit accounts for most of the damage.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcludesLargeSingleHit;

impl Criterion for ExcludesLargeSingleHit {
    fn name(&self) -> &'static str {
        "excludes_large_single_hit"
    }

    fn check(
        &self,
        combo: &ComboRecord,
        _context: &MatchContext,
        settings: &ComboFilterSettings,
        _metadata: Option<&Value>,
    ) -> Result<bool, ComboError> {
        let total = combo.total_damage();
        if total <= 0.0 {
            return Ok(true);
        }

        Ok(!combo
            .moves
            .iter()
            .any(|hit| hit.damage / total >= settings.large_hit_threshold))
    }
}

/// Every built-in criterion, in evaluation order.
pub fn all_criteria() -> Vec<Arc<dyn Criterion>> {
    vec![
        Arc::new(MatchesPortFilter),
        Arc::new(MatchesPlayerName),
        Arc::new(MatchesCharacterFilter),
        Arc::new(MinComboLength),
        Arc::new(MinComboPercent),
        Arc::new(ComboDidKill),
        Arc::new(ExcludesCpus),
        Arc::new(ExcludesChainGrabs),
        Arc::new(ExcludesWobbles),
        Arc::new(ExcludesLargeSingleHit),
    ]
}
