use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::MeleeCharacter;

/// The complete combo acceptance policy.
///
/// None of these values are range-checked. A negative percent or a threshold above
/// `1.0` is accepted as-is and simply changes how the criteria evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboFilterSettings {
    pub chain_grabbers: Vec<MeleeCharacter>,

    /// Attacking characters to accept. Empty means all characters.
    pub character_filter: Vec<MeleeCharacter>,

    pub port_filter: Vec<u8>,

    /// Attacker name tags to accept. Empty means anyone.
    pub name_tags: Vec<String>,

    pub min_combo_length: usize,
    pub min_combo_percent: f32,
    pub combo_must_kill: bool,
    pub exclude_cpus: bool,
    pub exclude_chain_grabs: bool,
    pub exclude_wobbles: bool,

    /// The proportion of total combo damage a single hit has to do to be considered a large hit.
    pub large_hit_threshold: f32,

    /// The number of pummels before it's considered a wobble.
    pub wobble_threshold: usize,

    /// Proportion of grab moves (pummels and throws) to total moves for a combo to be
    /// considered a chain grab.
    pub chain_grab_threshold: f32,

    /// Overrides `min_combo_percent` for the listed attacking characters.
    pub per_character_min_combo_percent: BTreeMap<MeleeCharacter, f32>,
}

impl Default for ComboFilterSettings {
    fn default() -> Self {
        Self {
            chain_grabbers: vec![
                MeleeCharacter::Marth,
                MeleeCharacter::Peach,
                MeleeCharacter::Pikachu,
                MeleeCharacter::DrMario,
            ],
            character_filter: Vec::new(),
            port_filter: vec![1, 2, 3, 4],
            name_tags: Vec::new(),
            min_combo_length: 1,
            min_combo_percent: 60.0,
            combo_must_kill: true,
            exclude_cpus: true,
            exclude_chain_grabs: true,
            exclude_wobbles: true,
            large_hit_threshold: 0.8,
            wobble_threshold: 8,
            chain_grab_threshold: 0.8,
            per_character_min_combo_percent: BTreeMap::from([(MeleeCharacter::Jigglypuff, 85.0)]),
        }
    }
}

impl ComboFilterSettings {
    /// The minimum combo percent that applies to a given attacking character.
    pub fn min_percent_for(&self, character: MeleeCharacter) -> f32 {
        self.per_character_min_combo_percent
            .get(&character)
            .copied()
            .unwrap_or(self.min_combo_percent)
    }

    /// Returns a copy of these settings with every field present in `partial` overlaid.
    ///
    /// This is a shallow merge: collections are replaced wholesale, never combined.
    pub fn merged(&self, partial: &PartialComboFilterSettings) -> Self {
        let mut settings = self.clone();
        partial.apply_to(&mut settings);
        settings
    }
}

/// A set of optional overrides for `ComboFilterSettings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialComboFilterSettings {
    pub chain_grabbers: Option<Vec<MeleeCharacter>>,
    pub character_filter: Option<Vec<MeleeCharacter>>,
    pub port_filter: Option<Vec<u8>>,
    pub name_tags: Option<Vec<String>>,
    pub min_combo_length: Option<usize>,
    pub min_combo_percent: Option<f32>,
    pub combo_must_kill: Option<bool>,
    pub exclude_cpus: Option<bool>,
    pub exclude_chain_grabs: Option<bool>,
    pub exclude_wobbles: Option<bool>,
    pub large_hit_threshold: Option<f32>,
    pub wobble_threshold: Option<usize>,
    pub chain_grab_threshold: Option<f32>,
    pub per_character_min_combo_percent: Option<BTreeMap<MeleeCharacter, f32>>,
}

macro_rules! overlay {
    ($partial:expr, $settings:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$partial.$field {
                $settings.$field = value.clone();
            }
        )+
    };
}

impl PartialComboFilterSettings {
    fn apply_to(&self, settings: &mut ComboFilterSettings) {
        overlay!(
            self,
            settings,
            chain_grabbers,
            character_filter,
            port_filter,
            name_tags,
            min_combo_length,
            min_combo_percent,
            combo_must_kill,
            exclude_cpus,
            exclude_chain_grabs,
            exclude_wobbles,
            large_hit_threshold,
            wobble_threshold,
            chain_grab_threshold,
            per_character_min_combo_percent,
        );
    }

    /// Overlays `other` onto `self`; fields set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            chain_grabbers: other.chain_grabbers.or(self.chain_grabbers),
            character_filter: other.character_filter.or(self.character_filter),
            port_filter: other.port_filter.or(self.port_filter),
            name_tags: other.name_tags.or(self.name_tags),
            min_combo_length: other.min_combo_length.or(self.min_combo_length),
            min_combo_percent: other.min_combo_percent.or(self.min_combo_percent),
            combo_must_kill: other.combo_must_kill.or(self.combo_must_kill),
            exclude_cpus: other.exclude_cpus.or(self.exclude_cpus),
            exclude_chain_grabs: other.exclude_chain_grabs.or(self.exclude_chain_grabs),
            exclude_wobbles: other.exclude_wobbles.or(self.exclude_wobbles),
            large_hit_threshold: other.large_hit_threshold.or(self.large_hit_threshold),
            wobble_threshold: other.wobble_threshold.or(self.wobble_threshold),
            chain_grab_threshold: other.chain_grab_threshold.or(self.chain_grab_threshold),
            per_character_min_combo_percent: other
                .per_character_min_combo_percent
                .or(self.per_character_min_combo_percent),
        }
    }
}

impl From<ComboFilterSettings> for PartialComboFilterSettings {
    fn from(settings: ComboFilterSettings) -> Self {
        Self {
            chain_grabbers: Some(settings.chain_grabbers),
            character_filter: Some(settings.character_filter),
            port_filter: Some(settings.port_filter),
            name_tags: Some(settings.name_tags),
            min_combo_length: Some(settings.min_combo_length),
            min_combo_percent: Some(settings.min_combo_percent),
            combo_must_kill: Some(settings.combo_must_kill),
            exclude_cpus: Some(settings.exclude_cpus),
            exclude_chain_grabs: Some(settings.exclude_chain_grabs),
            exclude_wobbles: Some(settings.exclude_wobbles),
            large_hit_threshold: Some(settings.large_hit_threshold),
            wobble_threshold: Some(settings.wobble_threshold),
            chain_grab_threshold: Some(settings.chain_grab_threshold),
            per_character_min_combo_percent: Some(settings.per_character_min_combo_percent),
        }
    }
}
