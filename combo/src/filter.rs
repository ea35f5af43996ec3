use std::sync::Arc;

use serde_json::Value;

use slippi_clipper_logging::Log;

use crate::criteria::{Criterion, all_criteria};
use crate::{ComboError, ComboFilterSettings, ComboRecord, MatchContext, PartialComboFilterSettings};

/// Owns a combo acceptance policy and the ordered list of criteria it's checked against.
#[derive(Clone, Debug)]
pub struct ComboFilter {
    pub criteria: Vec<Arc<dyn Criterion>>,
    settings: ComboFilterSettings,
    original_settings: ComboFilterSettings,
}

impl Default for ComboFilter {
    fn default() -> Self {
        Self::new(PartialComboFilterSettings::default())
    }
}

impl ComboFilter {
    /// Creates a filter from the default settings with `options` overlaid.
    ///
    /// The merged result is remembered so that `reset_settings` can return to it later.
    pub fn new(options: PartialComboFilterSettings) -> Self {
        let settings = ComboFilterSettings::default().merged(&options);

        Self {
            criteria: all_criteria(),
            original_settings: settings.clone(),
            settings,
        }
    }

    /// Shallow-merges `options` over the current settings and returns the result.
    ///
    /// Values are not validated.
    pub fn update_settings(&mut self, options: &PartialComboFilterSettings) -> ComboFilterSettings {
        self.settings = self.settings.merged(options);
        tracing::debug!(target: Log::Combo, settings = ?self.settings, "Updated combo filter settings");
        self.get_settings()
    }

    /// Returns a copy of the current settings.
    pub fn get_settings(&self) -> ComboFilterSettings {
        self.settings.clone()
    }

    /// Restores the settings this filter was constructed with.
    pub fn reset_settings(&mut self) -> ComboFilterSettings {
        self.settings = self.original_settings.clone();
        self.get_settings()
    }

    /// Whether `combo` passes every registered criterion.
    pub fn is_combo(
        &self,
        combo: &ComboRecord,
        context: &MatchContext,
        metadata: Option<&Value>,
    ) -> Result<bool, ComboError> {
        check_combo(&self.settings, combo, context, Some(self.criteria.as_slice()), metadata)
    }
}

/// Checks `combo` against `criteria` in order, stopping at the first one that fails.
///
/// If `criteria` is `None` or empty, every built-in criterion is used.
pub fn check_combo(
    settings: &ComboFilterSettings,
    combo: &ComboRecord,
    context: &MatchContext,
    criteria: Option<&[Arc<dyn Criterion>]>,
    metadata: Option<&Value>,
) -> Result<bool, ComboError> {
    combo.validate()?;

    let defaults;
    let criteria: &[Arc<dyn Criterion>] = match criteria {
        Some(criteria) if !criteria.is_empty() => criteria,
        _ => {
            defaults = all_criteria();
            defaults.as_slice()
        },
    };

    for criterion in criteria {
        if !criterion.check(combo, context, settings, metadata)? {
            tracing::trace!(
                target: Log::Combo,
                criterion = criterion.name(),
                start_frame = combo.start_frame,
                "Combo rejected"
            );
            return Ok(false);
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::criteria::{ComboDidKill, MinComboLength};
    use crate::testing::{context, kill_combo};

    #[derive(Debug)]
    struct Constant(bool);

    impl Criterion for Constant {
        fn name(&self) -> &'static str {
            "constant"
        }

        fn check(&self, _: &ComboRecord, _: &MatchContext, _: &ComboFilterSettings, _: Option<&Value>) -> Result<bool, ComboError> {
            Ok(self.0)
        }
    }

    #[derive(Debug, Default)]
    struct Counting(AtomicUsize);

    impl Criterion for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn check(&self, _: &ComboRecord, _: &MatchContext, _: &ComboFilterSettings, _: Option<&Value>) -> Result<bool, ComboError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    fn kill_policy() -> PartialComboFilterSettings {
        PartialComboFilterSettings {
            combo_must_kill: Some(true),
            min_combo_length: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_only_long_enough_kills() {
        let filter = ComboFilter::new(kill_policy());
        let ctx = context();

        // 1 hit with a kill: fails on length.
        let mut short = kill_combo(3);
        short.moves.truncate(1);
        assert!(!filter.is_combo(&short, &ctx, None).unwrap());

        // 3 hits, no kill.
        let mut no_kill = kill_combo(3);
        no_kill.did_kill = false;
        assert!(!filter.is_combo(&no_kill, &ctx, None).unwrap());

        assert!(filter.is_combo(&kill_combo(3), &ctx, None).unwrap());
    }

    #[test]
    fn a_constant_false_criterion_rejects_everything() {
        let mut filter = ComboFilter::new(kill_policy());
        filter.criteria[4] = Arc::new(Constant(false));

        for hits in 0..5 {
            assert!(!filter.is_combo(&kill_combo(hits), &context(), None).unwrap());
        }
    }

    #[test]
    fn short_circuits_on_first_failure() {
        let counter = Arc::new(Counting::default());
        let criteria: Vec<Arc<dyn Criterion>> = vec![Arc::new(Constant(false)), counter.clone() as Arc<dyn Criterion>];

        let passed = check_combo(
            &ComboFilterSettings::default(),
            &kill_combo(3),
            &context(),
            Some(criteria.as_slice()),
            None,
        )
        .unwrap();

        assert!(!passed);
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn custom_subset_only_checks_what_it_lists() {
        let criteria: Vec<Arc<dyn Criterion>> = vec![Arc::new(ComboDidKill), Arc::new(MinComboLength)];
        let mut settings = ComboFilterSettings::default();
        settings.min_combo_length = 1;

        // Would fail the percent and large hit checks, but those aren't listed.
        let combo = kill_combo(1);
        assert!(check_combo(&settings, &combo, &context(), Some(criteria.as_slice()), None).unwrap());
        assert!(!check_combo(&settings, &combo, &context(), None, None).unwrap());
        assert!(!check_combo(&settings, &combo, &context(), Some(&[][..]), None).unwrap());
    }

    #[test]
    fn reset_returns_to_constructed_settings() {
        let mut filter = ComboFilter::new(PartialComboFilterSettings {
            min_combo_percent: Some(40.0),
            ..Default::default()
        });
        let constructed = filter.get_settings();

        filter.update_settings(&PartialComboFilterSettings {
            min_combo_percent: Some(10.0),
            ..Default::default()
        });
        filter.update_settings(&PartialComboFilterSettings {
            exclude_cpus: Some(false),
            ..Default::default()
        });

        let reset = filter.reset_settings();
        assert_eq!(reset, constructed);
        assert_eq!(reset.min_combo_percent, 40.0);
        assert_ne!(reset, ComboFilterSettings::default());
    }

    #[test]
    fn get_settings_is_a_copy() {
        let filter = ComboFilter::new(kill_policy());
        let combo = kill_combo(3);

        let mut copy = filter.get_settings();
        copy.combo_must_kill = false;
        copy.min_combo_length = 50;

        assert!(filter.is_combo(&combo, &context(), None).unwrap());
        assert_eq!(filter.get_settings().min_combo_length, 2);
    }

    #[test]
    fn malformed_combo_aborts_evaluation() {
        let filter = ComboFilter::default();
        let mut combo = kill_combo(3);
        combo.end_frame = Some(10);

        assert!(filter.is_combo(&combo, &context(), None).is_err());
    }
}
