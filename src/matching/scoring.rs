use crate::core::preset::Preset;
use crate::core::tags::{PatternMatch, Tags};

/// Score returned when a preset's required tags are not satisfied.
///
/// Always below the fallback baseline, so a disqualified preset never wins.
pub const DISQUALIFIED: f64 = -1.0;

/// Breakdown of how a tag set satisfied a preset's required tags
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetScore {
    /// Required keys matched by an exact or multi-value pattern
    pub exact_keys: usize,

    /// Required keys matched by a wildcard pattern
    pub wildcard_keys: usize,

    /// Weighted total; [`DISQUALIFIED`] when any requirement failed
    pub value: f64,
}

impl PresetScore {
    /// Score a preset against an entity's tags.
    ///
    /// Each exact requirement contributes the preset's full `match_score`, each
    /// wildcard requirement half of it. A preset without required tags scores
    /// its baseline.
    #[must_use]
    pub fn calculate(preset: &Preset, tags: &Tags) -> Self {
        let base = preset.match_score;
        if preset.tags.is_empty() {
            return Self {
                exact_keys: 0,
                wildcard_keys: 0,
                value: base,
            };
        }

        let mut exact_keys = 0usize;
        let mut wildcard_keys = 0usize;
        let mut value = 0.0;

        for (key, pattern) in preset.tags.iter() {
            match tags.get(key).and_then(|v| pattern.matches(v)) {
                Some(PatternMatch::Exact) => {
                    exact_keys += 1;
                    value += base;
                }
                Some(PatternMatch::Wildcard) => {
                    wildcard_keys += 1;
                    value += base / 2.0;
                }
                None => return Self::disqualified(),
            }
        }

        Self {
            exact_keys,
            wildcard_keys,
            value,
        }
    }

    #[must_use]
    pub fn disqualified() -> Self {
        Self {
            exact_keys: 0,
            wildcard_keys: 0,
            value: DISQUALIFIED,
        }
    }

    #[must_use]
    pub fn qualifies(&self) -> bool {
        self.value >= 0.0
    }
}

/// Numeric specificity score of a preset for a tag set
#[must_use]
pub fn score_preset(preset: &Preset, tags: &Tags) -> f64 {
    PresetScore::calculate(preset, tags).value
}
