//! A feature set, a rule set and engine settings, bundled.
//!
//! This is what a rule-file front end hands over: everything needed to turn
//! one pronunciation into another.

use std::path::Path;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::feature::{FeatureMatrix, FeatureSet};
use crate::rule::{RuleObserver, RuleSet, TracingObserver};
use crate::word::Word;

/// Features, rules and settings for one language.
#[derive(Debug, Clone)]
pub struct Grammar {
    features: FeatureSet,
    rules: RuleSet,
    config: EngineConfig,
}

impl Grammar {
    /// Bundle `features` and `rules` under `config`.
    ///
    /// The config is applied to the rules right away.
    pub fn new(features: FeatureSet, mut rules: RuleSet, config: EngineConfig) -> Self {
        rules.configure(&config);
        Self {
            features,
            rules,
            config,
        }
    }

    /// Like [`new`](Self::new), reading the config from a JSON file.
    pub fn with_config_file(features: FeatureSet, rules: RuleSet, path: impl AsRef<Path>) -> Result<Self> {
        let config = EngineConfig::load(path)?;
        Ok(Self::new(features, rules, config))
    }

    /// The feature set.
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// The rule set.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The rule set, mutably.
    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    /// The settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the rules over `pronunciation` and return the result, logging
    /// through `tracing`.
    pub fn apply<I>(&mut self, pronunciation: I) -> Result<Vec<FeatureMatrix>>
    where
        I: IntoIterator<Item = FeatureMatrix>,
    {
        self.apply_observed(pronunciation, &mut TracingObserver)
    }

    /// Run the rules over `pronunciation`, reporting to `observer`.
    pub fn apply_observed<I>(
        &mut self,
        pronunciation: I,
        observer: &mut dyn RuleObserver,
    ) -> Result<Vec<FeatureMatrix>>
    where
        I: IntoIterator<Item = FeatureMatrix>,
    {
        Ok(self.apply_to_word(pronunciation, observer)?.matrices())
    }

    /// Run the rules over `pronunciation` and keep the whole word, syllable
    /// structure included.
    pub fn apply_to_word<I>(&mut self, pronunciation: I, observer: &mut dyn RuleObserver) -> Result<Word>
    where
        I: IntoIterator<Item = FeatureMatrix>,
    {
        let mut word = Word::new(pronunciation);
        let applications = self.rules.apply(&mut word, observer)?;
        tracing::debug!(applications, segments = word.len(), "grammar applied");
        Ok(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::Value;
    use crate::matcher::{Matchable, MatrixCombiner, MatrixMatcher, Producer};
    use crate::rule::{Rule, RuleSegment};

    #[test]
    fn test_apply_rewrites_pronunciation() {
        let mut features = FeatureSet::new();
        let voice = features.add_binary("voice").unwrap();
        let mut rules = RuleSet::new();
        rules.push(
            Rule::builder("devoice")
                .segment(RuleSegment::action(
                    MatrixMatcher::new(vec![Matchable::value(&voice, Value::Plus).unwrap()]),
                    MatrixCombiner::new(vec![Producer::value(&voice, Value::Minus).unwrap()]),
                ))
                .build()
                .unwrap(),
        );
        let config = EngineConfig {
            max_persistent_passes: 5,
            ..EngineConfig::default()
        };
        let mut grammar = Grammar::new(features, rules, config);
        assert_eq!(grammar.rules().max_persistent_passes(), 5);

        let z = FeatureMatrix::new([voice.plus().unwrap()]);
        let s = FeatureMatrix::new([voice.minus().unwrap()]);
        let out = grammar.apply(vec![z.clone(), s.clone(), z]).unwrap();
        assert_eq!(out, vec![s.clone(), s.clone(), s]);
        assert_eq!(grammar.features().len(), 1);
    }
}
