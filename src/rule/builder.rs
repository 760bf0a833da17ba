//! Builder pattern for creating [`Rule`] instances.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{Rule, RuleBuildError, RuleSegment};
use crate::matcher::MatrixMatcher;
use crate::word::Direction;

/// Builder for constructing a [`Rule`] with a fluent API.
///
/// # Example
///
/// ```
/// use phonorule::feature::{FeatureSet, Value};
/// use phonorule::matcher::{Matchable, MatrixCombiner, MatrixMatcher, Producer};
/// use phonorule::rule::{Boundary, Rule, RuleSegment};
///
/// let mut features = FeatureSet::new();
/// let voice = features.add_binary("voice").unwrap();
///
/// let rule = Rule::builder("final-devoicing")
///     .segment(RuleSegment::action(
///         MatrixMatcher::new(vec![Matchable::value(&voice, Value::Plus).unwrap()]),
///         MatrixCombiner::new(vec![Producer::value(&voice, Value::Minus).unwrap()]),
///     ))
///     .segment(RuleSegment::Boundary(Boundary::Right))
///     .build()
///     .unwrap();
///
/// assert_eq!(rule.to_string(), "final-devoicing: [+voice] => [-voice] / _ #");
/// ```
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    name: String,
    pattern: Vec<RuleSegment>,
    exclusion: Option<Vec<RuleSegment>>,
    direction: Direction,
    filter: Option<MatrixMatcher>,
    probability: f64,
    seed: Option<u64>,
}

impl RuleBuilder {
    /// Create a builder for a rule called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: Vec::new(),
            exclusion: None,
            direction: Direction::Rightward,
            filter: None,
            probability: 1.0,
            seed: None,
        }
    }

    /// Append one primitive to the pattern.
    pub fn segment(mut self, segment: RuleSegment) -> Self {
        self.pattern.push(segment);
        self
    }

    /// Replace the whole pattern.
    pub fn pattern(mut self, pattern: Vec<RuleSegment>) -> Self {
        self.pattern = pattern;
        self
    }

    /// Veto windows where `exclusion` also matches.
    pub fn exclusion(mut self, exclusion: Vec<RuleSegment>) -> Self {
        self.exclusion = Some(exclusion);
        self
    }

    /// Order in which anchors are visited.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Only anchor on, and only step over, segments accepted by `filter`.
    pub fn filter(mut self, filter: MatrixMatcher) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Chance that any single window is attempted.
    pub fn probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    /// Seed the rule's stochastic gate.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the `Rule`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the name is empty
    /// - the probability is outside `[0, 1]`
    pub fn build(self) -> Result<Rule, RuleBuildError> {
        if self.name.trim().is_empty() {
            return Err(RuleBuildError::EmptyName);
        }
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(RuleBuildError::InvalidProbability(self.probability));
        }

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Rule {
            name: Arc::from(self.name),
            pattern: self.pattern,
            exclusion: self.exclusion,
            direction: self.direction,
            filter: self.filter,
            probability: self.probability,
            rng,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let rule = RuleBuilder::new("noop").build().unwrap();
        assert_eq!(rule.name(), "noop");
        assert_eq!(rule.direction(), Direction::Rightward);
        assert_eq!(rule.probability(), 1.0);
        assert!(rule.pattern().is_empty());
        assert!(rule.exclusion().is_none());
        assert!(rule.filter().is_none());
    }

    #[test]
    fn test_builder_validation() {
        assert_eq!(RuleBuilder::new("  ").build().unwrap_err(), RuleBuildError::EmptyName);
        assert_eq!(
            RuleBuilder::new("r").probability(1.5).build().unwrap_err(),
            RuleBuildError::InvalidProbability(1.5)
        );
        assert!(matches!(
            RuleBuilder::new("r").probability(f64::NAN).build(),
            Err(RuleBuildError::InvalidProbability(_))
        ));
        assert!(RuleBuilder::new("r").probability(0.0).build().is_ok());
    }
}
