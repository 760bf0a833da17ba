//! A single rewrite rule and its application loop.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::observer::{RuleEvent, RuleObserver};
use super::segment::{join, RuleSegment};
use super::RuleBuilder;
use crate::matcher::{MatrixMatcher, RuleContext};
use crate::segment::{Result, SegmentId};
use crate::word::{Direction, Word};

/// An ordered pattern of primitives applied at every anchor of a word.
///
/// Build one with [`Rule::builder`].
#[derive(Debug, Clone)]
pub struct Rule {
    pub(super) name: Arc<str>,
    pub(super) pattern: Vec<RuleSegment>,
    pub(super) exclusion: Option<Vec<RuleSegment>>,
    pub(super) direction: Direction,
    pub(super) filter: Option<MatrixMatcher>,
    pub(super) probability: f64,
    pub(super) rng: StdRng,
}

impl Rule {
    /// Start building a rule called `name`.
    pub fn builder(name: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(name)
    }

    /// The rule's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pattern primitives.
    pub fn pattern(&self) -> &[RuleSegment] {
        &self.pattern
    }

    /// The exclusion primitives, if any.
    pub fn exclusion(&self) -> Option<&[RuleSegment]> {
        self.exclusion.as_deref()
    }

    /// Anchor order.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The anchor filter, if any.
    pub fn filter(&self) -> Option<&MatrixMatcher> {
        self.filter.as_ref()
    }

    /// Chance that a window is attempted.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Restart the stochastic gate from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Run one pass of this rule over `word`.
    ///
    /// Returns how many windows were rewritten. Value anomalies are reported
    /// to `observer` and never fail the pass; only contract violations
    /// (e.g. touching a deleted segment) do.
    pub fn apply(&mut self, word: &mut Word, observer: &mut dyn RuleObserver) -> Result<usize> {
        self.apply_with(word, observer, |_, _, _| Ok(()))
    }

    /// Like [`apply`](Self::apply), calling `on_applied` after every rewrite
    /// with the word and the bindings of that window.
    pub(crate) fn apply_with<F>(
        &mut self,
        word: &mut Word,
        observer: &mut dyn RuleObserver,
        mut on_applied: F,
    ) -> Result<usize>
    where
        F: FnMut(&mut Word, &RuleContext, &mut dyn RuleObserver) -> Result<()>,
    {
        let name = self.name.clone();
        observer.notify(&RuleEvent::Entered { rule: name.clone() });

        let mut applications = 0;
        for anchor in word.anchors(self.direction) {
            let Ok(matrix) = word.matrix(anchor) else {
                continue;
            };
            if !self.filter.as_ref().map_or(true, |f| f.accepts(matrix)) {
                continue;
            }
            if self.probability < 1.0 && self.rng.gen::<f64>() >= self.probability {
                continue;
            }

            let filter = self.filter.as_ref();
            let mut ctx = RuleContext::new();
            if !match_all(&self.pattern, word, anchor, filter, &mut ctx)? {
                continue;
            }
            if let Some(exclusion) = &self.exclusion {
                let mut veto = ctx.clone();
                if match_all(exclusion, word, anchor, filter, &mut veto)? {
                    continue;
                }
            }

            let mut anomalies = Vec::new();
            {
                let mut cursor = word.cursor_mut_at(anchor, filter)?;
                for segment in &self.pattern {
                    segment.combine(&mut ctx, &mut cursor, &mut anomalies)?;
                }
                cursor.commit()?;
            }
            for error in anomalies {
                observer.notify(&RuleEvent::Anomaly {
                    rule: name.clone(),
                    error,
                });
            }

            applications += 1;
            observer.notify(&RuleEvent::Applied {
                rule: name.clone(),
                anchor,
            });
            on_applied(word, &ctx, observer)?;
        }

        observer.notify(&RuleEvent::Exited {
            rule: name,
            applications,
        });
        Ok(applications)
    }

    /// The rule body without its name, e.g. `[+voice] => [-voice] / _ #`.
    pub fn describe(&self) -> String {
        let start = self.pattern.iter().position(|s| !s.is_pattern_only());
        let mut out = match start {
            None => join(&self.pattern),
            Some(start) => {
                let end = self.pattern[start..]
                    .iter()
                    .position(RuleSegment::is_pattern_only)
                    .map_or(self.pattern.len(), |n| start + n);
                let (targets, replacements): (Vec<String>, Vec<String>) = self.pattern[start..end]
                    .iter()
                    .map(split_action)
                    .unzip();

                let mut out = format!("{} => {}", targets.join(" "), replacements.join(" "));
                let left = &self.pattern[..start];
                let right = &self.pattern[end..];
                if !left.is_empty() || !right.is_empty() {
                    let mut context = vec!["_".to_string()];
                    if !left.is_empty() {
                        context.insert(0, join(left));
                    }
                    if !right.is_empty() {
                        context.push(join(right));
                    }
                    out.push_str(" / ");
                    out.push_str(&context.join(" "));
                }
                out
            }
        };
        if let Some(exclusion) = &self.exclusion {
            out.push_str(" // ");
            out.push_str(&join(exclusion));
        }
        out
    }
}

/// Target and replacement halves of a mutating primitive.
fn split_action(segment: &RuleSegment) -> (String, String) {
    match segment {
        RuleSegment::Action { matcher, combiner } => (matcher.to_string(), combiner.to_string()),
        RuleSegment::Delete(matcher) => (matcher.to_string(), "0".to_string()),
        RuleSegment::Insert(combiner) => ("0".to_string(), combiner.to_string()),
        other => (other.to_string(), other.to_string()),
    }
}

fn match_all(
    segments: &[RuleSegment],
    word: &Word,
    anchor: SegmentId,
    filter: Option<&MatrixMatcher>,
    ctx: &mut RuleContext,
) -> Result<bool> {
    let mut cursor = word.cursor_at(anchor, filter)?;
    for segment in segments {
        if !segment.matches(ctx, &mut cursor)? {
            return Ok(false);
        }
    }
    Ok(true)
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Feature, FeatureMatrix, FeatureSet, Value};
    use crate::matcher::{Matchable, MatrixCombiner, Producer};
    use crate::rule::{NoopObserver, RecordingObserver};

    fn setup() -> (Feature, Word) {
        let mut set = FeatureSet::new();
        let height = set.add_scalar("height", Some(0), Some(3)).unwrap();
        let word = Word::new([0, 1, 0, 1].map(|n| FeatureMatrix::new([height.scalar(n).unwrap()])));
        (height, word)
    }

    fn is(height: &Feature, n: i32) -> MatrixMatcher {
        MatrixMatcher::new(vec![Matchable::value(height, Value::Scalar(n)).unwrap()])
    }

    fn heights(height: &Feature, word: &Word) -> Vec<i32> {
        word.matrices()
            .iter()
            .filter_map(|m| m.value_of(height.id()).as_scalar())
            .collect()
    }

    #[test]
    fn test_rewrites_every_match() {
        let (height, mut word) = setup();
        let mut rule = Rule::builder("raise")
            .segment(RuleSegment::action(
                is(&height, 0),
                MatrixCombiner::new(vec![Producer::add(&height, 2).unwrap()]),
            ))
            .build()
            .unwrap();
        let n = rule.apply(&mut word, &mut NoopObserver).unwrap();
        assert_eq!(n, 2);
        assert_eq!(heights(&height, &word), vec![2, 1, 2, 1]);
    }

    #[test]
    fn test_anomaly_is_reported_and_rule_continues() {
        let (height, mut word) = setup();
        let mut rule = Rule::builder("overflow")
            .segment(RuleSegment::action(
                MatrixMatcher::any(),
                MatrixCombiner::new(vec![Producer::add(&height, 3).unwrap()]),
            ))
            .build()
            .unwrap();
        let mut observer = RecordingObserver::new();
        rule.apply(&mut word, &mut observer).unwrap();

        assert_eq!(heights(&height, &word), vec![3, 1, 3, 1]);
        assert_eq!(observer.anomalies().len(), 2);
        assert_eq!(observer.applications("overflow"), 4);
        assert!(matches!(observer.events().first(), Some(RuleEvent::Entered { .. })));
        assert!(matches!(
            observer.events().last(),
            Some(RuleEvent::Exited { applications: 4, .. })
        ));
    }

    #[test]
    fn test_leftward_order() {
        let (height, mut word) = setup();
        let spread = || {
            Rule::builder("spread")
                .segment(RuleSegment::context(is(&height, 1)))
                .segment(RuleSegment::action(
                    is(&height, 0),
                    MatrixCombiner::new(vec![Producer::value(&height, Value::Scalar(1)).unwrap()]),
                ))
        };
        let mut leftward = spread().direction(Direction::Leftward).build().unwrap();
        leftward.apply(&mut word, &mut NoopObserver).unwrap();
        assert_eq!(heights(&height, &word), vec![0, 1, 1, 1]);
    }

    #[test]
    fn test_deleting_while_scanning() {
        let (height, mut word) = setup();
        let mut rule = Rule::builder("drop")
            .segment(RuleSegment::delete(is(&height, 0)))
            .build()
            .unwrap();
        assert_eq!(rule.apply(&mut word, &mut NoopObserver).unwrap(), 2);
        assert_eq!(heights(&height, &word), vec![1, 1]);
    }

    #[test]
    fn test_describe() {
        let (height, _) = setup();
        let rule = Rule::builder("drop")
            .segment(RuleSegment::context(is(&height, 1)))
            .segment(RuleSegment::delete(is(&height, 0)))
            .exclusion(vec![RuleSegment::Step])
            .build()
            .unwrap();
        assert_eq!(rule.describe(), "[height=0] => 0 / [height=1] _ // .");
        assert_eq!(rule.to_string(), "drop: [height=0] => 0 / [height=1] _ // .");
    }
}
