//! Pattern tests and value production over feature matrices.
//!
//! A [`MatrixMatcher`] decides whether a segment's matrix fits a pattern; a
//! [`MatrixCombiner`] computes the segment's replacement matrix. Both are
//! built from single-feature parts ([`Matchable`] and [`Producer`]) and share
//! a [`RuleContext`] so a variable bound while matching can be written back
//! while combining (`[$voice] => ...`).
//!
//! # Examples
//!
//! ```
//! use phonorule::feature::{FeatureMatrix, FeatureSet, Value};
//! use phonorule::matcher::{Matchable, MatrixCombiner, MatrixMatcher, Producer, RuleContext};
//!
//! let mut features = FeatureSet::new();
//! let voice = features.add_binary("voice").unwrap();
//! let s = FeatureMatrix::new([voice.minus().unwrap()]);
//!
//! let voiceless = MatrixMatcher::new(vec![Matchable::value(&voice, Value::Minus).unwrap()]);
//! let voice_it = MatrixCombiner::new(vec![Producer::value(&voice, Value::Plus).unwrap()]);
//!
//! let mut ctx = RuleContext::new();
//! assert!(voiceless.matches(&mut ctx, &s));
//! let (z, anomalies) = voice_it.combine(&mut ctx, &s);
//! assert!(anomalies.is_empty());
//! assert_eq!(z.value_of(voice.id()), Value::Plus);
//! ```

mod context;
mod matchable;
mod producer;

pub use context::{Binding, Capture, RuleContext};
pub use matchable::{Comparison, Matchable};
pub use producer::{Overrides, Producer};

use std::fmt;

use crate::feature::{FeatureMatrix, FeatureSet, FeatureValue, Result};
use crate::rule::RuleError;

/// A conjunction of [`Matchable`]s.
///
/// An empty conjunction matches everything. [`MatrixMatcher::Never`] matches
/// nothing and is used to build exclusion clauses that can never veto.
#[derive(Debug, Clone)]
pub enum MatrixMatcher {
    /// Matches no matrix.
    Never,
    /// Matches when every member matches.
    All(Vec<Matchable>),
}

impl MatrixMatcher {
    /// Conjunction of `members`.
    pub fn new(members: Vec<Matchable>) -> Self {
        MatrixMatcher::All(members)
    }

    /// The empty conjunction.
    pub fn any() -> Self {
        MatrixMatcher::All(Vec::new())
    }

    /// Matches every non-null value of `matrix`.
    pub fn from_matrix(features: &FeatureSet, matrix: &FeatureMatrix) -> Result<Self> {
        matrix
            .iter()
            .map(|v| Matchable::of(features, v))
            .collect::<Result<Vec<_>>>()
            .map(MatrixMatcher::All)
    }

    /// Test `m`, binding variables into `ctx`.
    ///
    /// Members are tested in order and testing stops at the first failure,
    /// so a failed match may leave earlier bindings behind.
    pub fn matches(&self, ctx: &mut RuleContext, m: &FeatureMatrix) -> bool {
        match self {
            MatrixMatcher::Never => false,
            MatrixMatcher::All(members) => members.iter().all(|x| x.matches(ctx, m)),
        }
    }

    /// Test `m` with a throwaway context. Used for anchor filters.
    pub fn accepts(&self, m: &FeatureMatrix) -> bool {
        self.matches(&mut RuleContext::new(), m)
    }
}

impl Default for MatrixMatcher {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for MatrixMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixMatcher::Never => write!(f, "[never]"),
            MatrixMatcher::All(members) => {
                let parts: Vec<String> = members.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(" "))
            }
        }
    }
}

/// Produces a segment's replacement matrix.
///
/// [`MatrixCombiner::Identity`] hands back the very same matrix (see
/// [`FeatureMatrix::ptr_eq`]). A combiner with no producers yields an equal
/// but freshly built matrix. A combiner built from every feature's null value
/// empties the matrix.
#[derive(Debug, Clone)]
pub enum MatrixCombiner {
    /// Leave the matrix untouched.
    Identity,
    /// Apply producers in order; later ones override earlier ones.
    Produce(Vec<Producer>),
}

impl MatrixCombiner {
    /// Combiner applying `producers` in order.
    pub fn new(producers: Vec<Producer>) -> Self {
        MatrixCombiner::Produce(producers)
    }

    /// Writes every value of `values`, nulls included.
    pub fn from_values<I>(features: &FeatureSet, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = FeatureValue>,
    {
        values
            .into_iter()
            .map(|v| {
                let feature = features.get_by_id(v.feature()).ok_or_else(|| {
                    crate::feature::FeatureError::UnknownFeature(v.feature().to_string())
                })?;
                Producer::value(feature, v.value())
            })
            .collect::<Result<Vec<_>>>()
            .map(MatrixCombiner::Produce)
    }

    /// Writes every non-null value of `matrix`.
    pub fn from_matrix(features: &FeatureSet, matrix: &FeatureMatrix) -> Result<Self> {
        Self::from_values(features, matrix.iter())
    }

    /// Combine `matrix` with this combiner.
    ///
    /// Producers that raise a [`RuleError`] contribute nothing; their errors
    /// are returned alongside the new matrix so the caller can report them.
    pub fn combine(
        &self,
        ctx: &mut RuleContext,
        matrix: &FeatureMatrix,
    ) -> (FeatureMatrix, Vec<RuleError>) {
        let producers = match self {
            MatrixCombiner::Identity => return (matrix.clone(), Vec::new()),
            MatrixCombiner::Produce(producers) => producers,
        };

        let mut errors = Vec::new();
        let mut overrides = Overrides::new();
        for producer in producers {
            match producer.produce(ctx, matrix) {
                Ok(values) => overrides.extend(values),
                Err(e) => errors.push(e),
            }
        }

        let combined = FeatureMatrix::new(matrix.iter().chain(overrides));
        (combined, errors)
    }
}

impl fmt::Display for MatrixCombiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixCombiner::Identity => write!(f, "[]"),
            MatrixCombiner::Produce(producers) => {
                let parts: Vec<String> = producers.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(" "))
            }
        }
    }
}
