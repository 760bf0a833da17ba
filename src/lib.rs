//! # phonorule
//!
//! A rule engine for sequences of phonological feature bundles.
//!
//! Words are sequences of segments, each described by a sparse
//! [`FeatureMatrix`](feature::FeatureMatrix). Ordered rewrite rules match
//! contextual patterns over those matrices and rewrite, delete or insert
//! segments in place; a syllabifier partitions the result into onset,
//! nucleus and coda groupings chosen by a ranked search.
//!
//! ## Example
//!
//! ```
//! use phonorule::prelude::*;
//!
//! let mut features = FeatureSet::new();
//! let voice = features.add_binary("voice").unwrap();
//!
//! // [] => [$voice] / _ [$voice]
//! let rule = Rule::builder("assimilation")
//!     .segment(RuleSegment::action(
//!         MatrixMatcher::any(),
//!         MatrixCombiner::new(vec![Producer::variable(&voice).unwrap()]),
//!     ))
//!     .segment(RuleSegment::context(MatrixMatcher::new(vec![
//!         Matchable::variable(&voice).unwrap(),
//!     ])))
//!     .build()
//!     .unwrap();
//!
//! let s = FeatureMatrix::new([voice.minus().unwrap()]);
//! let z = FeatureMatrix::new([voice.plus().unwrap()]);
//!
//! let mut rules = RuleSet::new();
//! rules.push(rule);
//! let mut grammar = Grammar::new(features, rules, EngineConfig::default());
//!
//! assert_eq!(grammar.apply(vec![s, z.clone()]).unwrap(), vec![z.clone(), z]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod feature;
pub mod grammar;
pub mod matcher;
pub mod rule;
pub mod segment;
pub mod syllable;
pub mod word;

pub use error::{Error, Result};

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::config::{EngineConfig, SyllableConfig};
    pub use crate::error::{Error, Result};
    pub use crate::feature::{Feature, FeatureMatrix, FeatureSet, FeatureValue, Value};
    pub use crate::grammar::Grammar;
    pub use crate::matcher::{
        Comparison, Matchable, MatrixCombiner, MatrixMatcher, Producer, RuleContext,
    };
    pub use crate::rule::{
        Boundary, NoopObserver, RecordingObserver, Rule, RuleEntry, RuleEvent, RuleObserver,
        RuleSegment, RuleSet, TracingObserver,
    };
    pub use crate::segment::{SegmentId, Tier};
    pub use crate::syllable::{SyllableBuilder, SyllableRule};
    pub use crate::word::{Direction, SegmentCursor, Word};
}
