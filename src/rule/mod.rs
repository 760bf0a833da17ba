//! Rewrite rules over words.
//!
//! A [`Rule`] is an ordered list of [`RuleSegment`] primitives. For every
//! anchor of the word, in the rule's [`Direction`](crate::word::Direction):
//!
//! 1. the probability gate may skip the anchor,
//! 2. the pattern is matched on a read-only cursor (no mutation on failure),
//! 3. a matching exclusion vetoes the anchor,
//! 4. the pattern is combined on a mutable cursor over the same window.
//!
//! A [`RuleSet`] runs its entries in order and re-runs its persistent rules
//! to convergence after every application event. Diagnostics go to a
//! [`RuleObserver`] passed into each call.

mod builder;
mod definition;
pub mod error;
mod observer;
mod rule_set;
mod segment;

pub use builder::RuleBuilder;
pub use definition::Rule;
pub use error::{RuleBuildError, RuleError};
pub use observer::{NoopObserver, RecordingObserver, RuleEvent, RuleObserver, TracingObserver};
pub use rule_set::{RuleEntry, RuleSet, DEFAULT_MAX_PERSISTENT_PASSES};
pub use segment::{Boundary, RuleSegment};
