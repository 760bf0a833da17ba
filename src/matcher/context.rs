//! Per-match scratch state.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::feature::{FeatureId, FeatureValue, Value};
use crate::segment::{SegmentId, Tier};

/// What a pattern variable captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A single feature's value (possibly null).
    Value(Value),
    /// Every non-node descendant of a node feature, nulls included.
    Group(SmallVec<[FeatureValue; 8]>),
}

/// Segments covered by a [`RuleSegment::Capture`](crate::rule::RuleSegment::Capture)
/// during one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Label given by the capture primitive.
    pub tier: Tier,
    /// Covered leaves in word order.
    pub segments: Vec<SegmentId>,
}

/// Scratch map binding pattern variables for one match attempt.
///
/// A context is created fresh for every anchor a rule tries and dropped once
/// that attempt (match, optional veto, combine) is over. Bindings made while
/// matching are visible to the combine step of the same attempt.
#[derive(Debug, Clone, Default)]
pub struct RuleContext {
    bindings: FxHashMap<FeatureId, Binding>,
    captures: Vec<Capture>,
}

impl RuleContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The binding for `feature`, if a variable already captured one.
    #[inline]
    pub fn binding(&self, feature: FeatureId) -> Option<&Binding> {
        self.bindings.get(&feature)
    }

    /// Bind `feature`, replacing any previous binding.
    #[inline]
    pub fn bind(&mut self, feature: FeatureId, binding: Binding) {
        self.bindings.insert(feature, binding);
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.captures.is_empty()
    }

    /// Record a capture.
    pub fn push_capture(&mut self, tier: Tier, segments: Vec<SegmentId>) {
        self.captures.push(Capture { tier, segments });
    }

    /// Captures recorded so far, in order.
    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }
}
