//! Matching and rewriting primitives that make up a rule's pattern.
//!
//! Every primitive works in two phases against the same window:
//!
//! 1. [`RuleSegment::matches`] runs on a read-only cursor, may advance it, and
//!    binds variables into the [`RuleContext`].
//! 2. [`RuleSegment::combine`] runs on a mutable cursor with the bindings
//!    from phase 1 and performs the equivalent mutation.
//!
//! Cursor movement in both phases is identical, so the primitives that
//! follow observe the same positions. Deletions only take effect once the
//! caller commits the mutable cursor, and inserted segments are never
//! visited, so neither shifts a later primitive.

use std::fmt;

use super::{RuleBuildError, RuleError};
use crate::feature::FeatureMatrix;
use crate::matcher::{MatrixCombiner, MatrixMatcher, RuleContext};
use crate::segment::{Result, Tier};
use crate::word::{CursorMut, SegmentCursor};

/// Which end of the word a boundary anchor asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Nothing reachable precedes the cursor.
    Left,
    /// Nothing reachable follows the cursor.
    Right,
}

/// One primitive of a rule pattern.
#[derive(Debug, Clone)]
pub enum RuleSegment {
    /// Consume one segment that fits the matcher.
    Context(MatrixMatcher),
    /// Consume one segment that fits the matcher and rewrite its matrix.
    Action {
        /// Pattern the segment must fit
        matcher: MatrixMatcher,
        /// Replacement producer
        combiner: MatrixCombiner,
    },
    /// Consume one segment that fits the matcher and delete it.
    Delete(MatrixMatcher),
    /// Consume nothing; splice a new segment in after the cursor.
    Insert(MatrixCombiner),
    /// Consume any one segment.
    Step,
    /// Give back one segment.
    Backstep,
    /// Repeat a pattern-only sequence between `min` and `max` times.
    Repeat {
        /// Repeated sequence
        segments: Vec<RuleSegment>,
        /// Fewest repetitions
        min: usize,
        /// Most repetitions, unbounded if `None`
        max: Option<usize>,
    },
    /// Zero-width word boundary.
    Boundary(Boundary),
    /// Record the segments a pattern-only sequence covers.
    Capture {
        /// Label of the capture
        tier: Tier,
        /// Captured sequence
        segments: Vec<RuleSegment>,
    },
}

impl RuleSegment {
    /// Context primitive.
    pub fn context(matcher: MatrixMatcher) -> Self {
        RuleSegment::Context(matcher)
    }

    /// Rewrite primitive.
    pub fn action(matcher: MatrixMatcher, combiner: MatrixCombiner) -> Self {
        RuleSegment::Action { matcher, combiner }
    }

    /// Deletion primitive.
    pub fn delete(matcher: MatrixMatcher) -> Self {
        RuleSegment::Delete(matcher)
    }

    /// Insertion primitive.
    pub fn insert(combiner: MatrixCombiner) -> Self {
        RuleSegment::Insert(combiner)
    }

    /// Bounded repeat over pattern-only primitives.
    pub fn repeat(
        segments: Vec<RuleSegment>,
        min: usize,
        max: Option<usize>,
    ) -> std::result::Result<Self, RuleBuildError> {
        if let Some(max) = max {
            if min > max {
                return Err(RuleBuildError::InvertedRepeatBounds { min, max });
            }
        }
        ensure_pattern_only(&segments)?;
        Ok(RuleSegment::Repeat { segments, min, max })
    }

    /// `(...)*`
    pub fn zero_or_more(segments: Vec<RuleSegment>) -> std::result::Result<Self, RuleBuildError> {
        Self::repeat(segments, 0, None)
    }

    /// `(...)+`
    pub fn one_or_more(segments: Vec<RuleSegment>) -> std::result::Result<Self, RuleBuildError> {
        Self::repeat(segments, 1, None)
    }

    /// `(...)?`
    pub fn optional(segments: Vec<RuleSegment>) -> std::result::Result<Self, RuleBuildError> {
        Self::repeat(segments, 0, Some(1))
    }

    /// Capture over pattern-only primitives.
    pub fn capture(tier: Tier, segments: Vec<RuleSegment>) -> std::result::Result<Self, RuleBuildError> {
        ensure_pattern_only(&segments)?;
        Ok(RuleSegment::Capture { tier, segments })
    }

    /// Returns `true` if combining never mutates the word.
    pub fn is_pattern_only(&self) -> bool {
        match self {
            RuleSegment::Action { .. } | RuleSegment::Delete(_) | RuleSegment::Insert(_) => false,
            RuleSegment::Context(_)
            | RuleSegment::Step
            | RuleSegment::Backstep
            | RuleSegment::Boundary(_) => true,
            RuleSegment::Repeat { segments, .. } | RuleSegment::Capture { segments, .. } => {
                segments.iter().all(RuleSegment::is_pattern_only)
            }
        }
    }

    /// Test this primitive at the cursor, advancing past what it consumes.
    ///
    /// On failure the cursor may have moved; callers discard it.
    pub fn matches<C: SegmentCursor>(&self, ctx: &mut RuleContext, cursor: &mut C) -> Result<bool> {
        match self {
            RuleSegment::Context(matcher)
            | RuleSegment::Action { matcher, .. }
            | RuleSegment::Delete(matcher) => {
                if !cursor.advance()? {
                    return Ok(false);
                }
                Ok(matcher.matches(ctx, cursor.matrix()?))
            }
            RuleSegment::Insert(_) => Ok(true),
            RuleSegment::Step => cursor.advance(),
            RuleSegment::Backstep => {
                if cursor.is_before_first() {
                    return Ok(false);
                }
                cursor.retreat()?;
                Ok(true)
            }
            RuleSegment::Repeat { segments, min, max } => {
                repeat_matches(segments, *min, *max, ctx, cursor)
            }
            RuleSegment::Boundary(Boundary::Left) => Ok(cursor.is_before_first()),
            RuleSegment::Boundary(Boundary::Right) => {
                let mark = cursor.mark();
                let more = cursor.advance()?;
                cursor.revert(&mark);
                Ok(!more)
            }
            RuleSegment::Capture { segments, .. } => {
                for segment in segments {
                    if !segment.matches(ctx, cursor)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Perform this primitive's mutation.
    ///
    /// Only call after [`matches`](Self::matches) succeeded for the whole
    /// pattern. Recoverable value failures are pushed onto `anomalies`; the
    /// rest of the primitive still runs. Deletions are only scheduled: call
    /// [`CursorMut::commit`] once the whole pattern has been combined.
    pub fn combine(
        &self,
        ctx: &mut RuleContext,
        cursor: &mut CursorMut<'_>,
        anomalies: &mut Vec<RuleError>,
    ) -> Result<()> {
        match self {
            RuleSegment::Context(_) | RuleSegment::Step => {
                cursor.advance()?;
            }
            RuleSegment::Action { combiner, .. } => {
                cursor.advance()?;
                let current = cursor.matrix()?.clone();
                let (next, errors) = combiner.combine(ctx, &current);
                anomalies.extend(errors);
                cursor.set_matrix(next)?;
            }
            RuleSegment::Delete(_) => {
                cursor.advance()?;
                cursor.delete_on_commit()?;
            }
            RuleSegment::Insert(combiner) => {
                let (matrix, errors) = combiner.combine(ctx, &FeatureMatrix::empty());
                anomalies.extend(errors);
                cursor.insert_after(matrix)?;
            }
            RuleSegment::Backstep => {
                cursor.retreat()?;
            }
            RuleSegment::Repeat { segments, min, max } => {
                repeat_matches(segments, *min, *max, ctx, cursor)?;
            }
            RuleSegment::Boundary(_) => {}
            RuleSegment::Capture { tier, segments } => {
                // the capture starts from the furthest point the body stepped back to
                let mut lowest = cursor.mark();
                for segment in segments {
                    segment.combine(ctx, cursor, anomalies)?;
                    let mark = cursor.mark();
                    if mark.offset() < lowest.offset() {
                        lowest = mark;
                    }
                }
                let after = cursor.mark();
                let covered = if after.offset() <= lowest.offset() {
                    Vec::new()
                } else {
                    cursor.revert(&lowest);
                    cursor.advance()?;
                    let first = cursor.mark();
                    cursor.revert(&after);
                    cursor.span(&first, &after)?
                };
                ctx.push_capture(*tier, covered);
            }
        }
        Ok(())
    }
}

fn ensure_pattern_only(segments: &[RuleSegment]) -> std::result::Result<(), RuleBuildError> {
    match segments.iter().find(|s| !s.is_pattern_only()) {
        Some(s) => Err(RuleBuildError::MutatingPrimitiveInRepeat(s.to_string())),
        None => Ok(()),
    }
}

/// Greedy repeat. A repetition that fails part way restores both the cursor
/// and the bindings to the last complete repetition.
fn repeat_matches<C: SegmentCursor>(
    segments: &[RuleSegment],
    min: usize,
    max: Option<usize>,
    ctx: &mut RuleContext,
    cursor: &mut C,
) -> Result<bool> {
    let mut count = 0;
    while max.map_or(true, |max| count < max) {
        let mark = cursor.mark();
        let saved = ctx.clone();

        let mut complete = true;
        for segment in segments {
            if !segment.matches(ctx, cursor)? {
                complete = false;
                break;
            }
        }
        if !complete {
            cursor.revert(&mark);
            *ctx = saved;
            break;
        }

        count += 1;
        if cursor.mark() == mark {
            // zero-width body: any number of repetitions fits
            count = count.max(min);
            break;
        }
    }
    Ok(count >= min)
}

impl fmt::Display for RuleSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSegment::Context(matcher) => write!(f, "{}", matcher),
            RuleSegment::Action { matcher, combiner } => write!(f, "{} => {}", matcher, combiner),
            RuleSegment::Delete(matcher) => write!(f, "{} => 0", matcher),
            RuleSegment::Insert(combiner) => write!(f, "0 => {}", combiner),
            RuleSegment::Step => write!(f, "."),
            RuleSegment::Backstep => write!(f, "<"),
            RuleSegment::Boundary(_) => write!(f, "#"),
            RuleSegment::Repeat { segments, min, max } => {
                write!(f, "({})", join(segments))?;
                match (min, max) {
                    (0, None) => write!(f, "*"),
                    (1, None) => write!(f, "+"),
                    (0, Some(1)) => write!(f, "?"),
                    (min, None) => write!(f, "{{{},}}", min),
                    (min, Some(max)) => write!(f, "{{{},{}}}", min, max),
                }
            }
            RuleSegment::Capture { tier, segments } => write!(f, "{}({})", tier, join(segments)),
        }
    }
}

pub(crate) fn join(segments: &[RuleSegment]) -> String {
    segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Feature, FeatureSet, Value};
    use crate::matcher::{Matchable, Producer};
    use crate::word::Word;

    fn setup() -> (Feature, Word) {
        let mut set = FeatureSet::new();
        let height = set.add_scalar("height", None, None).unwrap();
        // a b b a
        let word = Word::new([0, 1, 1, 0].map(|n| FeatureMatrix::new([height.scalar(n).unwrap()])));
        (height, word)
    }

    fn is(height: &Feature, n: i32) -> RuleSegment {
        RuleSegment::context(MatrixMatcher::new(vec![Matchable::value(
            height,
            Value::Scalar(n),
        )
        .unwrap()]))
    }

    #[test]
    fn test_context_consumes_one() {
        let (height, word) = setup();
        let mut cursor = word.cursor(None);
        let mut ctx = RuleContext::new();
        assert!(is(&height, 0).matches(&mut ctx, &mut cursor).unwrap());
        assert!(is(&height, 1).matches(&mut ctx, &mut cursor).unwrap());
        assert!(!is(&height, 0).matches(&mut ctx, &mut cursor).unwrap());
    }

    #[test]
    fn test_repeat_restores_partial_attempt() {
        let (height, word) = setup();
        let pair = RuleSegment::zero_or_more(vec![is(&height, 1), is(&height, 1)]).unwrap();
        let mut ctx = RuleContext::new();

        let mut cursor = word.cursor(None);
        cursor.advance().unwrap();
        assert!(pair.matches(&mut ctx, &mut cursor).unwrap());
        assert!(is(&height, 0).matches(&mut ctx, &mut cursor).unwrap());

        // one "b" only: the half-finished second pair is given back
        let ids: Vec<_> = word.iter().collect();
        let mut cursor = word.cursor_at(ids[2], None).unwrap();
        assert!(pair.matches(&mut ctx, &mut cursor).unwrap());
        assert!(is(&height, 1).matches(&mut ctx, &mut cursor).unwrap());
    }

    #[test]
    fn test_repeat_bounds() {
        let (height, word) = setup();
        let ids: Vec<_> = word.iter().collect();
        let two = RuleSegment::repeat(vec![is(&height, 1)], 2, Some(2)).unwrap();
        let three = RuleSegment::repeat(vec![is(&height, 1)], 3, None).unwrap();
        let mut ctx = RuleContext::new();

        let mut cursor = word.cursor_at(ids[1], None).unwrap();
        assert!(two.matches(&mut ctx, &mut cursor).unwrap());
        let mut cursor = word.cursor_at(ids[1], None).unwrap();
        assert!(!three.matches(&mut ctx, &mut cursor).unwrap());

        assert_eq!(
            RuleSegment::repeat(vec![RuleSegment::Step], 3, Some(1)).unwrap_err(),
            RuleBuildError::InvertedRepeatBounds { min: 3, max: 1 }
        );
        assert!(matches!(
            RuleSegment::zero_or_more(vec![RuleSegment::delete(MatrixMatcher::any())]),
            Err(RuleBuildError::MutatingPrimitiveInRepeat(_))
        ));
    }

    #[test]
    fn test_zero_width_repeat_terminates() {
        let (_, word) = setup();
        let empty = RuleSegment::repeat(vec![RuleSegment::Boundary(Boundary::Left)], 2, None).unwrap();
        let mut cursor = word.cursor(None);
        assert!(empty.matches(&mut RuleContext::new(), &mut cursor).unwrap());
    }

    #[test]
    fn test_boundaries() {
        let (_, word) = setup();
        let ids: Vec<_> = word.iter().collect();
        let left = RuleSegment::Boundary(Boundary::Left);
        let right = RuleSegment::Boundary(Boundary::Right);
        let mut ctx = RuleContext::new();

        let mut cursor = word.cursor_at(ids[0], None).unwrap();
        assert!(left.matches(&mut ctx, &mut cursor).unwrap());
        let mut cursor = word.cursor_at(ids[1], None).unwrap();
        assert!(!left.matches(&mut ctx, &mut cursor).unwrap());

        let mut cursor = word.cursor_at(ids[3], None).unwrap();
        assert!(!right.matches(&mut ctx, &mut cursor).unwrap());
        cursor.advance().unwrap();
        assert!(right.matches(&mut ctx, &mut cursor).unwrap());
        assert_eq!(cursor.current().unwrap(), ids[3]);
    }

    #[test]
    fn test_backstep() {
        let (height, word) = setup();
        let mut ctx = RuleContext::new();
        let mut cursor = word.cursor(None);
        assert!(!RuleSegment::Backstep.matches(&mut ctx, &mut cursor).unwrap());

        assert!(RuleSegment::Step.matches(&mut ctx, &mut cursor).unwrap());
        assert!(RuleSegment::Backstep.matches(&mut ctx, &mut cursor).unwrap());
        assert!(is(&height, 0).matches(&mut ctx, &mut cursor).unwrap());
    }

    #[test]
    fn test_backstep_from_window_start() {
        let (height, word) = setup();
        let ids: Vec<_> = word.iter().collect();
        let mut ctx = RuleContext::new();

        let mut cursor = word.cursor_at(ids[1], None).unwrap();
        assert!(RuleSegment::Backstep.matches(&mut ctx, &mut cursor).unwrap());
        assert!(is(&height, 0).matches(&mut ctx, &mut cursor).unwrap());
        assert_eq!(cursor.current().unwrap(), ids[0]);

        let mut cursor = word.cursor_at(ids[0], None).unwrap();
        assert!(!RuleSegment::Backstep.matches(&mut ctx, &mut cursor).unwrap());
    }

    #[test]
    fn test_backstep_after_delete_revisits_deleted() {
        let (height, mut word) = setup();
        let ids: Vec<_> = word.iter().collect();
        let pattern = [
            RuleSegment::delete(MatrixMatcher::any()),
            RuleSegment::Backstep,
            RuleSegment::action(
                MatrixMatcher::any(),
                MatrixCombiner::new(vec![Producer::value(&height, Value::Scalar(9)).unwrap()]),
            ),
        ];

        let mut ctx = RuleContext::new();
        let mut anomalies = Vec::new();
        {
            let mut cursor = word.cursor_mut_at(ids[1], None).unwrap();
            for segment in &pattern {
                segment.combine(&mut ctx, &mut cursor, &mut anomalies).unwrap();
            }
            assert_eq!(cursor.current().unwrap(), ids[1]);
            assert_eq!(cursor.commit().unwrap().len(), 1);
        }

        // the rewrite went to the deleted segment, its neighbours are untouched
        let heights: Vec<_> = word
            .matrices()
            .iter()
            .map(|m| m.value_of(height.id()))
            .collect();
        assert_eq!(heights, [0, 1, 0].map(Value::Scalar).to_vec());
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_capture_counts_segments_revisited() {
        let (height, mut word) = setup();
        let ids: Vec<_> = word.iter().collect();
        let capture = RuleSegment::capture(Tier::Coda, vec![RuleSegment::Backstep, is(&height, 1)]).unwrap();

        let mut ctx = RuleContext::new();
        let mut anomalies = Vec::new();
        let mut cursor = word.cursor_mut_at(ids[1], None).unwrap();
        RuleSegment::Step.combine(&mut ctx, &mut cursor, &mut anomalies).unwrap();
        let before = cursor.mark();
        capture.combine(&mut ctx, &mut cursor, &mut anomalies).unwrap();

        assert_eq!(cursor.mark(), before);
        assert_eq!(ctx.captures()[0].segments, vec![ids[1]]);
    }

    #[test]
    fn test_capture_records_span() {
        let (height, mut word) = setup();
        let ids: Vec<_> = word.iter().collect();
        let capture = RuleSegment::capture(
            Tier::Nucleus,
            vec![RuleSegment::one_or_more(vec![is(&height, 1)]).unwrap()],
        )
        .unwrap();
        let nothing = RuleSegment::capture(Tier::Onset, Vec::new()).unwrap();

        let mut ctx = RuleContext::new();
        let mut anomalies = Vec::new();
        let mut cursor = word.cursor_mut_at(ids[1], None).unwrap();
        nothing.combine(&mut ctx, &mut cursor, &mut anomalies).unwrap();
        capture.combine(&mut ctx, &mut cursor, &mut anomalies).unwrap();

        assert_eq!(ctx.captures()[0].segments, Vec::new());
        assert_eq!(ctx.captures()[1].tier, Tier::Nucleus);
        assert_eq!(ctx.captures()[1].segments, ids[1..3].to_vec());
    }

    #[test]
    fn test_display() {
        let (height, _) = setup();
        let star = RuleSegment::zero_or_more(vec![is(&height, 1)]).unwrap();
        assert_eq!(star.to_string(), "([height=1])*");
        let bounded = RuleSegment::repeat(vec![RuleSegment::Step], 2, Some(3)).unwrap();
        assert_eq!(bounded.to_string(), "(.){2,3}");
        assert!(!RuleSegment::insert(MatrixCombiner::Identity).is_pattern_only());
        assert!(star.is_pattern_only());
    }
}
