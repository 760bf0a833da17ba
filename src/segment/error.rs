//! Error types for the segment graph, words and cursors.

use thiserror::Error;

use super::{SegmentId, Tier};

/// Errors raised by segment, word and cursor operations.
///
/// `Deleted`, `InvalidCursor`, `TierMismatch` and `NotALeaf` are contract
/// violations: the operation is aborted. `NoAncestor` and `InvalidSpan` are
/// structural search failures reported to the immediate caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// The handle refers to a segment that has been removed.
    #[error("Segment {0} has been deleted")]
    Deleted(SegmentId),

    /// The cursor is before the first or after the last position.
    #[error("Cursor is not positioned on a segment")]
    InvalidCursor,

    /// A child was attached under a tier that does not admit it.
    #[error("Tier {child} cannot be a child of tier {parent}")]
    TierMismatch {
        /// Tier of the would-be parent
        parent: Tier,
        /// Tier of the rejected child
        child: Tier,
    },

    /// No ancestor of the requested tier exists.
    #[error("Segment {segment} has no {tier} ancestor")]
    NoAncestor {
        /// Segment searched from
        segment: SegmentId,
        /// Requested tier
        tier: Tier,
    },

    /// The start mark lies after the end mark, or a mark is not on a segment.
    #[error("Invalid span between marks")]
    InvalidSpan,

    /// A word-position operation was given a grouping segment.
    #[error("Segment {0} is not a word position")]
    NotALeaf(SegmentId),
}

/// A specialized `Result` type for segment operations.
pub type Result<T> = std::result::Result<T, SegmentError>;
