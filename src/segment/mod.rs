//! The hierarchical segment graph.
//!
//! Word positions and the syllable structure built over them are all
//! [`Segment`]s, tagged with a [`Tier`] and stored in a [`SegmentArena`].
//! Handles ([`SegmentId`]) stay valid until the segment is released and are
//! detectably stale afterwards.

mod arena;
pub mod error;
mod tier;

pub use arena::{Segment, SegmentArena, SegmentId};
pub use error::{Result, SegmentError};
pub use tier::Tier;
