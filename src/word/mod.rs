//! The mutable word: an ordered sequence of leaf segments.
//!
//! Leaves are linked in both directions through the segment arena, so a
//! [`SegmentId`] stays meaningful while neighbours are inserted or deleted.
//! Grouping segments (onsets, rimes, syllables, ...) live in the same arena
//! but are never part of the leaf sequence.
//!
//! Traversal goes through cursors ([`Cursor`], [`CursorMut`]) obtained from
//! [`Word::cursor_at`] or through [`Word::slice`], which yields one window per
//! anchor.

mod cursor;

pub use cursor::{Cursor, CursorMut, Mark, SegmentCursor, Slice, Slices};

use cursor::{Navigator, Pos};
use serde::{Deserialize, Serialize};

use crate::feature::{FeatureMatrix, FeatureSet};
use crate::matcher::MatrixMatcher;
use crate::segment::{Result, Segment, SegmentArena, SegmentError, SegmentId, Tier};

/// Order in which a rule visits anchors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// First position to last.
    #[default]
    Rightward,
    /// Last position to first.
    Leftward,
}

/// An ordered, mutable sequence of leaf segments.
#[derive(Debug, Clone, Default)]
pub struct Word {
    arena: SegmentArena,
    head: Option<SegmentId>,
    tail: Option<SegmentId>,
    len: usize,
}

impl Word {
    /// Build a word from a pronunciation.
    pub fn new<I>(pronunciation: I) -> Self
    where
        I: IntoIterator<Item = FeatureMatrix>,
    {
        let mut word = Self::default();
        for matrix in pronunciation {
            word.push_back(matrix);
        }
        word
    }

    /// Number of leaves.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the word has no leaves.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First leaf.
    #[inline]
    pub fn first(&self) -> Option<SegmentId> {
        self.head
    }

    /// Last leaf.
    #[inline]
    pub fn last(&self) -> Option<SegmentId> {
        self.tail
    }

    /// Leaves in order.
    pub fn iter(&self) -> Leaves<'_> {
        Leaves {
            word: self,
            next: self.head,
        }
    }

    /// The leaves' matrices in order, for re-spelling.
    pub fn matrices(&self) -> Vec<FeatureMatrix> {
        self.iter()
            .filter_map(|id| self.matrix(id).ok().cloned())
            .collect()
    }

    /// Render every leaf, e.g. `[-voice] [+voice]`.
    pub fn describe(&self, features: &FeatureSet) -> String {
        self.matrices()
            .iter()
            .map(|m| m.describe(features))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Returns `true` if `id` is a live leaf of this word.
    pub fn contains(&self, id: SegmentId) -> bool {
        self.leaf(id).is_ok()
    }

    /// The segment behind `id`, leaf or group.
    pub fn segment(&self, id: SegmentId) -> Result<&Segment> {
        self.arena.get(id)
    }

    /// The matrix of `id`.
    pub fn matrix(&self, id: SegmentId) -> Result<&FeatureMatrix> {
        Ok(self.arena.get(id)?.matrix())
    }

    /// Replace the matrix of `id` without touching linkage.
    pub fn set_matrix(&mut self, id: SegmentId, matrix: FeatureMatrix) -> Result<()> {
        self.arena.set_matrix(id, matrix)
    }

    /// The tier of `id`.
    pub fn tier(&self, id: SegmentId) -> Result<Tier> {
        Ok(self.arena.get(id)?.tier())
    }

    /// Leaf after `id`.
    pub fn next(&self, id: SegmentId) -> Result<Option<SegmentId>> {
        Ok(self.leaf(id)?.next)
    }

    /// Leaf before `id`.
    pub fn prev(&self, id: SegmentId) -> Result<Option<SegmentId>> {
        Ok(self.leaf(id)?.prev)
    }

    /// Zero-based position of leaf `id`.
    pub fn index_of(&self, id: SegmentId) -> Result<usize> {
        self.leaf(id)?;
        self.iter()
            .position(|x| x == id)
            .ok_or(SegmentError::Deleted(id))
    }

    fn leaf(&self, id: SegmentId) -> Result<&Segment> {
        let seg = self.arena.get(id)?;
        if seg.tier() != Tier::Segment {
            return Err(SegmentError::NotALeaf(id));
        }
        Ok(seg)
    }

    fn link(&mut self, prev: Option<SegmentId>, next: Option<SegmentId>, matrix: FeatureMatrix) -> Result<SegmentId> {
        let mut seg = Segment::new(Tier::Segment, matrix);
        seg.prev = prev;
        seg.next = next;
        let id = self.arena.alloc(seg);
        match prev {
            Some(p) => self.arena.get_mut(p)?.next = Some(id),
            None => self.head = Some(id),
        }
        match next {
            Some(n) => self.arena.get_mut(n)?.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.len += 1;
        Ok(id)
    }

    /// Splice a new leaf in after `id`.
    pub fn insert_after(&mut self, id: SegmentId, matrix: FeatureMatrix) -> Result<SegmentId> {
        let next = self.leaf(id)?.next;
        self.link(Some(id), next, matrix)
    }

    /// Splice a new leaf in before `id`.
    pub fn insert_before(&mut self, id: SegmentId, matrix: FeatureMatrix) -> Result<SegmentId> {
        let prev = self.leaf(id)?.prev;
        self.link(prev, Some(id), matrix)
    }

    /// Prepend a leaf.
    pub fn push_front(&mut self, matrix: FeatureMatrix) -> SegmentId {
        let mut seg = Segment::new(Tier::Segment, matrix);
        seg.next = self.head;
        let id = self.arena.alloc(seg);
        match self.head.and_then(|h| self.arena.get_mut(h).ok()) {
            Some(old) => old.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
        id
    }

    /// Append a leaf.
    pub fn push_back(&mut self, matrix: FeatureMatrix) -> SegmentId {
        let mut seg = Segment::new(Tier::Segment, matrix);
        seg.prev = self.tail;
        let id = self.arena.alloc(seg);
        match self.tail.and_then(|t| self.arena.get_mut(t).ok()) {
            Some(old) => old.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
        id
    }

    /// Unlink leaf `id` and return its matrix.
    ///
    /// Groups left empty by the removal are released with it.
    pub fn remove(&mut self, id: SegmentId) -> Result<FeatureMatrix> {
        let (prev, next) = {
            let seg = self.leaf(id)?;
            (seg.prev, seg.next)
        };
        match prev {
            Some(p) => self.arena.get_mut(p)?.next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.arena.get_mut(n)?.prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
        Ok(self.arena.release(id)?.matrix().clone())
    }

    /// Read-only cursor over the whole word, before its first position.
    pub fn cursor<'a>(&'a self, filter: Option<&'a MatrixMatcher>) -> Cursor<'a> {
        Cursor::new(self, Navigator::new(Pos::BeforeFirst, filter))
    }

    /// Read-only cursor whose first advance lands on `anchor`.
    pub fn cursor_at<'a>(&'a self, anchor: SegmentId, filter: Option<&'a MatrixMatcher>) -> Result<Cursor<'a>> {
        self.leaf(anchor)?;
        Ok(Cursor::new(self, Navigator::new(Pos::Before(anchor), filter)))
    }

    /// Mutable cursor over the whole word, before its first position.
    pub fn cursor_mut<'a>(&'a mut self, filter: Option<&'a MatrixMatcher>) -> CursorMut<'a> {
        CursorMut::new(self, Navigator::new(Pos::BeforeFirst, filter))
    }

    /// Mutable cursor whose first advance lands on `anchor`.
    pub fn cursor_mut_at<'a>(
        &'a mut self,
        anchor: SegmentId,
        filter: Option<&'a MatrixMatcher>,
    ) -> Result<CursorMut<'a>> {
        self.leaf(anchor)?;
        Ok(CursorMut::new(self, Navigator::new(Pos::Before(anchor), filter)))
    }

    /// Snapshot of the current leaves in visiting order.
    pub fn anchors(&self, direction: Direction) -> Vec<SegmentId> {
        let mut order: Vec<SegmentId> = self.iter().collect();
        if direction == Direction::Leftward {
            order.reverse();
        }
        order
    }

    /// One window per leaf accepted by `filter`, in `direction` order.
    ///
    /// Anchors are chosen up front; the filter also governs what the
    /// windows' cursors may step onto.
    pub fn slice<'a>(&'a self, direction: Direction, filter: Option<&'a MatrixMatcher>) -> Slices<'a> {
        Slices::new(self, self.anchors(direction), filter)
    }

    /// Allocate a grouping segment over `children`.
    pub fn group(&mut self, tier: Tier, children: &[SegmentId]) -> Result<SegmentId> {
        self.arena.group(tier, children)
    }

    /// Ordered children of `id`.
    pub fn children(&self, id: SegmentId) -> Result<&[SegmentId]> {
        Ok(self.arena.get(id)?.children())
    }

    /// Parents of `id`.
    pub fn parents(&self, id: SegmentId) -> Result<&[SegmentId]> {
        Ok(self.arena.get(id)?.parents())
    }

    /// Nearest ancestor of `id` on `tier`.
    pub fn ancestor(&self, id: SegmentId, tier: Tier) -> Result<SegmentId> {
        self.arena.ancestor(id, tier)
    }

    /// Release every grouping segment above `id`.
    pub fn detach_ancestry(&mut self, id: SegmentId) -> Result<()> {
        self.arena.detach_ancestry(id)
    }

    /// Syllables in leaf order.
    pub fn syllables(&self) -> Vec<SegmentId> {
        let mut out = Vec::new();
        for leaf in self.iter() {
            if let Ok(s) = self.arena.ancestor(leaf, Tier::Syllable) {
                if !out.contains(&s) {
                    out.push(s);
                }
            }
        }
        out
    }

    /// The leaves covered by grouping segment `id`, in order.
    pub fn leaves_of(&self, id: SegmentId) -> Result<Vec<SegmentId>> {
        let seg = self.arena.get(id)?;
        if seg.tier() == Tier::Segment {
            return Ok(vec![id]);
        }
        let mut out = Vec::new();
        for &child in seg.children() {
            out.extend(self.leaves_of(child)?);
        }
        Ok(out)
    }
}

/// Iterator over a word's leaves.
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    word: &'a Word,
    next: Option<SegmentId>,
}

impl Iterator for Leaves<'_> {
    type Item = SegmentId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.word.arena.get(id).ok().and_then(|s| s.next);
        Some(id)
    }
}

impl<'a> IntoIterator for &'a Word {
    type Item = SegmentId;
    type IntoIter = Leaves<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
