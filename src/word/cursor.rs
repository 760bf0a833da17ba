//! Backtracking cursors over a word.
//!
//! A cursor walks the leaves of a [`Word`] one reachable position at a time.
//! "Reachable" means alive and accepted by the cursor's filter, if it has
//! one; everything else is stepped over.
//!
//! A cursor is always in one of four states:
//!
//! - before the first reachable position,
//! - just before a given position (a fresh cursor anchored on a segment),
//! - on a position,
//! - after the last reachable position.
//!
//! Only "on a position" can be read. [`Mark`]s snapshot the state and
//! [`SegmentCursor::revert`] restores it, which is how matching backtracks.
//!
//! # Examples
//!
//! ```
//! use phonorule::feature::FeatureMatrix;
//! use phonorule::word::{SegmentCursor, Word};
//!
//! let word = Word::new(vec![FeatureMatrix::empty(); 3]);
//! let mut cursor = word.cursor(None);
//!
//! assert!(cursor.current().is_err());
//! assert!(cursor.advance().unwrap());
//! let mark = cursor.mark();
//! assert!(cursor.advance().unwrap());
//! assert!(cursor.advance().unwrap());
//! assert!(!cursor.advance().unwrap());
//! assert!(cursor.is_after_last());
//!
//! cursor.revert(&mark);
//! assert_eq!(cursor.current().unwrap(), word.first().unwrap());
//! ```

use super::Word;
use crate::feature::FeatureMatrix;
use crate::matcher::MatrixMatcher;
use crate::segment::{Result, SegmentError, SegmentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pos {
    BeforeFirst,
    Before(SegmentId),
    At(SegmentId),
    AfterLast,
}

/// Snapshot of a cursor's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pos: Pos,
    offset: isize,
}

impl Mark {
    /// The segment the mark sits on, if it sits on one.
    pub fn segment(&self) -> Option<SegmentId> {
        match self.pos {
            Pos::At(id) => Some(id),
            _ => None,
        }
    }

    /// Net reachable positions the cursor had moved forward when the mark
    /// was taken. Negative after stepping back past its starting point.
    pub fn offset(&self) -> isize {
        self.offset
    }
}

/// Navigation shared by read-only and mutable cursors.
pub trait SegmentCursor {
    /// Move to the next reachable position.
    ///
    /// Returns `false` once the cursor is past the last position; calling it
    /// again there is a no-op.
    fn advance(&mut self) -> Result<bool>;

    /// Move back one reachable position.
    ///
    /// On a position this lands on its predecessor. Just before a position
    /// it ends up just before the predecessor, so the next advance reads the
    /// predecessor. Returns `false` once the cursor is before the first
    /// position; calling it again there is a no-op.
    fn retreat(&mut self) -> Result<bool>;

    /// Snapshot the current position.
    fn mark(&self) -> Mark;

    /// Restore a snapshot.
    fn revert(&mut self, mark: &Mark);

    /// The segment under the cursor.
    fn current(&self) -> Result<SegmentId>;

    /// The matrix of the segment under the cursor.
    fn matrix(&self) -> Result<&FeatureMatrix>;

    /// Returns `true` when no reachable position precedes the cursor's next
    /// position.
    fn is_before_first(&self) -> bool;

    /// Returns `true` when the cursor has moved past the last position.
    fn is_after_last(&self) -> bool;

    /// The reachable segments from `start` to `end`, both included.
    fn span(&self, start: &Mark, end: &Mark) -> Result<Vec<SegmentId>>;
}

/// Position plus filter, with navigation computed against a word.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Navigator<'a> {
    pos: Pos,
    offset: isize,
    filter: Option<&'a MatrixMatcher>,
}

impl<'a> Navigator<'a> {
    pub(crate) fn new(pos: Pos, filter: Option<&'a MatrixMatcher>) -> Self {
        Self {
            pos,
            offset: 0,
            filter,
        }
    }

    fn reachable(&self, word: &Word, hidden: &[SegmentId], id: SegmentId) -> Result<bool> {
        let matrix = word.arena.get(id)?.matrix();
        Ok(!hidden.contains(&id) && self.filter.map_or(true, |f| f.accepts(matrix)))
    }

    /// First reachable position at or after `from`.
    fn forward_from(
        &self,
        word: &Word,
        hidden: &[SegmentId],
        mut from: Option<SegmentId>,
    ) -> Result<Option<SegmentId>> {
        while let Some(id) = from {
            if self.reachable(word, hidden, id)? {
                return Ok(Some(id));
            }
            from = word.arena.get(id)?.next;
        }
        Ok(None)
    }

    /// First reachable position at or before `from`.
    fn backward_from(
        &self,
        word: &Word,
        hidden: &[SegmentId],
        mut from: Option<SegmentId>,
    ) -> Result<Option<SegmentId>> {
        while let Some(id) = from {
            if self.reachable(word, hidden, id)? {
                return Ok(Some(id));
            }
            from = word.arena.get(id)?.prev;
        }
        Ok(None)
    }

    pub(crate) fn advance(&mut self, word: &Word, hidden: &[SegmentId]) -> Result<bool> {
        let next = match self.pos {
            Pos::AfterLast => return Ok(false),
            Pos::BeforeFirst => self.forward_from(word, hidden, word.head)?,
            Pos::Before(id) => {
                word.arena.get(id)?;
                self.forward_from(word, hidden, Some(id))?
            }
            Pos::At(id) => {
                let start = word.arena.get(id)?.next;
                self.forward_from(word, hidden, start)?
            }
        };
        self.pos = next.map_or(Pos::AfterLast, Pos::At);
        if next.is_some() {
            self.offset += 1;
        }
        Ok(next.is_some())
    }

    pub(crate) fn retreat(&mut self, word: &Word, hidden: &[SegmentId]) -> Result<bool> {
        match self.pos {
            Pos::BeforeFirst => Ok(false),
            Pos::AfterLast => {
                // same gap as the last reachable position, so no offset change
                let prev = self.backward_from(word, hidden, word.tail)?;
                self.pos = prev.map_or(Pos::BeforeFirst, Pos::At);
                Ok(prev.is_some())
            }
            Pos::Before(id) => {
                let start = word.arena.get(id)?.prev;
                let prev = self.backward_from(word, hidden, start)?;
                self.pos = prev.map_or(Pos::BeforeFirst, Pos::Before);
                if prev.is_some() {
                    self.offset -= 1;
                }
                Ok(prev.is_some())
            }
            Pos::At(id) => {
                let mut start = word.arena.get(id)?.prev;
                if hidden.contains(&id) {
                    // an unvisited segment sits in the gap after its reachable predecessor
                    match self.backward_from(word, hidden, start)? {
                        Some(visible) => start = word.arena.get(visible)?.prev,
                        None => {
                            self.pos = Pos::BeforeFirst;
                            return Ok(false);
                        }
                    }
                }
                let prev = self.backward_from(word, hidden, start)?;
                self.pos = prev.map_or(Pos::BeforeFirst, Pos::At);
                self.offset -= 1;
                Ok(prev.is_some())
            }
        }
    }

    pub(crate) fn pos(&self) -> Pos {
        self.pos
    }

    pub(crate) fn set_pos(&mut self, pos: Pos) {
        self.pos = pos;
    }

    pub(crate) fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            offset: self.offset,
        }
    }

    pub(crate) fn revert(&mut self, mark: &Mark) {
        self.pos = mark.pos;
        self.offset = mark.offset;
    }

    pub(crate) fn current(&self, word: &Word) -> Result<SegmentId> {
        match self.pos {
            Pos::At(id) => {
                word.arena.get(id)?;
                Ok(id)
            }
            _ => Err(SegmentError::InvalidCursor),
        }
    }

    pub(crate) fn is_before_first(&self, word: &Word, hidden: &[SegmentId]) -> bool {
        let before = |id: SegmentId| match word.arena.get(id) {
            Ok(seg) => matches!(self.backward_from(word, hidden, seg.prev), Ok(None)),
            Err(_) => false,
        };
        match self.pos {
            Pos::BeforeFirst => true,
            Pos::Before(id) => before(id),
            Pos::At(id) => hidden.contains(&id) && before(id),
            Pos::AfterLast => false,
        }
    }

    pub(crate) fn span(
        &self,
        word: &Word,
        hidden: &[SegmentId],
        start: &Mark,
        end: &Mark,
    ) -> Result<Vec<SegmentId>> {
        let (Pos::At(first), Pos::At(last)) = (start.pos, end.pos) else {
            return Err(SegmentError::InvalidSpan);
        };
        let mut out = Vec::new();
        let mut walker = Navigator::new(Pos::At(first), self.filter);
        word.arena.get(first)?;
        out.push(first);
        while walker.pos != Pos::At(last) {
            if !walker.advance(word, hidden)? {
                return Err(SegmentError::InvalidSpan);
            }
            if let Pos::At(id) = walker.pos {
                out.push(id);
            }
        }
        Ok(out)
    }
}

/// Read-only cursor.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    word: &'a Word,
    nav: Navigator<'a>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(word: &'a Word, nav: Navigator<'a>) -> Self {
        Self { word, nav }
    }

    /// The word under traversal.
    pub fn word(&self) -> &'a Word {
        self.word
    }
}

impl SegmentCursor for Cursor<'_> {
    fn advance(&mut self) -> Result<bool> {
        self.nav.advance(self.word, &[])
    }

    fn retreat(&mut self) -> Result<bool> {
        self.nav.retreat(self.word, &[])
    }

    fn mark(&self) -> Mark {
        self.nav.mark()
    }

    fn revert(&mut self, mark: &Mark) {
        self.nav.revert(mark);
    }

    fn current(&self) -> Result<SegmentId> {
        self.nav.current(self.word)
    }

    fn matrix(&self) -> Result<&FeatureMatrix> {
        let id = self.current()?;
        self.word.matrix(id)
    }

    fn is_before_first(&self) -> bool {
        self.nav.is_before_first(self.word, &[])
    }

    fn is_after_last(&self) -> bool {
        self.nav.pos() == Pos::AfterLast
    }

    fn span(&self, start: &Mark, end: &Mark) -> Result<Vec<SegmentId>> {
        self.nav.span(self.word, &[], start, end)
    }
}

/// Cursor that can also rewrite, insert and delete.
///
/// Segments the cursor inserts are never visited by it: they are stepped
/// over like filtered positions, so navigation after an insertion reads the
/// same positions it would have read without it.
#[derive(Debug)]
pub struct CursorMut<'a> {
    word: &'a mut Word,
    nav: Navigator<'a>,
    inserted: Vec<SegmentId>,
    doomed: Vec<SegmentId>,
}

impl<'a> CursorMut<'a> {
    pub(crate) fn new(word: &'a mut Word, nav: Navigator<'a>) -> Self {
        Self {
            word,
            nav,
            inserted: Vec::new(),
            doomed: Vec::new(),
        }
    }

    /// The word under traversal.
    pub fn word(&self) -> &Word {
        self.word
    }

    /// Replace the matrix of the current segment. Linkage is untouched.
    pub fn set_matrix(&mut self, matrix: FeatureMatrix) -> Result<()> {
        let id = self.current()?;
        self.word.set_matrix(id, matrix)
    }

    /// Splice a new segment in after the cursor and move onto it.
    ///
    /// Before the first position the segment becomes the new first
    /// position; past the last it becomes the new last one. A cursor that
    /// has not started yet inserts just before its anchor. Repeated calls
    /// keep their insertion order.
    pub fn insert_after(&mut self, matrix: FeatureMatrix) -> Result<SegmentId> {
        let id = match self.nav.pos() {
            Pos::BeforeFirst => self.word.push_front(matrix),
            Pos::Before(next) => self.word.insert_before(next, matrix)?,
            Pos::At(current) => self.word.insert_after(current, matrix)?,
            Pos::AfterLast => self.word.push_back(matrix),
        };
        self.inserted.push(id);
        self.nav.set_pos(Pos::At(id));
        Ok(id)
    }

    /// Splice a new segment in before the cursor without moving.
    pub fn insert_before(&mut self, matrix: FeatureMatrix) -> Result<SegmentId> {
        let id = match self.nav.pos() {
            Pos::BeforeFirst => self.word.push_front(matrix),
            Pos::Before(next) => {
                let id = self.word.insert_before(next, matrix)?;
                self.nav.set_pos(Pos::Before(id));
                id
            }
            Pos::At(current) => self.word.insert_before(current, matrix)?,
            Pos::AfterLast => self.word.push_back(matrix),
        };
        self.inserted.push(id);
        Ok(id)
    }

    /// Unlink the current segment.
    ///
    /// The cursor is left so that the next advance lands on the deleted
    /// segment's successor, and a retreat makes it read the deleted segment's
    /// predecessor. Use [`delete_on_commit`](Self::delete_on_commit) to keep
    /// positions stable instead.
    pub fn delete(&mut self) -> Result<FeatureMatrix> {
        let id = self.current()?;
        let next = self.word.arena.get(id)?.next;
        let matrix = self.word.remove(id)?;
        self.nav.set_pos(next.map_or(Pos::AfterLast, Pos::Before));
        Ok(matrix)
    }

    /// Schedule the current segment for deletion by [`commit`](Self::commit).
    ///
    /// Until then the segment stays linked and reachable, so the cursor moves
    /// over the word exactly as it did before the call.
    pub fn delete_on_commit(&mut self) -> Result<()> {
        let id = self.current()?;
        if !self.doomed.contains(&id) {
            self.doomed.push(id);
        }
        Ok(())
    }

    /// Unlink every segment scheduled by
    /// [`delete_on_commit`](Self::delete_on_commit), in scheduling order.
    ///
    /// The cursor is left after the last position.
    pub fn commit(&mut self) -> Result<Vec<FeatureMatrix>> {
        let mut removed = Vec::with_capacity(self.doomed.len());
        for id in std::mem::take(&mut self.doomed) {
            removed.push(self.word.remove(id)?);
        }
        self.nav.set_pos(Pos::AfterLast);
        Ok(removed)
    }
}

impl SegmentCursor for CursorMut<'_> {
    fn advance(&mut self) -> Result<bool> {
        self.nav.advance(self.word, &self.inserted)
    }

    fn retreat(&mut self) -> Result<bool> {
        self.nav.retreat(self.word, &self.inserted)
    }

    fn mark(&self) -> Mark {
        self.nav.mark()
    }

    fn revert(&mut self, mark: &Mark) {
        self.nav.revert(mark);
    }

    fn current(&self) -> Result<SegmentId> {
        self.nav.current(self.word)
    }

    fn matrix(&self) -> Result<&FeatureMatrix> {
        let id = self.current()?;
        self.word.matrix(id)
    }

    fn is_before_first(&self) -> bool {
        self.nav.is_before_first(self.word, &self.inserted)
    }

    fn is_after_last(&self) -> bool {
        self.nav.pos() == Pos::AfterLast
    }

    fn span(&self, start: &Mark, end: &Mark) -> Result<Vec<SegmentId>> {
        self.nav.span(self.word, &self.inserted, start, end)
    }
}

/// A rule-application window: the word seen from one anchor onward.
#[derive(Debug, Clone, Copy)]
pub struct Slice<'a> {
    word: &'a Word,
    anchor: SegmentId,
    filter: Option<&'a MatrixMatcher>,
}

impl<'a> Slice<'a> {
    /// The anchor position.
    pub fn anchor(&self) -> SegmentId {
        self.anchor
    }

    /// A fresh cursor whose first advance lands on the anchor.
    pub fn cursor(&self) -> Cursor<'a> {
        Cursor::new(self.word, Navigator::new(Pos::Before(self.anchor), self.filter))
    }
}

/// Lazily yields one [`Slice`] per anchor accepted by the filter.
#[derive(Debug)]
pub struct Slices<'a> {
    word: &'a Word,
    order: std::vec::IntoIter<SegmentId>,
    filter: Option<&'a MatrixMatcher>,
}

impl<'a> Slices<'a> {
    pub(crate) fn new(word: &'a Word, order: Vec<SegmentId>, filter: Option<&'a MatrixMatcher>) -> Self {
        Self {
            word,
            order: order.into_iter(),
            filter,
        }
    }
}

impl<'a> Iterator for Slices<'a> {
    type Item = Slice<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for anchor in self.order.by_ref() {
            let Ok(matrix) = self.word.matrix(anchor) else {
                continue;
            };
            if self.filter.map_or(true, |f| f.accepts(matrix)) {
                return Some(Slice {
                    word: self.word,
                    anchor,
                    filter: self.filter,
                });
            }
        }
        None
    }
}
