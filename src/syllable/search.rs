//! Exhaustive search for the best non-overlapping syllable cover.
//!
//! Every subset of candidates is considered (include before exclude), with a
//! branch dropped as soon as a candidate would overlap one already chosen.
//! This is exponential in the number of candidates; callers cap that number.

use std::cmp::{Ordering, Reverse};

use crate::word::Direction;

/// A candidate projected onto word indices.
#[derive(Debug, Clone)]
pub(crate) struct Span {
    /// Every covered index.
    pub positions: Vec<usize>,
    /// Sum of the nucleus indices.
    pub nucleus_sum: i64,
    /// Number of onset segments.
    pub onset_len: usize,
}

/// Ranking of one cover. Smaller is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Score {
    unsyllabified: usize,
    syllables: usize,
    nucleus_bias: Reverse<i64>,
    onsets: Reverse<usize>,
}

impl Score {
    fn key(&self) -> (usize, usize, Reverse<i64>, Reverse<usize>) {
        (self.unsyllabified, self.syllables, self.nucleus_bias, self.onsets)
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

struct Search<'a> {
    spans: &'a [Span],
    word_len: usize,
    direction: Option<Direction>,
    occupied: Vec<bool>,
    chosen: Vec<usize>,
    best: Option<(Score, Vec<usize>)>,
}

impl Search<'_> {
    fn visit(&mut self, next: usize) {
        if next == self.spans.len() {
            self.evaluate();
            return;
        }

        let span = &self.spans[next];
        if span.positions.iter().all(|&p| !self.occupied[p]) {
            for &p in &span.positions {
                self.occupied[p] = true;
            }
            self.chosen.push(next);
            self.visit(next + 1);
            self.chosen.pop();
            for &p in &span.positions {
                self.occupied[p] = false;
            }
        }
        self.visit(next + 1);
    }

    fn evaluate(&mut self) {
        let covered: usize = self.chosen.iter().map(|&i| self.spans[i].positions.len()).sum();
        let nucleus_sum: i64 = self.chosen.iter().map(|&i| self.spans[i].nucleus_sum).sum();
        let score = Score {
            unsyllabified: self.word_len - covered,
            syllables: self.chosen.len(),
            nucleus_bias: Reverse(match self.direction {
                Some(Direction::Rightward) => nucleus_sum,
                Some(Direction::Leftward) => -nucleus_sum,
                None => 0,
            }),
            onsets: Reverse(self.chosen.iter().map(|&i| self.spans[i].onset_len).sum()),
        };
        // strict: the first cover seen keeps ties
        if self.best.as_ref().map_or(true, |(best, _)| score < *best) {
            self.best = Some((score, self.chosen.clone()));
        }
    }
}

/// Indices of the spans forming the best cover of a word of `word_len`
/// positions, in candidate order.
pub(crate) fn best_cover(spans: &[Span], word_len: usize, direction: Option<Direction>) -> Vec<usize> {
    let mut search = Search {
        spans,
        word_len,
        direction,
        occupied: vec![false; word_len],
        chosen: Vec::new(),
        best: None,
    };
    search.visit(0);
    search.best.map(|(_, chosen)| chosen).unwrap_or_default()
}
