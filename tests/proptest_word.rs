//! Property-based tests for word linkage
//!
//! Random insert/delete sequences are replayed against a plain `Vec` model;
//! the word's leaf order, slices and neighbour links must agree with it after
//! every step.

use phonorule::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    PushFront(i32),
    PushBack(i32),
    InsertAfter(usize, i32),
    InsertBefore(usize, i32),
    Remove(usize),
    CursorInsert(usize, i32),
    CursorDelete(usize),
}

// Strategy for one edit; indices are taken modulo the current length
fn op_strategy() -> impl Strategy<Value = Op> {
    let height = 0..10i32;
    prop_oneof![
        height.clone().prop_map(Op::PushFront),
        height.clone().prop_map(Op::PushBack),
        (any::<usize>(), height.clone()).prop_map(|(i, h)| Op::InsertAfter(i, h)),
        (any::<usize>(), height.clone()).prop_map(|(i, h)| Op::InsertBefore(i, h)),
        any::<usize>().prop_map(Op::Remove),
        (any::<usize>(), height).prop_map(|(i, h)| Op::CursorInsert(i, h)),
        any::<usize>().prop_map(Op::CursorDelete),
    ]
}

struct Fixture {
    height: Feature,
}

impl Fixture {
    fn new() -> Self {
        let mut features = FeatureSet::new();
        let height = features.add_scalar("height", None, None).unwrap();
        Self { height }
    }

    fn matrix(&self, h: i32) -> FeatureMatrix {
        FeatureMatrix::new([self.height.scalar(h).unwrap()])
    }

    fn heights(&self, word: &Word) -> Vec<i32> {
        word.matrices()
            .iter()
            .map(|m| m.value_of(self.height.id()).as_scalar().unwrap())
            .collect()
    }
}

/// Apply `op` to both the word and the model.
fn replay(fx: &Fixture, word: &mut Word, model: &mut Vec<(SegmentId, i32)>, op: &Op) {
    match *op {
        Op::PushFront(h) => {
            let id = word.push_front(fx.matrix(h));
            model.insert(0, (id, h));
        }
        Op::PushBack(h) => {
            let id = word.push_back(fx.matrix(h));
            model.push((id, h));
        }
        Op::InsertAfter(i, h) if !model.is_empty() => {
            let i = i % model.len();
            let id = word.insert_after(model[i].0, fx.matrix(h)).unwrap();
            model.insert(i + 1, (id, h));
        }
        Op::InsertBefore(i, h) if !model.is_empty() => {
            let i = i % model.len();
            let id = word.insert_before(model[i].0, fx.matrix(h)).unwrap();
            model.insert(i, (id, h));
        }
        Op::Remove(i) if !model.is_empty() => {
            let i = i % model.len();
            let (id, h) = model.remove(i);
            let removed = word.remove(id).unwrap();
            assert_eq!(removed.value_of(fx.height.id()), Value::Scalar(h));
        }
        Op::CursorInsert(i, h) if !model.is_empty() => {
            let i = i % model.len();
            let mut cursor = word.cursor_mut_at(model[i].0, None).unwrap();
            cursor.advance().unwrap();
            let id = cursor.insert_after(fx.matrix(h)).unwrap();
            assert_eq!(cursor.current().unwrap(), id);
            model.insert(i + 1, (id, h));
        }
        Op::CursorDelete(i) if !model.is_empty() => {
            let i = i % model.len();
            let mut cursor = word.cursor_mut_at(model[i].0, None).unwrap();
            cursor.advance().unwrap();
            cursor.delete().unwrap();
            // the cursor now sits just before the successor
            let next = cursor.advance().unwrap();
            assert_eq!(next, i + 1 < model.len());
            if next {
                assert_eq!(cursor.current().unwrap(), model[i + 1].0);
            }
            model.remove(i);
        }
        _ => {}
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Leaf order, slices and links agree with the model after every edit
    #[test]
    fn prop_edits_match_vec_model(
        initial in prop::collection::vec(0..10i32, 0..6),
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let fx = Fixture::new();
        let mut word = Word::new(initial.iter().map(|&h| fx.matrix(h)));
        let mut model: Vec<(SegmentId, i32)> = word.iter().zip(initial.iter().copied()).collect();

        for op in &ops {
            replay(&fx, &mut word, &mut model, op);

            let ids: Vec<SegmentId> = model.iter().map(|&(id, _)| id).collect();
            let heights: Vec<i32> = model.iter().map(|&(_, h)| h).collect();

            prop_assert_eq!(word.len(), model.len());
            prop_assert_eq!(word.iter().collect::<Vec<_>>(), ids.clone());
            prop_assert_eq!(fx.heights(&word), heights);

            let forward: Vec<_> = word.slice(Direction::Rightward, None).map(|s| s.anchor()).collect();
            prop_assert_eq!(&forward, &ids);
            let mut backward: Vec<_> = word.slice(Direction::Leftward, None).map(|s| s.anchor()).collect();
            backward.reverse();
            prop_assert_eq!(&backward, &ids);

            prop_assert_eq!(word.first(), ids.first().copied());
            prop_assert_eq!(word.last(), ids.last().copied());
            for pair in ids.windows(2) {
                prop_assert_eq!(word.next(pair[0]).unwrap(), Some(pair[1]));
                prop_assert_eq!(word.prev(pair[1]).unwrap(), Some(pair[0]));
            }
        }
    }

    /// Deleting every position through one cursor empties the word
    #[test]
    fn prop_delete_all_through_cursor(initial in prop::collection::vec(0..10i32, 0..12)) {
        let fx = Fixture::new();
        let mut word = Word::new(initial.iter().map(|&h| fx.matrix(h)));

        let mut deleted = 0;
        {
            let mut cursor = word.cursor_mut(None);
            while cursor.advance().unwrap() {
                cursor.delete().unwrap();
                deleted += 1;
            }
        }

        prop_assert_eq!(deleted, initial.len());
        prop_assert!(word.is_empty());
        prop_assert_eq!(word.slice(Direction::Rightward, None).count(), 0);
    }

    /// A filtered cursor visits exactly the accepted positions, in order
    #[test]
    fn prop_filtered_cursor_visits_accepted(
        initial in prop::collection::vec(0..10i32, 0..12),
        threshold in 0..10i32,
    ) {
        let fx = Fixture::new();
        let word = Word::new(initial.iter().map(|&h| fx.matrix(h)));
        let filter = MatrixMatcher::new(vec![
            Matchable::compare(&fx.height, Comparison::Ge, threshold).unwrap(),
        ]);

        let mut visited = Vec::new();
        let mut cursor = word.cursor(Some(&filter));
        while cursor.advance().unwrap() {
            visited.push(cursor.matrix().unwrap().value_of(fx.height.id()).as_scalar().unwrap());
        }

        let expected: Vec<i32> = initial.iter().copied().filter(|&h| h >= threshold).collect();
        prop_assert_eq!(visited, expected);
    }
}
