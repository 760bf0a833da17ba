//! Shared fixtures: a toy alphabet that spells letters as feature matrices.

#![allow(dead_code)]

use phonorule::prelude::*;
use phonorule::rule::RuleBuilder;

/// Letters, their matrices, and the features behind them.
pub struct Alphabet {
    pub features: FeatureSet,
    pub cons: Feature,
    pub voice: Feature,
    pub cont: Feature,
    pub labial: Feature,
    letters: Vec<(char, FeatureMatrix)>,
}

impl Alphabet {
    pub fn new() -> Self {
        let mut features = FeatureSet::new();
        let cons = features.add_binary("cons").unwrap();
        let voice = features.add_binary("voice").unwrap();
        let cont = features.add_binary("cont").unwrap();
        let labial = features.add_unary("labial").unwrap();

        let bundle = |c: bool, v: bool, k: Option<bool>, lab: bool| {
            let mut values = vec![
                if c { cons.plus() } else { cons.minus() }.unwrap(),
                if v { voice.plus() } else { voice.minus() }.unwrap(),
            ];
            if let Some(k) = k {
                values.push(if k { cont.plus() } else { cont.minus() }.unwrap());
            }
            if lab {
                values.push(labial.present().unwrap());
            }
            FeatureMatrix::new(values)
        };

        let letters = vec![
            ('a', bundle(false, true, None, false)),
            ('b', bundle(true, true, Some(false), true)),
            ('p', bundle(true, false, Some(false), true)),
            ('d', bundle(true, true, Some(false), false)),
            ('c', bundle(true, false, Some(false), false)),
            ('z', bundle(true, true, Some(true), false)),
            ('s', bundle(true, false, Some(true), false)),
        ];

        Self {
            features,
            cons,
            voice,
            cont,
            labial,
            letters,
        }
    }

    pub fn matrix(&self, letter: char) -> FeatureMatrix {
        self.letters
            .iter()
            .find(|(c, _)| *c == letter)
            .map(|(_, m)| m.clone())
            .unwrap_or_else(|| panic!("unknown letter {letter}"))
    }

    pub fn pronounce(&self, spelling: &str) -> Vec<FeatureMatrix> {
        spelling.chars().map(|c| self.matrix(c)).collect()
    }

    pub fn word(&self, spelling: &str) -> Word {
        Word::new(self.pronounce(spelling))
    }

    pub fn spell_matrices(&self, matrices: &[FeatureMatrix]) -> String {
        matrices
            .iter()
            .map(|m| {
                self.letters
                    .iter()
                    .find(|(_, x)| x == m)
                    .map_or('?', |(c, _)| *c)
            })
            .collect()
    }

    pub fn spell(&self, word: &Word) -> String {
        self.spell_matrices(&word.matrices())
    }

    /// Matches exactly one letter.
    pub fn is(&self, letter: char) -> MatrixMatcher {
        let m = self.matrix(letter);
        MatrixMatcher::new(
            m.iter_with_nulls(&self.features)
                .map(|v| Matchable::of(&self.features, v).unwrap())
                .collect(),
        )
    }

    /// Turns any segment into `letter`.
    pub fn becomes(&self, letter: char) -> MatrixCombiner {
        let m = self.matrix(letter);
        MatrixCombiner::from_values(&self.features, m.iter_with_nulls(&self.features)).unwrap()
    }

    pub fn consonant(&self) -> MatrixMatcher {
        MatrixMatcher::new(vec![Matchable::value(&self.cons, Value::Plus).unwrap()])
    }

    pub fn vowel(&self) -> MatrixMatcher {
        MatrixMatcher::new(vec![Matchable::value(&self.cons, Value::Minus).unwrap()])
    }

    /// `a => b / _ c`, the basic substitution used across tests.
    pub fn substitution(&self, name: &str, from: char, to: char, before: char) -> RuleBuilder {
        Rule::builder(name)
            .segment(RuleSegment::action(self.is(from), self.becomes(to)))
            .segment(RuleSegment::context(self.is(before)))
    }

    /// CV syllables with an optional single-consonant coda.
    pub fn syllable_builder(&self) -> SyllableBuilder {
        let mut builder = SyllableBuilder::new();
        builder.add_onset(vec![RuleSegment::context(self.consonant())]).unwrap();
        builder.add_nucleus(vec![RuleSegment::context(self.vowel())]).unwrap();
        builder
            .add_coda(Vec::new())
            .unwrap()
            .add_coda(vec![RuleSegment::context(self.consonant())])
            .unwrap();
        builder
    }
}
