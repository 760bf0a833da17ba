//! Criterion benchmarks for syllabification.
//!
//! The cover search is exponential in the number of candidates, so these
//! benchmarks track how candidate listing and the search scale with word
//! length and with the number of pattern alternatives.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use phonorule::prelude::*;

// ============================================================================
// Benchmark Fixtures
// ============================================================================

struct Fixture {
    cons: Feature,
}

impl Fixture {
    fn new() -> Self {
        let mut features = FeatureSet::new();
        let cons = features.add_binary("cons").unwrap();
        Self { cons }
    }

    fn consonant(&self) -> RuleSegment {
        RuleSegment::context(MatrixMatcher::new(vec![
            Matchable::value(&self.cons, Value::Plus).unwrap(),
        ]))
    }

    fn vowel(&self) -> RuleSegment {
        RuleSegment::context(MatrixMatcher::new(vec![
            Matchable::value(&self.cons, Value::Minus).unwrap(),
        ]))
    }

    /// Words shaped like "CVCCVCV..."
    fn pronunciation(&self, len: usize) -> Vec<FeatureMatrix> {
        (0..len)
            .map(|i| {
                let value = if i % 5 == 1 || i % 5 == 4 {
                    self.cons.minus()
                } else {
                    self.cons.plus()
                };
                FeatureMatrix::new([value.unwrap()])
            })
            .collect()
    }

    /// Onset C, nucleus V, coda none | C.
    fn simple(&self) -> SyllableBuilder {
        let mut builder = SyllableBuilder::with_config(SyllableConfig {
            max_candidates: 64,
            ..SyllableConfig::default()
        });
        builder.add_onset(vec![self.consonant()]).unwrap();
        builder.add_nucleus(vec![self.vowel()]).unwrap();
        builder
            .add_coda(Vec::new())
            .unwrap()
            .add_coda(vec![self.consonant()])
            .unwrap();
        builder
    }

    /// Onsets none | C | CC, nucleus V, codas none | C | CC.
    fn clusters(&self) -> SyllableBuilder {
        let mut builder = SyllableBuilder::with_config(SyllableConfig {
            nucleus_direction: Some(Direction::Leftward),
            max_candidates: 64,
        });
        builder
            .add_onset(Vec::new())
            .unwrap()
            .add_onset(vec![self.consonant()])
            .unwrap()
            .add_onset(vec![self.consonant(), self.consonant()])
            .unwrap();
        builder.add_nucleus(vec![self.vowel()]).unwrap();
        builder
            .add_coda(Vec::new())
            .unwrap()
            .add_coda(vec![self.consonant()])
            .unwrap()
            .add_coda(vec![self.consonant(), self.consonant()])
            .unwrap();
        builder
    }
}

// ============================================================================
// Candidate Listing Benchmarks
// ============================================================================

fn bench_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("syllable_candidates");
    let fx = Fixture::new();
    let builder = fx.clusters();

    for len in [5usize, 10, 15].iter() {
        let input = fx.pronunciation(*len);
        group.throughput(Throughput::Elements(*len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), len, |b, _| {
            let mut word = Word::new(input.iter().cloned());
            b.iter(|| black_box(builder.candidates(&mut word).unwrap()));
        });
    }

    group.finish();
}

// ============================================================================
// Full Syllabification Benchmarks
// ============================================================================

fn bench_syllabify(c: &mut Criterion) {
    let mut group = c.benchmark_group("syllabify");
    let fx = Fixture::new();

    for (name, builder) in [("simple", fx.simple()), ("clusters", fx.clusters())] {
        for len in [5usize, 10].iter() {
            let input = fx.pronunciation(*len);
            group.bench_with_input(BenchmarkId::new(name, len), len, |b, _| {
                b.iter(|| {
                    let mut word = Word::new(input.iter().cloned());
                    black_box(builder.syllabify(&mut word).unwrap());
                    word
                });
            });
        }
    }

    group.finish();
}

fn bench_resyllabify(c: &mut Criterion) {
    let fx = Fixture::new();
    let builder = fx.simple();
    let mut word = Word::new(fx.pronunciation(10));
    builder.syllabify(&mut word).unwrap();

    c.bench_function("resyllabify", |b| {
        b.iter(|| black_box(builder.syllabify(&mut word).unwrap()));
    });
}

criterion_group!(benches, bench_candidates, bench_syllabify, bench_resyllabify);
criterion_main!(benches);
