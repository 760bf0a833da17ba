//! Syllabification.
//!
//! A [`SyllableBuilder`] holds alternative onset, nucleus and coda patterns.
//! For every onset × nucleus × coda combination it builds one rule whose
//! pattern captures the three parts; running those rules over a word lists
//! every place a syllable could go. The best non-overlapping selection of
//! those candidates is then written into the word as Onset, Nucleus, Coda,
//! Rime and Syllable segments over the existing leaves.
//!
//! Covers are ranked by, in order:
//!
//! 1. fewest leaves left outside any syllable,
//! 2. fewest syllables,
//! 3. nuclei furthest toward the configured direction, if one is set,
//! 4. most onset leaves.
//!
//! Remaining ties go to the cover found first.

mod search;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::config::SyllableConfig;
use crate::matcher::Capture;
use crate::rule::{NoopObserver, Rule, RuleBuildError, RuleEvent, RuleObserver, RuleSegment};
use crate::segment::{SegmentError, SegmentId, Tier};
use crate::word::Word;
use search::{best_cover, Span};

/// Errors raised while syllabifying.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyllableError {
    /// The word produced more candidates than the configured cap.
    #[error("Found {found} syllable candidates, more than the limit of {limit}")]
    TooManyCandidates {
        /// Candidates found
        found: usize,
        /// Configured cap
        limit: usize,
    },

    /// No nucleus pattern was given.
    #[error("No nucleus pattern is defined")]
    NoNucleus,

    /// A candidate pattern could not be assembled.
    #[error(transparent)]
    Build(#[from] RuleBuildError),

    /// A word operation failed.
    #[error(transparent)]
    Segment(#[from] SegmentError),
}

/// A specialized `Result` type for syllabification.
pub type Result<T> = std::result::Result<T, SyllableError>;

/// One place a syllable could go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Onset leaves, possibly none
    pub onset: Vec<SegmentId>,
    /// Nucleus leaves, at least one
    pub nucleus: Vec<SegmentId>,
    /// Coda leaves, possibly none
    pub coda: Vec<SegmentId>,
}

impl Candidate {
    fn from_captures(captures: &[Capture]) -> Option<Self> {
        let part = |tier: Tier| {
            captures
                .iter()
                .find(|c| c.tier == tier)
                .map(|c| c.segments.clone())
                .unwrap_or_default()
        };
        let nucleus = part(Tier::Nucleus);
        if nucleus.is_empty() {
            return None;
        }
        Some(Self {
            onset: part(Tier::Onset),
            nucleus,
            coda: part(Tier::Coda),
        })
    }

    /// Every covered leaf in order.
    pub fn segments(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.onset
            .iter()
            .chain(&self.nucleus)
            .chain(&self.coda)
            .copied()
    }
}

/// Finds and materializes syllables.
#[derive(Debug, Clone, Default)]
pub struct SyllableBuilder {
    onsets: Vec<Vec<RuleSegment>>,
    nuclei: Vec<Vec<RuleSegment>>,
    codas: Vec<Vec<RuleSegment>>,
    config: SyllableConfig,
}

impl SyllableBuilder {
    /// A builder with no patterns and default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder with no patterns and the given settings.
    pub fn with_config(config: SyllableConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current settings.
    pub fn config(&self) -> &SyllableConfig {
        &self.config
    }

    /// Replace the settings.
    pub fn set_config(&mut self, config: SyllableConfig) {
        self.config = config;
    }

    /// Add an onset alternative. An empty pattern allows onsetless syllables.
    pub fn add_onset(&mut self, pattern: Vec<RuleSegment>) -> std::result::Result<&mut Self, RuleBuildError> {
        self.onsets.push(pattern_only(pattern)?);
        Ok(self)
    }

    /// Add a nucleus alternative.
    pub fn add_nucleus(&mut self, pattern: Vec<RuleSegment>) -> std::result::Result<&mut Self, RuleBuildError> {
        self.nuclei.push(pattern_only(pattern)?);
        Ok(self)
    }

    /// Add a coda alternative. An empty pattern allows open syllables.
    pub fn add_coda(&mut self, pattern: Vec<RuleSegment>) -> std::result::Result<&mut Self, RuleBuildError> {
        self.codas.push(pattern_only(pattern)?);
        Ok(self)
    }

    /// One rightward rule per onset × nucleus × coda combination.
    fn candidate_rules(&self) -> Result<Vec<Rule>> {
        if self.nuclei.is_empty() {
            return Err(SyllableError::NoNucleus);
        }
        let none = [Vec::new()];
        let onsets = if self.onsets.is_empty() { &none[..] } else { &self.onsets[..] };
        let codas = if self.codas.is_empty() { &none[..] } else { &self.codas[..] };

        let mut rules = Vec::with_capacity(onsets.len() * self.nuclei.len() * codas.len());
        for (i, onset) in onsets.iter().enumerate() {
            for (j, nucleus) in self.nuclei.iter().enumerate() {
                for (k, coda) in codas.iter().enumerate() {
                    let rule = Rule::builder(format!("syllable {}.{}.{}", i, j, k))
                        .segment(RuleSegment::capture(Tier::Onset, onset.clone())?)
                        .segment(RuleSegment::capture(Tier::Nucleus, nucleus.clone())?)
                        .segment(RuleSegment::capture(Tier::Coda, coda.clone())?)
                        .build()?;
                    rules.push(rule);
                }
            }
        }
        Ok(rules)
    }

    /// Every distinct candidate in the word, in (combination, anchor) order.
    ///
    /// The word's hierarchy is left untouched.
    pub fn candidates(&self, word: &mut Word) -> Result<Vec<Candidate>> {
        let mut found: Vec<Candidate> = Vec::new();
        for mut rule in self.candidate_rules()? {
            rule.apply_with(word, &mut NoopObserver, |_, ctx, _| {
                if let Some(candidate) = Candidate::from_captures(ctx.captures()) {
                    if !found.contains(&candidate) {
                        found.push(candidate);
                    }
                }
                Ok(())
            })?;
        }
        Ok(found)
    }

    /// The best non-overlapping selection of `candidates`.
    pub fn best_cover<'c>(&self, word: &Word, candidates: &'c [Candidate]) -> Result<Vec<&'c Candidate>> {
        if candidates.len() > self.config.max_candidates {
            return Err(SyllableError::TooManyCandidates {
                found: candidates.len(),
                limit: self.config.max_candidates,
            });
        }

        let index: FxHashMap<SegmentId, usize> = word.iter().enumerate().map(|(i, id)| (id, i)).collect();
        let position = |id: &SegmentId| index.get(id).copied().ok_or(SegmentError::Deleted(*id));

        let spans = candidates
            .iter()
            .map(|c| -> Result<Span> {
                let positions = c.segments().map(|id| position(&id)).collect::<std::result::Result<Vec<_>, _>>()?;
                let nucleus_sum = c
                    .nucleus
                    .iter()
                    .map(|id| position(id).map(|p| p as i64))
                    .sum::<std::result::Result<i64, _>>()?;
                Ok(Span {
                    positions,
                    nucleus_sum,
                    onset_len: c.onset.len(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let chosen = best_cover(&spans, word.len(), self.config.nucleus_direction);
        Ok(chosen.into_iter().map(|i| &candidates[i]).collect())
    }

    /// Replace the word's syllable structure with the best cover.
    ///
    /// Returns the new syllable segments in word order.
    pub fn syllabify(&self, word: &mut Word) -> Result<Vec<SegmentId>> {
        let candidates = self.candidates(word)?;
        let cover: Vec<Candidate> = self.best_cover(word, &candidates)?.into_iter().cloned().collect();

        let leaves: Vec<SegmentId> = word.iter().collect();
        for leaf in leaves {
            word.detach_ancestry(leaf)?;
        }

        let mut syllables = Vec::with_capacity(cover.len());
        for candidate in &cover {
            syllables.push(materialize(word, candidate)?);
        }
        tracing::trace!(candidates = candidates.len(), syllables = syllables.len(), "syllabified");
        Ok(syllables)
    }
}

fn pattern_only(pattern: Vec<RuleSegment>) -> std::result::Result<Vec<RuleSegment>, RuleBuildError> {
    match pattern.iter().find(|s| !s.is_pattern_only()) {
        Some(s) => Err(RuleBuildError::MutatingPrimitiveInRepeat(s.to_string())),
        None => Ok(pattern),
    }
}

fn materialize(word: &mut Word, candidate: &Candidate) -> std::result::Result<SegmentId, SegmentError> {
    let onset = if candidate.onset.is_empty() {
        None
    } else {
        Some(word.group(Tier::Onset, &candidate.onset)?)
    };
    let nucleus = word.group(Tier::Nucleus, &candidate.nucleus)?;
    let coda = if candidate.coda.is_empty() {
        None
    } else {
        Some(word.group(Tier::Coda, &candidate.coda)?)
    };

    let rime_children: Vec<SegmentId> = std::iter::once(nucleus).chain(coda).collect();
    let rime = word.group(Tier::Rime, &rime_children)?;
    let syllable_children: Vec<SegmentId> = onset.into_iter().chain(std::iter::once(rime)).collect();
    word.group(Tier::Syllable, &syllable_children)
}

/// Syllabification as a named step of a [`RuleSet`](crate::rule::RuleSet).
#[derive(Debug, Clone)]
pub struct SyllableRule {
    name: Arc<str>,
    builder: SyllableBuilder,
}

impl SyllableRule {
    /// Wrap `builder` under `name`.
    pub fn new(name: impl Into<String>, builder: SyllableBuilder) -> Self {
        Self {
            name: Arc::from(name.into()),
            builder,
        }
    }

    /// The step's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wrapped builder.
    pub fn builder(&self) -> &SyllableBuilder {
        &self.builder
    }

    /// The wrapped builder, mutably.
    pub fn builder_mut(&mut self) -> &mut SyllableBuilder {
        &mut self.builder
    }

    /// Syllabify `word`, reporting one application per syllable built.
    pub fn apply(&self, word: &mut Word, observer: &mut dyn RuleObserver) -> Result<usize> {
        observer.notify(&RuleEvent::Entered {
            rule: self.name.clone(),
        });
        let syllables = self.builder.syllabify(word)?;
        for &syllable in &syllables {
            if let Some(&anchor) = word.leaves_of(syllable)?.first() {
                observer.notify(&RuleEvent::Applied {
                    rule: self.name.clone(),
                    anchor,
                });
            }
        }
        observer.notify(&RuleEvent::Exited {
            rule: self.name.clone(),
            applications: syllables.len(),
        });
        Ok(syllables.len())
    }
}
