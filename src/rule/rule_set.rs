//! Ordered rule lists with persistent-rule reconvergence.

use super::observer::{RuleEvent, RuleObserver, TracingObserver};
use super::Rule;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::segment;
use crate::syllable::SyllableRule;
use crate::word::Word;

/// Default cap on reconvergence passes after one application event.
pub const DEFAULT_MAX_PERSISTENT_PASSES: usize = 64;

/// One step of a [`RuleSet`].
#[derive(Debug, Clone)]
pub enum RuleEntry {
    /// A rewrite rule.
    Rewrite(Rule),
    /// A syllabification pass.
    Syllabify(SyllableRule),
}

impl RuleEntry {
    /// Name of the wrapped rule.
    pub fn name(&self) -> &str {
        match self {
            RuleEntry::Rewrite(rule) => rule.name(),
            RuleEntry::Syllabify(rule) => rule.name(),
        }
    }
}

impl From<Rule> for RuleEntry {
    fn from(rule: Rule) -> Self {
        RuleEntry::Rewrite(rule)
    }
}

impl From<SyllableRule> for RuleEntry {
    fn from(rule: SyllableRule) -> Self {
        RuleEntry::Syllabify(rule)
    }
}

/// Rules applied in order, once each, plus persistent rules.
///
/// Persistent rules are re-run after every single application event of the
/// ordered rules until the word stops changing, or until
/// [`max_persistent_passes`](Self::max_persistent_passes) passes have run.
#[derive(Debug, Clone)]
pub struct RuleSet {
    entries: Vec<RuleEntry>,
    persistent: Vec<Rule>,
    max_persistent_passes: usize,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            persistent: Vec::new(),
            max_persistent_passes: DEFAULT_MAX_PERSISTENT_PASSES,
        }
    }

    /// Append an ordered step.
    pub fn push(&mut self, entry: impl Into<RuleEntry>) -> &mut Self {
        self.entries.push(entry.into());
        self
    }

    /// Add a persistent rule.
    pub fn push_persistent(&mut self, rule: Rule) -> &mut Self {
        self.persistent.push(rule);
        self
    }

    /// The ordered steps.
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// The persistent rules.
    pub fn persistent(&self) -> &[Rule] {
        &self.persistent
    }

    /// Number of ordered steps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no ordered steps.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reconvergence pass cap.
    pub fn max_persistent_passes(&self) -> usize {
        self.max_persistent_passes
    }

    /// Set the reconvergence pass cap.
    pub fn set_max_persistent_passes(&mut self, passes: usize) {
        self.max_persistent_passes = passes;
    }

    /// Give every rewrite rule its own gate seeded from `seed` and its index.
    pub fn reseed(&mut self, seed: u64) {
        let mut index = 0u64;
        for entry in &mut self.entries {
            if let RuleEntry::Rewrite(rule) = entry {
                rule.reseed(seed.wrapping_add(index));
            }
            index += 1;
        }
        for rule in &mut self.persistent {
            rule.reseed(seed.wrapping_add(index));
            index += 1;
        }
    }

    /// Apply engine settings: pass cap, seeds and syllabification options.
    pub fn configure(&mut self, config: &EngineConfig) {
        self.max_persistent_passes = config.max_persistent_passes;
        if let Some(seed) = config.rule_seed {
            self.reseed(seed);
        }
        for entry in &mut self.entries {
            if let RuleEntry::Syllabify(rule) = entry {
                rule.builder_mut().set_config(config.syllable.clone());
            }
        }
    }

    /// Run every step over `word`, in order.
    ///
    /// Returns the number of application events.
    pub fn apply(&mut self, word: &mut Word, observer: &mut dyn RuleObserver) -> Result<usize> {
        let max_passes = self.max_persistent_passes;
        let persistent = &mut self.persistent;
        let mut total = 0;

        for entry in &mut self.entries {
            match entry {
                RuleEntry::Rewrite(rule) => {
                    total += rule.apply_with(word, observer, |word, _, observer| {
                        reconverge(persistent, max_passes, word, observer)
                    })?;
                }
                RuleEntry::Syllabify(rule) => {
                    let built = rule.apply(word, observer)?;
                    if built > 0 {
                        reconverge(persistent, max_passes, word, observer)?;
                    }
                    total += built;
                }
            }
        }
        Ok(total)
    }

    /// [`apply`](Self::apply) with events forwarded to `tracing`.
    pub fn apply_traced(&mut self, word: &mut Word) -> Result<usize> {
        self.apply(word, &mut TracingObserver)
    }
}

/// Run persistent rules until the word's matrices stop changing.
fn reconverge(
    persistent: &mut [Rule],
    max_passes: usize,
    word: &mut Word,
    observer: &mut dyn RuleObserver,
) -> segment::Result<()> {
    if persistent.is_empty() {
        return Ok(());
    }
    for _ in 0..max_passes {
        let before = word.matrices();
        for rule in persistent.iter_mut() {
            rule.apply(word, observer)?;
        }
        if word.matrices() == before {
            return Ok(());
        }
    }
    observer.notify(&RuleEvent::PersistenceLimit { passes: max_passes });
    Ok(())
}
