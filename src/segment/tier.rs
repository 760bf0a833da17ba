//! The levels of the segment hierarchy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A level in the segment hierarchy.
///
/// Tiers form a fixed DAG:
///
/// ```text
/// Syllable -> Onset, Rime
/// Rime     -> Nucleus, Coda
/// Onset, Nucleus, Coda -> Segment
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// A word position.
    Segment,
    /// Syllable onset.
    Onset,
    /// Syllable nucleus.
    Nucleus,
    /// Syllable coda.
    Coda,
    /// Nucleus plus coda.
    Rime,
    /// A whole syllable.
    Syllable,
}

impl Tier {
    /// Every tier, leaves first.
    pub const ALL: [Tier; 6] = [
        Tier::Segment,
        Tier::Onset,
        Tier::Nucleus,
        Tier::Coda,
        Tier::Rime,
        Tier::Syllable,
    ];

    /// Tiers allowed directly below this one.
    pub fn children(self) -> &'static [Tier] {
        match self {
            Tier::Segment => &[],
            Tier::Onset | Tier::Nucleus | Tier::Coda => &[Tier::Segment],
            Tier::Rime => &[Tier::Nucleus, Tier::Coda],
            Tier::Syllable => &[Tier::Onset, Tier::Rime],
        }
    }

    /// Tiers allowed directly above this one.
    pub fn parents(self) -> &'static [Tier] {
        match self {
            Tier::Segment => &[Tier::Onset, Tier::Nucleus, Tier::Coda],
            Tier::Onset | Tier::Rime => &[Tier::Syllable],
            Tier::Nucleus | Tier::Coda => &[Tier::Rime],
            Tier::Syllable => &[],
        }
    }

    /// Returns `true` if `child` may be attached directly below this tier.
    #[inline]
    pub fn allows_child(self, child: Tier) -> bool {
        self.children().contains(&child)
    }

    /// Returns `true` if `self` lies above `other` in the hierarchy.
    pub fn is_above(self, other: Tier) -> bool {
        other
            .parents()
            .iter()
            .any(|&p| p == self || self.is_above(p))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Segment => "segment",
            Tier::Onset => "onset",
            Tier::Nucleus => "nucleus",
            Tier::Coda => "coda",
            Tier::Rime => "rime",
            Tier::Syllable => "syllable",
        };
        f.write_str(name)
    }
}
