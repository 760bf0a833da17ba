//! Arena storage for segments.
//!
//! Segments live in slots addressed by [`SegmentId`]. A slot carries a
//! generation counter that is bumped every time the slot is freed, so a
//! handle taken before a delete is detectably stale even after the slot has
//! been reused.
//!
//! Parent/child edges are stored as handle lists on both ends: `children` is
//! ordered and authoritative, `parents` is the derived reverse index. Every
//! edge update goes through [`SegmentArena::attach`] or
//! [`SegmentArena::release`], which keep both sides in step.

use smallvec::SmallVec;
use std::fmt;

use super::error::{Result, SegmentError};
use super::Tier;
use crate::feature::FeatureMatrix;

/// Stable handle to a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId {
    index: u32,
    generation: u32,
}

impl SegmentId {
    /// Slot index of this handle.
    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// A node of the segment graph.
#[derive(Debug, Clone)]
pub struct Segment {
    tier: Tier,
    matrix: FeatureMatrix,
    children: SmallVec<[SegmentId; 4]>,
    parents: SmallVec<[SegmentId; 2]>,
    pub(crate) prev: Option<SegmentId>,
    pub(crate) next: Option<SegmentId>,
}

impl Segment {
    /// A segment with no edges.
    pub fn new(tier: Tier, matrix: FeatureMatrix) -> Self {
        Self {
            tier,
            matrix,
            children: SmallVec::new(),
            parents: SmallVec::new(),
            prev: None,
            next: None,
        }
    }

    /// The segment's tier.
    #[inline]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// The segment's matrix.
    #[inline]
    pub fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    /// Ordered children.
    #[inline]
    pub fn children(&self) -> &[SegmentId] {
        &self.children
    }

    /// Parents, in no particular order.
    #[inline]
    pub fn parents(&self) -> &[SegmentId] {
        &self.parents
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    segment: Option<Segment>,
}

/// Generational arena of segments.
#[derive(Debug, Clone, Default)]
pub struct SegmentArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl SegmentArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `segment` and return its handle.
    pub fn alloc(&mut self, segment: Segment) -> SegmentId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.segment.is_none(), "free slot should be empty");
            slot.segment = Some(segment);
            SegmentId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                segment: Some(segment),
            });
            SegmentId {
                index,
                generation: 0,
            }
        }
    }

    /// Returns `true` if `id` refers to a live segment.
    #[inline]
    pub fn contains(&self, id: SegmentId) -> bool {
        self.get(id).is_ok()
    }

    /// Number of live segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if the arena holds no live segments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// The segment behind `id`.
    pub fn get(&self, id: SegmentId) -> Result<&Segment> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.segment.as_ref())
            .ok_or(SegmentError::Deleted(id))
    }

    pub(crate) fn get_mut(&mut self, id: SegmentId) -> Result<&mut Segment> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.segment.as_mut())
            .ok_or(SegmentError::Deleted(id))
    }

    /// Replace the matrix of `id`.
    pub fn set_matrix(&mut self, id: SegmentId, matrix: FeatureMatrix) -> Result<()> {
        self.get_mut(id)?.matrix = matrix;
        Ok(())
    }

    /// Make `children` the ordered children of `parent`.
    ///
    /// Every child's tier must be admitted by the parent's tier; the check
    /// runs before anything is modified. Previous children lose their back
    /// reference to `parent`.
    pub fn attach(&mut self, parent: SegmentId, children: &[SegmentId]) -> Result<()> {
        let parent_tier = self.get(parent)?.tier;
        for &child in children {
            let child_tier = self.get(child)?.tier;
            if !parent_tier.allows_child(child_tier) {
                return Err(SegmentError::TierMismatch {
                    parent: parent_tier,
                    child: child_tier,
                });
            }
        }

        let old = std::mem::take(&mut self.get_mut(parent)?.children);
        for child in old {
            if let Ok(seg) = self.get_mut(child) {
                seg.parents.retain(|p| *p != parent);
            }
        }
        for &child in children {
            let seg = self.get_mut(child)?;
            if !seg.parents.contains(&parent) {
                seg.parents.push(parent);
            }
        }
        self.get_mut(parent)?.children = children.iter().copied().collect();
        Ok(())
    }

    /// Allocate a grouping segment of `tier` over `children`.
    pub fn group(&mut self, tier: Tier, children: &[SegmentId]) -> Result<SegmentId> {
        for &child in children {
            let child_tier = self.get(child)?.tier;
            if !tier.allows_child(child_tier) {
                return Err(SegmentError::TierMismatch {
                    parent: tier,
                    child: child_tier,
                });
            }
        }
        let id = self.alloc(Segment::new(tier, FeatureMatrix::empty()));
        self.attach(id, children)?;
        Ok(id)
    }

    /// Free `id`, unhooking it from its parents and children.
    ///
    /// Grouping structure is released as a unit: a parent left without
    /// children and a grouping child left without parents are released too.
    /// Word positions are never released by the cascade.
    pub fn release(&mut self, id: SegmentId) -> Result<Segment> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .ok_or(SegmentError::Deleted(id))?;
        let segment = slot.segment.take().ok_or(SegmentError::Deleted(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;

        for &child in &segment.children {
            let orphaned = match self.get_mut(child) {
                Ok(seg) => {
                    seg.parents.retain(|p| *p != id);
                    seg.tier != Tier::Segment && seg.parents.is_empty()
                }
                Err(_) => false,
            };
            if orphaned {
                self.release(child)?;
            }
        }
        for &parent in &segment.parents {
            let emptied = match self.get_mut(parent) {
                Ok(seg) => {
                    seg.children.retain(|c| *c != id);
                    seg.children.is_empty()
                }
                Err(_) => false,
            };
            if emptied {
                self.release(parent)?;
            }
        }
        Ok(segment)
    }

    /// The nearest ancestor of `id` on `tier`.
    pub fn ancestor(&self, id: SegmentId, tier: Tier) -> Result<SegmentId> {
        let mut frontier: SmallVec<[SegmentId; 4]> =
            self.get(id)?.parents.iter().copied().collect();
        while !frontier.is_empty() {
            let mut next = SmallVec::new();
            for p in frontier {
                let seg = self.get(p)?;
                if seg.tier == tier {
                    return Ok(p);
                }
                next.extend(seg.parents.iter().copied());
            }
            frontier = next;
        }
        Err(SegmentError::NoAncestor { segment: id, tier })
    }

    /// Every grouping segment above `id`, nearest first.
    pub fn ancestors(&self, id: SegmentId) -> Result<Vec<SegmentId>> {
        let mut out: Vec<SegmentId> = Vec::new();
        let mut queue: Vec<SegmentId> = self.get(id)?.parents.to_vec();
        let mut i = 0;
        while i < queue.len() {
            let p = queue[i];
            i += 1;
            if out.contains(&p) {
                continue;
            }
            out.push(p);
            queue.extend(self.get(p)?.parents.iter().copied());
        }
        Ok(out)
    }

    /// Release every grouping segment above `id`.
    pub fn detach_ancestry(&mut self, id: SegmentId) -> Result<()> {
        for ancestor in self.ancestors(id)? {
            if self.contains(ancestor) {
                self.release(ancestor)?;
            }
        }
        Ok(())
    }
}
