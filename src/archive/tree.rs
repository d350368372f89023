//! Region-partitioned archive of non-dominated solutions.

use super::dominance::{dominates, region_mask, select_pivot, weakly_dominates};
use crate::error::{Result, SearchError};
use crate::permutation::Permutation;
use std::collections::{BTreeMap, HashMap};

/// Default number of entries a leaf holds before it splits.
pub const DEFAULT_LEAF_CAPACITY: usize = 20;

const ROOT: NodeId = NodeId(0);

/// A retained solution and its objective vector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArchiveEntry {
    /// The solution.
    pub solution: Permutation,
    /// Its objective vector (maximization).
    pub objectives: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Debug, Clone)]
struct Slot {
    solution: Permutation,
    objectives: Vec<f64>,
    pruning_power: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Validity {
    Live,
    Invalidated,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Leaf(Vec<Slot>),
    Branch {
        pivot: Slot,
        validity: Validity,
        child: Option<NodeId>,
    },
}

#[derive(Debug, Clone)]
struct Node {
    /// Region relative to the parent's pivot.
    region: u64,
    sibling: Option<NodeId>,
    kind: NodeKind,
}

/// Incremental Pareto archive.
///
/// Keeps the set of mutually non-dominated `(solution, objectives)` pairs of
/// every vector it was offered. Nodes live in an arena. A leaf holds a
/// bucket of entries; when the bucket grows past the leaf capacity, its
/// minimal-span entry becomes the pivot of a branch and the rest is spread
/// over child leaves keyed by their region relative to the pivot. Children
/// of a node form a sibling chain sorted by region mask.
///
/// A branch pivot that is later dominated is only flagged as invalidated;
/// its subtree keeps partitioning the space below it.
///
/// # Examples
///
/// ```
/// use u_permsearch::{ParetoArchive, Permutation};
///
/// let mut archive = ParetoArchive::new(2);
/// let p = Permutation::identity(3);
/// assert!(archive.insert(&p, &[1.0, 2.0]).unwrap());
/// assert!(!archive.insert(&Permutation::try_from(vec![1, 0, 2]).unwrap(), &[0.5, 2.0]).unwrap());
/// assert_eq!(archive.len(), 1);
/// assert_eq!(archive.ideal_point(), &[1.0, 2.0]);
/// ```
#[derive(Debug, Clone)]
pub struct ParetoArchive {
    dimensions: usize,
    leaf_capacity: usize,
    nodes: Vec<Node>,
    retained: HashMap<Permutation, Vec<f64>>,
    ideal: Vec<f64>,
}

impl ParetoArchive {
    /// Creates an archive for `dimensions` objectives with the default leaf
    /// capacity.
    ///
    /// # Panics
    /// Panics unless `1 <= dimensions <= 64`.
    pub fn new(dimensions: usize) -> Self {
        Self::with_leaf_capacity(dimensions, DEFAULT_LEAF_CAPACITY)
    }

    /// Creates an archive whose leaves split above `leaf_capacity` entries.
    ///
    /// # Panics
    /// Panics unless `1 <= dimensions <= 64` and `leaf_capacity >= 1`.
    pub fn with_leaf_capacity(dimensions: usize, leaf_capacity: usize) -> Self {
        assert!(
            (1..=64).contains(&dimensions),
            "archive supports 1 to 64 objectives"
        );
        assert!(leaf_capacity >= 1, "leaf capacity must be at least 1");
        Self {
            dimensions,
            leaf_capacity,
            nodes: vec![Node {
                region: 0,
                sibling: None,
                kind: NodeKind::Leaf(Vec::new()),
            }],
            retained: HashMap::new(),
            ideal: vec![f64::NEG_INFINITY; dimensions],
        }
    }

    /// Number of objectives.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.retained.len()
    }

    /// Returns `true` if nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    /// Returns `true` if `solution` is currently retained.
    pub fn contains(&self, solution: &Permutation) -> bool {
        self.retained.contains_key(solution)
    }

    /// Per-dimension maximum over every vector ever offered to
    /// [`insert`](Self::insert), including rejected and evicted ones.
    ///
    /// Components are `-inf` until the first insert.
    pub fn ideal_point(&self) -> &[f64] {
        &self.ideal
    }

    /// Offers a solution to the archive.
    ///
    /// Returns `Ok(true)` if the pair is retained, and `Ok(false)` if it is
    /// weakly dominated by a retained entry or is an exact duplicate.
    /// Retained entries dominated by the new vector are evicted. A solution
    /// already retained with a different vector drops its old entry before
    /// the new one is offered (latest wins).
    ///
    /// # Errors
    /// [`SearchError::DimensionMismatch`] or
    /// [`SearchError::NonFiniteObjective`] for malformed vectors.
    pub fn insert(&mut self, solution: &Permutation, objectives: &[f64]) -> Result<bool> {
        if objectives.len() != self.dimensions {
            return Err(SearchError::DimensionMismatch {
                expected: self.dimensions,
                found: objectives.len(),
            });
        }
        if objectives.iter().any(|v| !v.is_finite()) {
            return Err(SearchError::NonFiniteObjective);
        }
        for (ideal, &v) in self.ideal.iter_mut().zip(objectives) {
            *ideal = ideal.max(v);
        }

        if let Some(previous) = self.retained.get(solution) {
            if previous.as_slice() == objectives {
                return Ok(false);
            }
            let previous = previous.clone();
            self.detach(solution, &previous);
            self.retained.remove(solution);
        }

        if self.is_covered(ROOT, objectives) {
            return Ok(false);
        }

        let mut pending = Some(Slot {
            solution: solution.clone(),
            objectives: objectives.to_vec(),
            pruning_power: 0,
        });
        let mut evicted = Vec::new();
        self.evict(ROOT, objectives, true, &mut pending, &mut evicted);
        for gone in &evicted {
            self.retained.remove(gone);
        }
        if let Some(slot) = pending {
            self.place(slot);
        }
        self.retained.insert(solution.clone(), objectives.to_vec());
        Ok(true)
    }

    /// Retained entries, in arbitrary order.
    pub fn result(&self) -> Vec<ArchiveEntry> {
        let mut out = Vec::with_capacity(self.len());
        for node in &self.nodes {
            match &node.kind {
                NodeKind::Leaf(slots) => out.extend(slots.iter().map(Slot::entry)),
                NodeKind::Branch {
                    pivot,
                    validity: Validity::Live,
                    ..
                } => out.push(pivot.entry()),
                NodeKind::Branch { .. } => {}
            }
        }
        out
    }

    // ---- Phase A: rejection ----

    /// Returns `true` if something retained under `id` weakly dominates
    /// `point`.
    fn is_covered(&mut self, id: NodeId, point: &[f64]) -> bool {
        let (q, mut child) = match &mut self.nodes[id.0].kind {
            NodeKind::Leaf(slots) => return cover_in_leaf(slots, point),
            NodeKind::Branch {
                pivot,
                validity,
                child,
            } => {
                if *validity == Validity::Live && weakly_dominates(&pivot.objectives, point) {
                    return true;
                }
                (region_mask(&pivot.objectives, point), *child)
            }
        };
        while let Some(c) = child {
            let node = &self.nodes[c.0];
            let next = node.sibling;
            // Only points in a subset region can weakly dominate.
            if node.region & !q == 0 && self.is_covered(c, point) {
                return true;
            }
            child = next;
        }
        false
    }

    // ---- Phase B: eviction ----

    fn evict(
        &mut self,
        id: NodeId,
        point: &[f64],
        on_path: bool,
        pending: &mut Option<Slot>,
        evicted: &mut Vec<Permutation>,
    ) {
        let (q, mut child) = match &mut self.nodes[id.0].kind {
            NodeKind::Leaf(slots) => {
                let mut i = 0;
                while i < slots.len() {
                    if !dominates(point, &slots[i].objectives) {
                        i += 1;
                        continue;
                    }
                    let replacement = if on_path { pending.take() } else { None };
                    match replacement {
                        Some(slot) => {
                            evicted.push(std::mem::replace(&mut slots[i], slot).solution);
                            i += 1;
                        }
                        None => evicted.push(slots.remove(i).solution),
                    }
                }
                return;
            }
            NodeKind::Branch {
                pivot,
                validity,
                child,
            } => {
                if *validity == Validity::Live && dominates(point, &pivot.objectives) {
                    *validity = Validity::Invalidated;
                    evicted.push(pivot.solution.clone());
                }
                (region_mask(&pivot.objectives, point), *child)
            }
        };
        while let Some(c) = child {
            let node = &self.nodes[c.0];
            let (region, next) = (node.region, node.sibling);
            // Only points in a superset region can be dominated.
            if q & !region == 0 {
                self.evict(c, point, on_path && region == q, pending, evicted);
            }
            child = next;
        }
    }

    // ---- Phase C: placement ----

    fn place(&mut self, slot: Slot) {
        let mut id = ROOT;
        loop {
            let q = match &self.nodes[id.0].kind {
                NodeKind::Leaf(_) => break,
                NodeKind::Branch { pivot, .. } => region_mask(&pivot.objectives, &slot.objectives),
            };
            id = self.child_in_region(id, q);
        }
        let overflow = match &mut self.nodes[id.0].kind {
            NodeKind::Leaf(slots) => {
                slots.push(slot);
                slots.len() > self.leaf_capacity
            }
            NodeKind::Branch { .. } => false,
        };
        if overflow {
            self.split(id);
        }
    }

    /// Child of `parent` with region `q`, created as an empty leaf at its
    /// sorted position if missing.
    fn child_in_region(&mut self, parent: NodeId, q: u64) -> NodeId {
        let mut previous: Option<NodeId> = None;
        let mut cursor = self.branch_child(parent);
        while let Some(c) = cursor {
            let node = &self.nodes[c.0];
            if node.region == q {
                return c;
            }
            if node.region > q {
                break;
            }
            previous = Some(c);
            cursor = node.sibling;
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            region: q,
            sibling: cursor,
            kind: NodeKind::Leaf(Vec::new()),
        });
        match previous {
            Some(p) => self.nodes[p.0].sibling = Some(id),
            None => self.set_branch_child(parent, Some(id)),
        }
        id
    }

    fn split(&mut self, id: NodeId) {
        let mut slots = match &mut self.nodes[id.0].kind {
            NodeKind::Leaf(slots) => std::mem::take(slots),
            NodeKind::Branch { .. } => return,
        };
        for gone in select_pivot(&mut slots, |s| s.objectives.as_slice()) {
            self.retained.remove(&gone.solution);
        }
        if slots.is_empty() {
            return;
        }
        let pivot = slots.swap_remove(0);

        let mut groups: BTreeMap<u64, Vec<Slot>> = BTreeMap::new();
        for slot in slots {
            groups
                .entry(region_mask(&pivot.objectives, &slot.objectives))
                .or_default()
                .push(slot);
        }

        let mut head = None;
        let mut oversized = Vec::new();
        for (region, bucket) in groups.into_iter().rev() {
            let child = NodeId(self.nodes.len());
            if bucket.len() > self.leaf_capacity {
                oversized.push(child);
            }
            self.nodes.push(Node {
                region,
                sibling: head,
                kind: NodeKind::Leaf(bucket),
            });
            head = Some(child);
        }
        self.nodes[id.0].kind = NodeKind::Branch {
            pivot,
            validity: Validity::Live,
            child: head,
        };
        for child in oversized {
            self.split(child);
        }
    }

    // ---- Same-solution replacement ----

    /// Removes the retained entry of `solution`, stored with `objectives`.
    fn detach(&mut self, solution: &Permutation, objectives: &[f64]) {
        let mut id = ROOT;
        loop {
            let q = match &mut self.nodes[id.0].kind {
                NodeKind::Leaf(slots) => {
                    slots.retain(|s| &s.solution != solution);
                    return;
                }
                NodeKind::Branch {
                    pivot, validity, ..
                } => {
                    if *validity == Validity::Live && &pivot.solution == solution {
                        *validity = Validity::Invalidated;
                        return;
                    }
                    region_mask(&pivot.objectives, objectives)
                }
            };
            let mut cursor = self.branch_child(id);
            loop {
                match cursor {
                    Some(c) if self.nodes[c.0].region == q => {
                        id = c;
                        break;
                    }
                    Some(c) => cursor = self.nodes[c.0].sibling,
                    None => return,
                }
            }
        }
    }

    fn branch_child(&self, id: NodeId) -> Option<NodeId> {
        match &self.nodes[id.0].kind {
            NodeKind::Branch { child, .. } => *child,
            NodeKind::Leaf(_) => None,
        }
    }

    fn set_branch_child(&mut self, id: NodeId, new_child: Option<NodeId>) {
        if let NodeKind::Branch { child, .. } = &mut self.nodes[id.0].kind {
            *child = new_child;
        }
    }
}

impl Slot {
    fn entry(&self) -> ArchiveEntry {
        ArchiveEntry {
            solution: self.solution.clone(),
            objectives: self.objectives.clone(),
        }
    }
}

/// Leaf part of phase A. The covering entry gains pruning power and moves
/// one slot forward once it strictly outranks its predecessor.
fn cover_in_leaf(slots: &mut [Slot], point: &[f64]) -> bool {
    let Some(k) = slots
        .iter()
        .position(|s| weakly_dominates(&s.objectives, point))
    else {
        return false;
    };
    slots[k].pruning_power = slots[k].pruning_power.saturating_add(1);
    if k > 0 && slots[k].pruning_power > slots[k - 1].pruning_power {
        slots.swap(k - 1, k);
    }
    true
}
