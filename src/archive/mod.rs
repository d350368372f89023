//! Incremental Pareto archive.
//!
//! Maintains the non-dominated subset of every `(solution, objectives)` pair
//! produced during a search, for any number of maximized objectives up to 64.
//!
//! # Algorithm
//!
//! Entries are organized in a tree. Each branch holds a pivot vector and
//! partitions its descendants by their *region* relative to that pivot: a
//! bitmask with bit `k` set iff the descendant is no better than the pivot in
//! objective `k`. Because a dominating point always lies in a subset region
//! of the point it dominates, an insertion only visits subset regions when
//! looking for a point that covers the newcomer, and superset regions when
//! evicting points the newcomer dominates.
//!
//! Leaves are unordered buckets that split once they exceed a capacity; the
//! entry with the smallest objective span becomes the new pivot.
//!
//! # Key Types
//!
//! - [`ParetoArchive`]: the archive
//! - [`ArchiveEntry`]: a retained pair
//! - [`Dominance`]: outcome of [`dominance_cmp`]
//!
//! # References
//!
//! - Fieldsend, J. E., Everson, R. M. & Singh, S. (2003). "Using unconstrained elite
//!   archives for multiobjective optimization", *IEEE TEC* 7(3), 305-323.
//! - Jaszkiewicz, A. & Lust, T. (2018). "ND-Tree-based update: a fast algorithm for the
//!   dynamic nondominance problem", *IEEE TEC* 22(5), 778-791.

mod dominance;
mod tree;

pub use dominance::{
    dominance_cmp, dominates, region_mask, select_pivot, weakly_dominates, Dominance,
};
pub use tree::{ArchiveEntry, ParetoArchive, DEFAULT_LEAF_CAPACITY};
