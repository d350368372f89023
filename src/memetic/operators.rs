//! Permutation crossover and mutation operators.
//!
//! All operators take validated [`Permutation`]s and return permutations by
//! construction, so their results skip revalidation.
//!
//! # Crossover Operators
//!
//! - [`pmx_crossover`] (PMX): Goldberg & Lingle (1985), swap-based variant
//! - [`uniform_crossover`]: agreement-preserving uniform crossover
//!
//! # Mutation Operators
//!
//! - [`chain_mutation`]: cyclic exchange along a chain of random positions
//!
//! # References
//!
//! - Goldberg & Lingle (1985), "Alleles, Loci, and the Traveling Salesman Problem"
//! - Cicirello (2023), "Genetic Operators for Permutation Representation"

use crate::permutation::Permutation;
use rand::seq::SliceRandom;
use rand::Rng;

// ============================================================================
// Crossover operators
// ============================================================================

/// Partially Mapped Crossover (PMX) over the segment `[cut1, cut2]`.
///
/// Starts from a copy of `parent1`; for every position in the segment the
/// value of `parent2` at that position is swapped into place.
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if the parents differ in length or the cut points are out of
/// order or range.
///
/// # Examples
///
/// ```
/// use u_permsearch::memetic::pmx_crossover;
/// use u_permsearch::Permutation;
///
/// let p1 = Permutation::try_from(vec![5, 1, 2, 3, 0, 6, 4]).unwrap();
/// let p2 = Permutation::try_from(vec![4, 1, 3, 0, 2, 6, 5]).unwrap();
/// let child = pmx_crossover(&p1, &p2, 3, 5);
/// assert_eq!(child.as_slice(), &[5, 1, 3, 0, 2, 6, 4]);
/// ```
pub fn pmx_crossover(
    parent1: &Permutation,
    parent2: &Permutation,
    cut1: usize,
    cut2: usize,
) -> Permutation {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(cut1 <= cut2 && cut2 < n, "cut points must satisfy cut1 <= cut2 < n");

    let mut child = parent1.as_slice().to_vec();
    let mut position = vec![0; n];
    for (i, &v) in child.iter().enumerate() {
        position[v] = i;
    }

    for i in cut1..=cut2 {
        let wanted = parent2[i];
        let j = position[wanted];
        if j != i {
            let displaced = child[i];
            child.swap(i, j);
            position[displaced] = j;
            position[wanted] = i;
        }
    }
    Permutation::from_vec_unchecked(child)
}

/// PMX with two uniformly drawn cut points.
///
/// # Panics
/// Panics if the parents differ in length or are empty.
pub fn random_pmx<R: Rng>(parent1: &Permutation, parent2: &Permutation, rng: &mut R) -> Permutation {
    let n = parent1.len();
    assert!(n > 0, "parents must not be empty");
    let (cut1, cut2) = random_segment(n, rng);
    pmx_crossover(parent1, parent2, cut1, cut2)
}

/// Uniform crossover for permutations.
///
/// # Algorithm
///
/// 1. Keep every position where both parents agree
/// 2. Elsewhere take the gene of a randomly chosen parent, or of the other
///    parent, whichever is still unused
/// 3. Fill the remaining holes with the unused values in random order
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if the parents differ in length.
pub fn uniform_crossover<R: Rng>(
    parent1: &Permutation,
    parent2: &Permutation,
    rng: &mut R,
) -> Permutation {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");

    let mut child: Vec<Option<usize>> = vec![None; n];
    let mut used = vec![false; n];

    for i in 0..n {
        if parent1[i] == parent2[i] {
            child[i] = Some(parent1[i]);
            used[parent1[i]] = true;
        }
    }

    for i in 0..n {
        if child[i].is_some() {
            continue;
        }
        let (first, second) = if rng.random_bool(0.5) {
            (parent1[i], parent2[i])
        } else {
            (parent2[i], parent1[i])
        };
        if let Some(gene) = [first, second].into_iter().find(|&g| !used[g]) {
            child[i] = Some(gene);
            used[gene] = true;
        }
    }

    let mut remaining: Vec<usize> = (0..n).filter(|&v| !used[v]).collect();
    remaining.shuffle(rng);
    let mut fill = remaining.into_iter();
    let genes = child
        .into_iter()
        .map(|slot| slot.or_else(|| fill.next()).unwrap_or_default())
        .collect();
    Permutation::from_vec_unchecked(genes)
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Chain mutation: picks `length` distinct random positions and swaps each
/// with the next one along the chain, rotating their values.
///
/// `length` is clamped to `n`. Sizes below 2 are left unchanged.
///
/// # Complexity
/// O(n)
pub fn chain_mutation<R: Rng>(perm: &mut Permutation, length: usize, rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let mut positions: Vec<usize> = (0..n).collect();
    let (chain, _) = positions.partial_shuffle(rng, length.clamp(2, n));
    for link in chain.windows(2) {
        perm.swap(link[0], link[1]);
    }
}

/// Chain length for a jump magnitude: `max(2, ceil(jump * n))`.
pub fn chain_length(jump_magnitude: f64, n: usize) -> usize {
    ((jump_magnitude * n as f64).ceil() as usize).max(2)
}

// ============================================================================
// Helpers
// ============================================================================

/// Pick a random segment `[start, end]` within `0..n` where `start <= end`.
fn random_segment<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// ============================================================================
// Tests
// ============================================================================
