//! Swap-delta cache.

/// Symmetric `n x n` cache of swap deltas.
///
/// `get(i, j)` is the objective value after swapping positions `i` and `j`
/// minus the current value. Only the upper triangle is stored meaningfully,
/// and reads and writes are normalized so `(i, j)` and `(j, i)` address the
/// same entry. The diagonal is unused.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaMatrix {
    n: usize,
    values: Vec<f64>,
}

impl DeltaMatrix {
    /// Creates a zeroed matrix for permutations of size `n`.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            values: vec![0.0; n * n],
        }
    }

    /// Permutation size the matrix was built for.
    pub fn size(&self) -> usize {
        self.n
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        debug_assert!(i != j && i < self.n && j < self.n);
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        lo * self.n + hi
    }

    /// Delta of swapping `i` and `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[self.offset(i, j)]
    }

    /// Overwrites the delta of swapping `i` and `j`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, delta: f64) {
        let k = self.offset(i, j);
        self.values[k] = delta;
    }

    /// Adds `amount` to the delta of swapping `i` and `j`.
    #[inline]
    pub fn add(&mut self, i: usize, j: usize, amount: f64) {
        let k = self.offset(i, j);
        self.values[k] += amount;
    }

    /// Iterates `(i, j, delta)` over all pairs with `i < j`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n = self.n;
        (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| (i, j, self.values[i * n + j])))
    }

    /// Pair with the largest delta, first in row-major order on ties.
    ///
    /// Returns `None` when `n < 2`.
    pub fn best_move(&self) -> Option<(usize, usize, f64)> {
        let mut best: Option<(usize, usize, f64)> = None;
        for (i, j, d) in self.pairs() {
            match best {
                Some((_, _, b)) if d <= b => {}
                _ => best = Some((i, j, d)),
            }
        }
        best
    }
}
