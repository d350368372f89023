//! Short- and long-term swap memory.

/// Per-pair swap memory of one local-search run.
///
/// Records the iteration of the last swap of every pair and how often it was
/// swapped. A pair that was never swapped is never tabu.
#[derive(Debug, Clone)]
pub struct TabuState {
    n: usize,
    last_swapped: Vec<Option<u64>>,
    frequency: Vec<u32>,
}

impl TabuState {
    /// Creates an empty memory for permutations of size `n`.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            last_swapped: vec![None; n * n],
            frequency: vec![0; n * n],
        }
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        lo * self.n + hi
    }

    /// Records a swap of `(i, j)` at `iteration`.
    pub fn record_swap(&mut self, i: usize, j: usize, iteration: u64) {
        let k = self.offset(i, j);
        self.last_swapped[k] = Some(iteration);
        self.frequency[k] = self.frequency[k].saturating_add(1);
    }

    /// Iteration of the last swap of `(i, j)`.
    pub fn last_swapped(&self, i: usize, j: usize) -> Option<u64> {
        self.last_swapped[self.offset(i, j)]
    }

    /// Number of times `(i, j)` was swapped.
    ///
    /// Diagnostic only: move selection reads the recency memory alone.
    pub fn frequency(&self, i: usize, j: usize) -> u32 {
        self.frequency[self.offset(i, j)]
    }

    /// Returns `true` while the last swap of `(i, j)` is within `tenure`
    /// iterations of `iteration`.
    pub fn is_tabu(&self, i: usize, j: usize, iteration: u64, tenure: f64) -> bool {
        match self.last_swapped(i, j) {
            Some(last) => last as f64 + tenure >= iteration as f64,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_swapped_is_free() {
        let state = TabuState::new(4);
        assert!(!state.is_tabu(0, 1, 0, 100.0));
        assert_eq!(state.frequency(2, 3), 0);
        assert_eq!(state.last_swapped(2, 3), None);
    }

    #[test]
    fn test_tenure_expiry() {
        let mut state = TabuState::new(4);
        state.record_swap(3, 1, 10);
        assert!(state.is_tabu(1, 3, 12, 4.0));
        assert!(state.is_tabu(1, 3, 14, 4.0));
        assert!(!state.is_tabu(1, 3, 15, 4.0));
    }

    #[test]
    fn test_frequency_counts() {
        let mut state = TabuState::new(3);
        state.record_swap(0, 2, 1);
        state.record_swap(2, 0, 5);
        assert_eq!(state.frequency(0, 2), 2);
        assert_eq!(state.last_swapped(0, 2), Some(5));
    }
}
