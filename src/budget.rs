//! Evaluation budget.
//!
//! Every full objective evaluation costs one unit and every neighbourhood
//! recompute costs `n(n-1)/2` units, so a budget bounds the total work of a
//! run independently of how it is split between evaluation and local search.

/// Counter of evaluation units consumed by a run.
///
/// # Examples
///
/// ```
/// use u_permsearch::EvaluationBudget;
///
/// let mut budget = EvaluationBudget::new(100);
/// budget.consume(EvaluationBudget::neighbourhood_cost(10));
/// assert_eq!(budget.used(), 45);
/// assert_eq!(budget.remaining(), 55);
/// assert!(!budget.is_exhausted());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationBudget {
    total: u64,
    used: u64,
}

impl EvaluationBudget {
    /// Creates a budget of `total` units.
    pub fn new(total: u64) -> Self {
        Self { total, used: 0 }
    }

    /// Units charged for one full neighbourhood recompute of size `n`.
    pub fn neighbourhood_cost(n: usize) -> u64 {
        let n = n as u64;
        n * n.saturating_sub(1) / 2
    }

    /// Charges `units`. Usage may overshoot the total by the last charge.
    pub fn consume(&mut self, units: u64) {
        self.used = self.used.saturating_add(units);
    }

    /// Units charged so far.
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Units granted at construction.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Units left before exhaustion.
    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.used)
    }

    /// Returns `true` once usage has reached the total.
    pub fn is_exhausted(&self) -> bool {
        self.used >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbourhood_cost() {
        assert_eq!(EvaluationBudget::neighbourhood_cost(0), 0);
        assert_eq!(EvaluationBudget::neighbourhood_cost(1), 0);
        assert_eq!(EvaluationBudget::neighbourhood_cost(2), 1);
        assert_eq!(EvaluationBudget::neighbourhood_cost(12), 66);
    }

    #[test]
    fn test_exhaustion_and_overshoot() {
        let mut budget = EvaluationBudget::new(10);
        budget.consume(9);
        assert!(!budget.is_exhausted());
        budget.consume(5);
        assert!(budget.is_exhausted());
        assert_eq!(budget.used(), 14);
        assert_eq!(budget.remaining(), 0);
        assert_eq!(budget.total(), 10);
    }

    #[test]
    fn test_zero_budget_is_exhausted() {
        assert!(EvaluationBudget::new(0).is_exhausted());
    }
}
