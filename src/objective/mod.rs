//! Objective functions over permutations.
//!
//! An [`Objective`] evaluates a full permutation and fills a [`DeltaMatrix`]
//! with the value change of every pairwise swap. All objectives follow the
//! maximization convention: cost functions return their negated cost.
//!
//! # Key Types
//!
//! - [`Objective`]: the evaluation contract consumed by the search
//! - [`DeltaMatrix`]: cached swap deltas of the current solution
//! - [`FnObjective`]: wraps a closure, with the default full recompute
//! - [`WeightedSum`]: scalarizes several objectives, forwarding swap hints
//! - [`Qap`]: quadratic assignment with incremental delta updates

mod delta;
mod qap;
mod weighted;

#[cfg(test)]
pub(crate) use qap::fixtures;

pub use delta::DeltaMatrix;
pub use qap::Qap;
pub use weighted::WeightedSum;

/// A higher-is-better objective over permutations of a fixed size.
///
/// Only [`size`](Objective::size) and [`evaluate`](Objective::evaluate) are
/// required. The default neighbourhood evaluation swaps every pair and calls
/// `evaluate`, which costs `O(n^2)` full evaluations. Objectives with cheaper
/// delta formulas override it and use the `last_swap` hint to patch the
/// previous matrix.
///
/// # Examples
///
/// ```
/// use u_permsearch::objective::{DeltaMatrix, Objective};
///
/// struct Displacement;
///
/// impl Objective for Displacement {
///     fn size(&self) -> usize { 3 }
///     fn evaluate(&self, p: &[usize]) -> f64 {
///         -(p.iter().enumerate().map(|(i, &v)| i.abs_diff(v)).sum::<usize>() as f64)
///     }
/// }
///
/// let mut delta = DeltaMatrix::new(3);
/// Displacement.evaluate_neighbourhood(&[1, 0, 2], -2.0, None, &mut delta);
/// assert_eq!(delta.get(0, 1), 2.0);
/// ```
pub trait Objective {
    /// Permutation size this objective is defined on.
    fn size(&self) -> usize;

    /// Value of a full solution.
    fn evaluate(&self, solution: &[usize]) -> f64;

    /// Fills `delta` with `evaluate(solution with i,j swapped) - value` for
    /// all pairs.
    ///
    /// `last_swap` names the pair swapped since the previous call on the
    /// same matrix; `None` requests a full recompute.
    fn evaluate_neighbourhood(
        &self,
        solution: &[usize],
        value: f64,
        last_swap: Option<(usize, usize)>,
        delta: &mut DeltaMatrix,
    ) {
        let _ = last_swap;
        let n = solution.len();
        let mut scratch = solution.to_vec();
        for i in 0..n {
            for j in (i + 1)..n {
                scratch.swap(i, j);
                delta.set(i, j, self.evaluate(&scratch) - value);
                scratch.swap(i, j);
            }
        }
    }
}

impl<T: Objective + ?Sized> Objective for &T {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn evaluate(&self, solution: &[usize]) -> f64 {
        (**self).evaluate(solution)
    }

    fn evaluate_neighbourhood(
        &self,
        solution: &[usize],
        value: f64,
        last_swap: Option<(usize, usize)>,
        delta: &mut DeltaMatrix,
    ) {
        (**self).evaluate_neighbourhood(solution, value, last_swap, delta)
    }
}

impl<T: Objective + ?Sized> Objective for Box<T> {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn evaluate(&self, solution: &[usize]) -> f64 {
        (**self).evaluate(solution)
    }

    fn evaluate_neighbourhood(
        &self,
        solution: &[usize],
        value: f64,
        last_swap: Option<(usize, usize)>,
        delta: &mut DeltaMatrix,
    ) {
        (**self).evaluate_neighbourhood(solution, value, last_swap, delta)
    }
}

/// Objective backed by a closure.
///
/// # Examples
///
/// ```
/// use u_permsearch::objective::{FnObjective, Objective};
///
/// let first_is_large = FnObjective::new(4, |p: &[usize]| p[0] as f64);
/// assert_eq!(first_is_large.evaluate(&[3, 0, 1, 2]), 3.0);
/// ```
#[derive(Debug, Clone)]
pub struct FnObjective<F> {
    size: usize,
    f: F,
}

impl<F: Fn(&[usize]) -> f64> FnObjective<F> {
    /// Wraps `f` as an objective on permutations of size `size`.
    pub fn new(size: usize, f: F) -> Self {
        Self { size, f }
    }
}

impl<F: Fn(&[usize]) -> f64> Objective for FnObjective<F> {
    fn size(&self) -> usize {
        self.size
    }

    fn evaluate(&self, solution: &[usize]) -> f64 {
        (self.f)(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted_positions(p: &[usize]) -> f64 {
        p.iter()
            .enumerate()
            .map(|(i, &v)| (v as f64) * 10f64.powi(i as i32))
            .sum()
    }

    #[test]
    fn test_default_neighbourhood_matches_brute_force() {
        let obj = FnObjective::new(4, weighted_positions);
        let p = [2, 0, 3, 1];
        let value = obj.evaluate(&p);
        let mut delta = DeltaMatrix::new(4);
        obj.evaluate_neighbourhood(&p, value, None, &mut delta);

        for i in 0..4 {
            for j in (i + 1)..4 {
                let mut q = p;
                q.swap(i, j);
                assert!((delta.get(i, j) - (obj.evaluate(&q) - value)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_reference_and_box_forward() {
        let obj = FnObjective::new(3, weighted_positions);
        let by_ref: &dyn Objective = &obj;
        let boxed: Box<dyn Objective> = Box::new(FnObjective::new(3, weighted_positions));
        assert_eq!(by_ref.size(), 3);
        assert_eq!((&by_ref).evaluate(&[0, 1, 2]), boxed.evaluate(&[0, 1, 2]));
    }
}
