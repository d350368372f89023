//! Weighted-sum scalarization of several objectives.

use super::{DeltaMatrix, Objective};
use std::cell::RefCell;

/// `sum_k w_k * f_k(p)` over a slice of objectives.
///
/// Each component keeps its own delta matrix and value between calls, so a
/// `last_swap` hint is forwarded to every component and incremental
/// objectives keep their cheap patch path. A single objective with weight
/// 1.0 is delegated to directly.
///
/// The cache makes this type `!Sync`; it is built per local-search call.
pub struct WeightedSum<'a, O> {
    objectives: &'a [O],
    weights: Vec<f64>,
    cache: RefCell<ComponentCache>,
}

struct ComponentCache {
    values: Vec<f64>,
    deltas: Vec<DeltaMatrix>,
    primed: bool,
}

impl<'a, O: Objective> WeightedSum<'a, O> {
    /// Combines `objectives` with `weights`.
    ///
    /// # Panics
    /// Panics if the slices differ in length or `objectives` is empty.
    pub fn new(objectives: &'a [O], weights: Vec<f64>) -> Self {
        assert!(!objectives.is_empty(), "at least one objective is required");
        assert_eq!(
            objectives.len(),
            weights.len(),
            "one weight per objective is required"
        );
        let n = objectives[0].size();
        Self {
            objectives,
            cache: RefCell::new(ComponentCache {
                values: vec![0.0; objectives.len()],
                deltas: (0..objectives.len()).map(|_| DeltaMatrix::new(n)).collect(),
                primed: false,
            }),
            weights,
        }
    }

    /// Weights in objective order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weighted sum of an already evaluated objective vector.
    pub fn combine(&self, values: &[f64]) -> f64 {
        self.weights.iter().zip(values).map(|(w, v)| w * v).sum()
    }

    fn is_passthrough(&self) -> bool {
        self.objectives.len() == 1 && self.weights[0] == 1.0
    }
}

impl<O: Objective> Objective for WeightedSum<'_, O> {
    fn size(&self) -> usize {
        self.objectives[0].size()
    }

    fn evaluate(&self, solution: &[usize]) -> f64 {
        self.objectives
            .iter()
            .zip(&self.weights)
            .map(|(o, w)| w * o.evaluate(solution))
            .sum()
    }

    fn evaluate_neighbourhood(
        &self,
        solution: &[usize],
        value: f64,
        last_swap: Option<(usize, usize)>,
        delta: &mut DeltaMatrix,
    ) {
        if self.is_passthrough() {
            self.objectives[0].evaluate_neighbourhood(solution, value, last_swap, delta);
            return;
        }

        let mut cache = self.cache.borrow_mut();
        let ComponentCache {
            values,
            deltas,
            primed,
        } = &mut *cache;
        let hint = if *primed { last_swap } else { None };

        for (k, objective) in self.objectives.iter().enumerate() {
            match hint {
                Some((i, j)) => values[k] += deltas[k].get(i, j),
                None => values[k] = objective.evaluate(solution),
            }
            objective.evaluate_neighbourhood(solution, values[k], hint, &mut deltas[k]);
        }
        *primed = true;

        let n = solution.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self
                    .weights
                    .iter()
                    .zip(deltas.iter())
                    .map(|(w, m)| w * m.get(i, j))
                    .sum::<f64>();
                delta.set(i, j, d);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::fixtures::random_qap;
    use crate::objective::FnObjective;

    fn assert_matches_brute_force<O: Objective>(obj: &O, p: &[usize], delta: &DeltaMatrix) {
        let value = obj.evaluate(p);
        for i in 0..p.len() {
            for j in (i + 1)..p.len() {
                let mut q = p.to_vec();
                q.swap(i, j);
                let expected = obj.evaluate(&q) - value;
                assert!(
                    (delta.get(i, j) - expected).abs() < 1e-6,
                    "pair ({i},{j}): {} vs {expected}",
                    delta.get(i, j)
                );
            }
        }
    }

    #[test]
    fn test_weighted_value() {
        let objs = [random_qap(5, 1), random_qap(5, 2)];
        let ws = WeightedSum::new(&objs, vec![0.25, 0.75]);
        let p = [4, 2, 0, 1, 3];
        let expected = 0.25 * objs[0].evaluate(&p) + 0.75 * objs[1].evaluate(&p);
        assert!((ws.evaluate(&p) - expected).abs() < 1e-9);
        assert!((ws.combine(&[objs[0].evaluate(&p), objs[1].evaluate(&p)]) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_hint_forwarding_stays_consistent() {
        let objs = [random_qap(7, 3), random_qap(7, 4)];
        let ws = WeightedSum::new(&objs, vec![0.6, 0.4]);
        let mut p = vec![3, 6, 1, 0, 5, 2, 4];
        let mut delta = DeltaMatrix::new(7);
        ws.evaluate_neighbourhood(&p, ws.evaluate(&p), None, &mut delta);
        assert_matches_brute_force(&ws, &p, &delta);

        for &(i, j) in &[(0, 3), (2, 5), (0, 2), (4, 6), (1, 4)] {
            p.swap(i, j);
            ws.evaluate_neighbourhood(&p, ws.evaluate(&p), Some((i, j)), &mut delta);
            assert_matches_brute_force(&ws, &p, &delta);
        }
    }

    #[test]
    fn test_single_unit_weight_passthrough() {
        let objs = [FnObjective::new(3, |p: &[usize]| p[0] as f64)];
        let ws = WeightedSum::new(&objs, vec![1.0]);
        let mut delta = DeltaMatrix::new(3);
        ws.evaluate_neighbourhood(&[0, 1, 2], 0.0, None, &mut delta);
        assert_eq!(delta.get(0, 2), 2.0);
        assert_eq!(delta.get(1, 2), 0.0);
    }

    #[test]
    #[should_panic(expected = "one weight per objective")]
    fn test_weight_count_mismatch_panics() {
        let objs = [random_qap(3, 1)];
        let _ = WeightedSum::new(&objs, vec![0.5, 0.5]);
    }
}
