//! Tabu-guided local search over the swap neighbourhood.
//!
//! # Algorithm
//!
//! 1. Compute the delta of every pairwise swap of the start solution
//! 2. While a swap with positive delta exists, apply the steepest one and
//!    patch the deltas with the swap as hint
//! 3. At a local optimum, run a diversification burst:
//!    - **Normal**: each forced swap is either the best pair that is not
//!      tabu (or that would beat the best value), or a random pair
//!    - **Annealed**: each forced swap is drawn among non-tabu pairs by a
//!      geometric temperature ramp over their normalized delta rank
//! 4. Repeat until the budget, the iteration limit, the monitor, or the
//!    target stops the walk
//!
//! The burst length starts at `max(2, ceil(jump_magnitude * n))`, grows by
//! one each time the walk falls back into the previous optimum, and resets
//! when a new optimum is reached.
//!
//! # References
//!
//! - Benlic & Hao (2013), "Breakout local search for the quadratic assignment
//!   problem", *Applied Mathematics and Computation* 219(9), 4800-4815
//! - Benlic & Hao (2015), "Memetic search for the quadratic assignment
//!   problem", *Expert Systems with Applications* 42(1), 584-595

use super::config::{Perturbation, TabuConfig};
use super::state::TabuState;
use crate::budget::EvaluationBudget;
use crate::error::Result;
use crate::monitor::SearchMonitor;
use crate::objective::{DeltaMatrix, Objective};
use crate::permutation::Permutation;
use crate::TOLERANCE;
use rand::seq::SliceRandom;
use rand::Rng;

/// Shared resources of a search: budget, monitor, and random source.
pub struct SearchContext<'a, R, M: ?Sized> {
    /// Budget charged for every neighbourhood recompute.
    pub budget: &'a mut EvaluationBudget,
    /// Monitor polled after every charge.
    pub monitor: &'a mut M,
    /// Random source for tenures and perturbations.
    pub rng: &'a mut R,
}

impl<'a, R: Rng, M: SearchMonitor + ?Sized> SearchContext<'a, R, M> {
    /// Bundles the resources of one search.
    pub fn new(budget: &'a mut EvaluationBudget, monitor: &'a mut M, rng: &'a mut R) -> Self {
        Self {
            budget,
            monitor,
            rng,
        }
    }
}

/// Result of one local-search call.
#[derive(Debug, Clone)]
pub struct LocalSearchOutcome {
    /// Best solution visited.
    pub solution: Permutation,
    /// Value of `solution`, never below the start value.
    pub value: f64,
    /// Loop iterations executed.
    pub iterations: usize,
    /// Swaps applied, improving and forced.
    pub swaps: u64,
}

/// Tabu-guided hill climber with diversification bursts.
///
/// # Examples
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use u_permsearch::objective::{FnObjective, Objective};
/// use u_permsearch::tabu::{Perturbation, SearchContext, TabuConfig, TabuLocalSearch};
/// use u_permsearch::{EvaluationBudget, NoOpMonitor, Permutation};
///
/// // Larger items at later positions are worth more.
/// let objective = FnObjective::new(4, |p: &[usize]| {
///     p.iter().enumerate().map(|(i, &v)| (i * v) as f64).sum()
/// });
/// let start = Permutation::try_from(vec![3, 2, 1, 0]).unwrap();
/// let value = objective.evaluate(start.as_slice());
///
/// let mut budget = EvaluationBudget::new(10_000);
/// let mut rng = StdRng::seed_from_u64(1);
/// let mut monitor = NoOpMonitor;
/// let mut ctx = SearchContext::new(&mut budget, &mut monitor, &mut rng);
///
/// let search = TabuLocalSearch::new(
///     TabuConfig::default().with_perturbation(Perturbation::Disabled),
/// ).unwrap();
/// let outcome = search.search(start, value, 100, &objective, &mut ctx);
/// assert_eq!(outcome.solution.as_slice(), &[0, 1, 2, 3]);
/// assert_eq!(outcome.value, 14.0);
/// ```
#[derive(Debug, Clone)]
pub struct TabuLocalSearch {
    config: TabuConfig,
    target: Option<f64>,
}

impl TabuLocalSearch {
    /// Creates a local search with the given configuration.
    ///
    /// # Errors
    /// [`SearchError::InvalidConfig`](crate::SearchError::InvalidConfig) if
    /// `config` does not validate, for example an inverted tenure range.
    pub fn new(config: TabuConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            target: None,
        })
    }

    /// Stops the walk as soon as the current value reaches `target`.
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &TabuConfig {
        &self.config
    }

    /// Improves `start` (whose value is `value`) for at most
    /// `max_iterations` iterations.
    ///
    /// Returns the best solution visited. A start that is already exhausted
    /// by the budget or the monitor is returned unchanged.
    ///
    /// # Panics
    /// Panics if `start` and `objective` disagree on the permutation size.
    pub fn search<O, R, M>(
        &self,
        start: Permutation,
        value: f64,
        max_iterations: usize,
        objective: &O,
        ctx: &mut SearchContext<'_, R, M>,
    ) -> LocalSearchOutcome
    where
        O: Objective + ?Sized,
        R: Rng,
        M: SearchMonitor + ?Sized,
    {
        let n = start.len();
        assert_eq!(n, objective.size(), "solution size must match the objective");
        let walk = Walk {
            config: &self.config,
            target: self.target,
            objective,
            ctx,
            n,
            best: start.clone(),
            best_value: value,
            current: start,
            value,
            delta: DeltaMatrix::new(n),
            tabu: TabuState::new(n),
            clock: 0,
            swaps: 0,
            without_improvement: 0,
        };
        walk.run(max_iterations)
    }
}

struct Walk<'w, 'c, O: ?Sized, R, M: ?Sized> {
    config: &'w TabuConfig,
    target: Option<f64>,
    objective: &'w O,
    ctx: &'w mut SearchContext<'c, R, M>,
    n: usize,
    current: Permutation,
    value: f64,
    best: Permutation,
    best_value: f64,
    delta: DeltaMatrix,
    tabu: TabuState,
    clock: u64,
    swaps: u64,
    /// Escapes since the last new best.
    without_improvement: usize,
}

impl<O, R, M> Walk<'_, '_, O, R, M>
where
    O: Objective + ?Sized,
    R: Rng,
    M: SearchMonitor + ?Sized,
{
    fn run(mut self, max_iterations: usize) -> LocalSearchOutcome {
        let mut iterations = 0;
        self.ctx.monitor.on_best(self.best_value);
        if self.n < 2 || max_iterations == 0 || self.stop_requested() {
            return self.finish(iterations);
        }
        self.refresh(None);

        let base_strength = ((self.config.jump_magnitude * self.n as f64).ceil() as usize).max(2);
        let mut strength = base_strength;
        let mut climbed = true;
        let mut previous_optimum = self.current.clone();

        while iterations < max_iterations && !self.stop_requested() {
            iterations += 1;

            if let Some((i, j, d)) = self.delta.best_move() {
                if d > 0.0 {
                    self.apply(i, j);
                    if self.value > self.best_value + TOLERANCE {
                        self.record_best();
                    }
                    climbed = true;
                    continue;
                }
            }

            let annealed = match self.config.perturbation {
                Perturbation::Disabled => break,
                Perturbation::Normal => false,
                Perturbation::Annealed => true,
            };

            let escaped = climbed && previous_optimum != self.current;
            if !annealed && self.without_improvement == self.config.stagnation_after {
                self.without_improvement = 0;
                strength = strength.max(self.stagnation_jump());
                tracing::trace!(strength, "stagnation jump");
            } else if escaped {
                self.without_improvement += 1;
                strength = base_strength;
            } else {
                strength += 1;
            }
            if climbed {
                previous_optimum = self.current.clone();
                climbed = false;
            }

            let ratio = self.without_improvement as f64 / self.config.stagnation_after as f64;
            if annealed {
                self.annealed_burst(strength, ratio);
            } else {
                self.directed_burst(strength, ratio);
            }
            if self.value > self.best_value + TOLERANCE {
                self.record_best();
            }
        }
        self.finish(iterations)
    }

    fn finish(self, iterations: usize) -> LocalSearchOutcome {
        LocalSearchOutcome {
            solution: self.best,
            value: self.best_value,
            iterations,
            swaps: self.swaps,
        }
    }

    fn stop_requested(&self) -> bool {
        self.ctx.budget.is_exhausted()
            || self.ctx.monitor.should_stop()
            || self.target.is_some_and(|t| self.value >= t - TOLERANCE)
    }

    fn record_best(&mut self) {
        self.best.clone_from(&self.current);
        self.best_value = self.value;
        self.without_improvement = 0;
        self.ctx.monitor.on_best(self.value);
    }

    fn refresh(&mut self, last_swap: Option<(usize, usize)>) {
        self.objective.evaluate_neighbourhood(
            self.current.as_slice(),
            self.value,
            last_swap,
            &mut self.delta,
        );
        self.ctx
            .budget
            .consume(EvaluationBudget::neighbourhood_cost(self.n));
        self.ctx.monitor.on_evaluations(&*self.ctx.budget);
    }

    fn apply(&mut self, i: usize, j: usize) {
        self.value += self.delta.get(i, j);
        self.current.swap(i, j);
        self.tabu.record_swap(i, j, self.clock);
        self.clock += 1;
        self.swaps += 1;
        self.refresh(Some((i, j)));
    }

    fn draw_tenure(&mut self) -> f64 {
        let fraction = self
            .ctx
            .rng
            .random_range(self.config.min_tabu_tenure..=self.config.max_tabu_tenure);
        fraction * self.n as f64
    }

    fn stagnation_jump(&mut self) -> usize {
        let fraction = self.ctx.rng.random_range(
            self.config.min_stagnation_magnitude..=self.config.max_stagnation_magnitude,
        );
        ((fraction * self.n as f64) as usize).max(2)
    }

    fn random_pair(&mut self) -> (usize, usize) {
        let i = self.ctx.rng.random_range(0..self.n);
        let mut j = self.ctx.rng.random_range(0..self.n - 1);
        if j >= i {
            j += 1;
        }
        (i.min(j), i.max(j))
    }

    /// Best pair that is not tabu, or that would beat the best value.
    fn tabu_candidate(&self, tenure: f64) -> Option<(usize, usize)> {
        let mut chosen: Option<(usize, usize, f64)> = None;
        for (i, j, d) in self.delta.pairs() {
            if chosen.is_some_and(|(_, _, c)| d <= c) {
                continue;
            }
            let aspirates = self.value + d > self.best_value + TOLERANCE;
            if aspirates || !self.tabu.is_tabu(i, j, self.clock, tenure) {
                chosen = Some((i, j, d));
            }
        }
        chosen.map(|(i, j, _)| (i, j))
    }

    fn directed_burst(&mut self, strength: usize, ratio: f64) {
        let directed = self.config.min_directed_perturbation.max((-ratio).exp());
        for _ in 0..strength {
            if self.stop_requested() {
                return;
            }
            let tenure = self.draw_tenure();
            let pick = if self.ctx.rng.random::<f64>() < directed {
                self.tabu_candidate(tenure)
            } else {
                Some(self.random_pair())
            };
            match pick {
                Some((i, j)) => {
                    self.apply(i, j);
                    if self.value > self.best_value + TOLERANCE {
                        return;
                    }
                }
                None => self.clock += 1,
            }
        }
    }

    fn annealed_burst(&mut self, strength: usize, ratio: f64) {
        let min_t = self.config.min_temperature;
        let max_t = min_t + ratio / std::f64::consts::LN_2;
        let steps = strength as f64 * ratio.max(1.0);
        let alpha = (min_t / max_t).powf(1.0 / steps);
        let mut temperature = max_t;
        let mut eligible: Vec<(usize, usize, f64)> = Vec::new();

        for _ in 0..steps as usize {
            if self.stop_requested() {
                return;
            }
            let tenure = self.draw_tenure();
            eligible.clear();
            let mut aspiring = None;
            let (mut max_d, mut min_d) = (f64::NEG_INFINITY, f64::INFINITY);
            for (i, j, d) in self.delta.pairs() {
                if self.value + d > self.best_value + TOLERANCE {
                    aspiring = Some((i, j));
                    break;
                }
                if !self.tabu.is_tabu(i, j, self.clock, tenure) {
                    max_d = max_d.max(d);
                    min_d = min_d.min(d);
                    eligible.push((i, j, d));
                }
            }

            let pick = match aspiring {
                Some(pair) => Some(pair),
                None => self.metropolis_pick(&mut eligible, max_d, min_d, temperature),
            };
            match pick {
                Some((i, j)) => {
                    self.apply(i, j);
                    if self.value > self.best_value + TOLERANCE {
                        return;
                    }
                }
                None => self.clock += 1,
            }
            temperature *= alpha;
        }
    }

    /// First shuffled candidate whose normalized rank passes the
    /// temperature test, else a random candidate.
    fn metropolis_pick(
        &mut self,
        eligible: &mut [(usize, usize, f64)],
        max_d: f64,
        min_d: f64,
        temperature: f64,
    ) -> Option<(usize, usize)> {
        if eligible.is_empty() {
            return None;
        }
        eligible.shuffle(&mut *self.ctx.rng);
        let u: f64 = self.ctx.rng.random();
        let threshold = if u > 0.0 {
            temperature * (1.0 / u).ln()
        } else {
            f64::INFINITY
        };
        let span = max_d - min_d;
        let passed = eligible.iter().find(|&&(_, _, d)| {
            let rank = if span > 0.0 { (max_d - d) / span } else { 0.0 };
            rank < threshold
        });
        let &(i, j, _) = match passed {
            Some(candidate) => candidate,
            None => &eligible[self.ctx.rng.random_range(0..eligible.len())],
        };
        Some((i, j))
    }
}
