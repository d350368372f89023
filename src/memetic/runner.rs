//! Memetic population loop execution.
//!
//! [`MemeticRunner`] orchestrates the complete process:
//! seeding → local search → selection → crossover → local search →
//! replacement or mutation → repeat, until the budget, the target, or the
//! deadline stops it.

use super::config::{Crossover, MemeticConfig};
use super::elite::{EliteSet, Member};
use super::operators::{chain_length, chain_mutation, random_pmx, uniform_crossover};
use super::selection::select_parents;
use super::snapshot::{anytime_value, Snapshot, SnapshotRecorder};
use crate::archive::ParetoArchive;
use crate::budget::EvaluationBudget;
use crate::error::{Result, SearchError};
use crate::monitor::SearchMonitor;
use crate::objective::{Objective, WeightedSum};
use crate::permutation::Permutation;
use crate::tabu::{SearchContext, TabuLocalSearch};
use crate::TOLERANCE;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// The evaluation budget is used up.
    BudgetExhausted,
    /// The best fitness reached the configured target.
    TargetReached,
    /// The wall-clock limit elapsed.
    TimeLimit,
}

/// Result of a memetic run.
#[derive(Debug, Clone)]
pub struct MemeticResult {
    /// Best solution by fitness.
    pub best: Permutation,

    /// Fitness of `best`: its objective value, or the mean of its vector
    /// with several objectives.
    pub best_value: f64,

    /// Objective vector of `best`.
    pub best_objectives: Vec<f64>,

    /// Non-dominated set of every locally improved solution.
    pub archive: ParetoArchive,

    /// Evaluation units consumed (may overshoot the budget by the last
    /// charge).
    pub evaluations: u64,

    /// Outer iterations executed after seeding.
    pub iterations: usize,

    /// Anytime snapshots, empty unless `snapshot_every` is set.
    pub snapshots: Vec<Snapshot>,

    /// Why the run ended.
    pub stop_reason: StopReason,
}

impl MemeticResult {
    /// Evaluation-weighted mean of the best fitness over the snapshots.
    pub fn anytime_value(&self) -> Option<f64> {
        anytime_value(&self.snapshots)
    }
}

/// Executes the memetic loop.
///
/// # Usage
///
/// ```
/// use u_permsearch::memetic::{MemeticConfig, MemeticRunner, StopReason};
/// use u_permsearch::objective::FnObjective;
///
/// // Reward larger items at later positions.
/// let objective = FnObjective::new(6, |p: &[usize]| {
///     p.iter().enumerate().map(|(i, &v)| (i * v) as f64).sum()
/// });
/// let config = MemeticConfig::default()
///     .with_population_size(4)
///     .with_improvement_depth(50)
///     .with_target(55.0)
///     .with_seed(3);
///
/// let result = MemeticRunner::run(&[objective], 100_000, &config).unwrap();
/// assert_eq!(result.best.as_slice(), &[0, 1, 2, 3, 4, 5]);
/// assert_eq!(result.stop_reason, StopReason::TargetReached);
/// ```
pub struct MemeticRunner;

impl MemeticRunner {
    /// Runs the memetic search on `objectives` with a budget of
    /// `evaluations` units, seeding the RNG from `config.seed` (or the
    /// operating system).
    ///
    /// # Errors
    /// - [`SearchError::NoObjectives`] for an empty objective list
    /// - [`SearchError::UnsupportedDimensions`] for more than 64 objectives
    /// - [`SearchError::SizeMismatch`] if the objectives disagree on the
    ///   permutation size, or the size is zero
    /// - [`SearchError::InvalidConfig`] if `config` does not validate
    /// - [`SearchError::NonFiniteObjective`] if an objective returns NaN or
    ///   an infinite value
    pub fn run<O: Objective + Sync>(
        objectives: &[O],
        evaluations: u64,
        config: &MemeticConfig,
    ) -> Result<MemeticResult> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::run_with_rng(objectives, evaluations, config, &mut rng)
    }

    /// Runs the memetic search with a caller-supplied RNG. `config.seed` is
    /// ignored.
    ///
    /// # Errors
    /// Same as [`run`](Self::run).
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run_with_rng<O: Objective + Sync, R: Rng>(
        objectives: &[O],
        evaluations: u64,
        config: &MemeticConfig,
        rng: &mut R,
    ) -> Result<MemeticResult> {
        let n = validate_objectives(objectives)?;
        config.validate()?;

        tracing::info!(
            budget = evaluations,
            n,
            objectives = objectives.len(),
            population = config.population_size,
            "memetic run started"
        );

        let mut search = TabuLocalSearch::new(config.tabu.clone())?;
        if let (Some(target), 1) = (config.target, objectives.len()) {
            search = search.with_target(target);
        }

        let mut run = Run {
            objectives,
            config,
            rng,
            search,
            n,
            budget: EvaluationBudget::new(evaluations),
            monitor: RunMonitor::new(config, objectives.len()),
            archive: ParetoArchive::with_leaf_capacity(
                objectives.len(),
                config.archive_leaf_capacity,
            ),
            elites: EliteSet::new(config.elite_capacity),
            population: Vec::with_capacity(config.population_size),
            best: Member {
                solution: Permutation::identity(n),
                objectives: vec![f64::NEG_INFINITY; objectives.len()],
                fitness: f64::NEG_INFINITY,
            },
            iterations: 0,
        };
        run.seed()?;
        let stop_reason = run.evolve()?;

        tracing::info!(
            evaluations = run.budget.used(),
            iterations = run.iterations,
            best = run.best.fitness,
            archived = run.archive.len(),
            ?stop_reason,
            "memetic run finished"
        );

        Ok(MemeticResult {
            best_value: run.best.fitness,
            best_objectives: run.best.objectives,
            best: run.best.solution,
            archive: run.archive,
            evaluations: run.budget.used(),
            iterations: run.iterations,
            snapshots: run.monitor.recorder.into_snapshots(),
            stop_reason,
        })
    }
}

/// Checks the objective list and returns the permutation size.
fn validate_objectives<O: Objective>(objectives: &[O]) -> Result<usize> {
    let first = objectives.first().ok_or(SearchError::NoObjectives)?;
    if objectives.len() > 64 {
        return Err(SearchError::UnsupportedDimensions(objectives.len()));
    }
    let n = first.size();
    if n == 0 {
        return Err(SearchError::SizeMismatch {
            expected: 1,
            found: 0,
        });
    }
    if let Some(other) = objectives.iter().find(|o| o.size() != n) {
        return Err(SearchError::SizeMismatch {
            expected: n,
            found: other.size(),
        });
    }
    Ok(n)
}

/// Deadline, target, and snapshot bookkeeping, polled inside every local
/// search.
struct RunMonitor {
    deadline: Option<Instant>,
    target: Option<f64>,
    recorder: SnapshotRecorder,
    best: f64,
    /// With one objective the local-search value is the fitness, so its
    /// progress counts before the search returns.
    follows_search: bool,
}

impl RunMonitor {
    fn new(config: &MemeticConfig, dimensions: usize) -> Self {
        Self {
            deadline: config
                .time_limit_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
            target: config.target,
            recorder: SnapshotRecorder::new(config.snapshot_every),
            best: f64::NEG_INFINITY,
            follows_search: dimensions == 1,
        }
    }

    fn raise_best(&mut self, value: f64) {
        self.best = self.best.max(value);
    }

    fn target_reached(&self) -> bool {
        self.target.is_some_and(|t| self.best >= t - TOLERANCE)
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

impl SearchMonitor for RunMonitor {
    fn on_evaluations(&mut self, budget: &EvaluationBudget) {
        self.recorder.observe(budget.used(), self.best);
    }

    fn on_best(&mut self, value: f64) {
        if self.follows_search {
            self.raise_best(value);
        }
    }

    fn should_stop(&self) -> bool {
        self.target_reached() || self.deadline_passed()
    }
}

struct Run<'a, O, R> {
    objectives: &'a [O],
    config: &'a MemeticConfig,
    rng: &'a mut R,
    search: TabuLocalSearch,
    n: usize,
    budget: EvaluationBudget,
    monitor: RunMonitor,
    archive: ParetoArchive,
    elites: EliteSet,
    population: Vec<Member>,
    best: Member,
    iterations: usize,
}

impl<O: Objective + Sync, R: Rng> Run<'_, O, R> {
    /// Random initial population, each member improved once. Seeding ends
    /// early once the run has a stop reason.
    fn seed(&mut self) -> Result<()> {
        let seeds: Vec<Permutation> = (0..self.config.population_size)
            .map(|_| Permutation::random(self.n, &mut *self.rng))
            .collect();
        let vectors = evaluate_batch(self.objectives, &seeds, self.config.parallel);
        self.charge(seeds.len() as u64);

        for (solution, objectives) in seeds.into_iter().zip(vectors) {
            let start = member(solution, objectives);
            let improved = self.improve(start.solution.clone(), start.objectives.clone())?;
            self.update_best(&improved);
            self.elites.offer(&improved);
            let kept = if self.population.iter().any(|m| m.solution == improved.solution) {
                start
            } else {
                improved
            };
            self.population.push(kept);
            if self.stop_reason().is_some() {
                break;
            }
        }
        Ok(())
    }

    fn evolve(&mut self) -> Result<StopReason> {
        let mut without_improvement = 0usize;
        let mut mutations = 0usize;

        loop {
            if let Some(reason) = self.stop_reason() {
                return Ok(reason);
            }
            self.iterations += 1;

            let child = self.crossover();
            let objectives = self.evaluate(&child);
            let child = self.improve(child, objectives)?;

            if child.fitness > self.best.fitness + TOLERANCE {
                without_improvement = 0;
                mutations = 0;
            } else {
                without_improvement += 1;
            }

            if without_improvement >= self.config.mutation_frequency {
                if mutations > self.config.mutation_strength_growth {
                    self.reseed_from_elites();
                    mutations = 0;
                } else {
                    self.mutate_population(mutations)?;
                    mutations += 1;
                }
                without_improvement = 0;
                self.update_best(&child);
                self.elites.offer(&child);
            } else {
                self.update_best(&child);
                self.elites.offer(&child);
                self.replace_worst(child);
            }
        }
    }

    fn stop_reason(&self) -> Option<StopReason> {
        if self.monitor.target_reached() {
            Some(StopReason::TargetReached)
        } else if self.budget.is_exhausted() {
            Some(StopReason::BudgetExhausted)
        } else if self.monitor.deadline_passed() {
            Some(StopReason::TimeLimit)
        } else {
            None
        }
    }

    fn crossover(&mut self) -> Permutation {
        let fitness: Vec<f64> = self.population.iter().map(|m| m.fitness).collect();
        let (a, b) = select_parents(&fitness, self.config.tournament_size, &mut *self.rng);
        let (p1, p2) = (&self.population[a].solution, &self.population[b].solution);
        match self.config.crossover {
            Crossover::PartiallyMatched => random_pmx(p1, p2, &mut *self.rng),
            Crossover::Uniform => uniform_crossover(p1, p2, &mut *self.rng),
        }
    }

    /// Full evaluation of one solution, charged one unit.
    fn evaluate(&mut self, solution: &Permutation) -> Vec<f64> {
        let objectives = evaluate_vector(self.objectives, solution);
        self.charge(1);
        objectives
    }

    fn charge(&mut self, units: u64) {
        self.budget.consume(units);
        self.monitor.on_evaluations(&self.budget);
    }

    /// Local search from `solution` on a random scalarization, then archive
    /// insertion of the result.
    fn improve(&mut self, solution: Permutation, objectives: Vec<f64>) -> Result<Member> {
        if objectives.iter().any(|v| !v.is_finite()) {
            return Err(SearchError::NonFiniteObjective);
        }
        let scalar = WeightedSum::new(self.objectives, self.draw_weights());
        let value = scalar.combine(&objectives);

        let mut ctx = SearchContext::new(&mut self.budget, &mut self.monitor, &mut *self.rng);
        let outcome = self.search.search(
            solution,
            value,
            self.config.improvement_depth,
            &scalar,
            &mut ctx,
        );

        let objectives = if self.objectives.len() == 1 {
            vec![outcome.value]
        } else {
            self.evaluate(&outcome.solution)
        };
        self.archive.insert(&outcome.solution, &objectives)?;
        Ok(member(outcome.solution, objectives))
    }

    /// `[1.0]` for one objective, otherwise a uniform draw from the simplex.
    fn draw_weights(&mut self) -> Vec<f64> {
        let d = self.objectives.len();
        if d == 1 {
            return vec![1.0];
        }
        let raw: Vec<f64> = (0..d)
            .map(|_| -(1.0 - self.rng.random::<f64>()).ln())
            .collect();
        let total: f64 = raw.iter().sum();
        if total > 0.0 {
            raw.into_iter().map(|w| w / total).collect()
        } else {
            vec![1.0 / d as f64; d]
        }
    }

    fn update_best(&mut self, candidate: &Member) {
        if candidate.fitness > self.best.fitness {
            self.best = candidate.clone();
            self.monitor.raise_best(candidate.fitness);
            tracing::debug!(
                fitness = candidate.fitness,
                evaluations = self.budget.used(),
                "new best"
            );
        }
    }

    fn replace_worst(&mut self, child: Member) {
        if self.population.iter().any(|m| m.solution == child.solution) {
            return;
        }
        let worst = self
            .population
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.fitness.total_cmp(&b.1.fitness))
            .map(|(i, _)| i);
        if let Some(i) = worst {
            self.population[i] = child;
        }
    }

    /// Chain-mutates a growing share of the population and improves each
    /// mutant.
    fn mutate_population(&mut self, round: usize) -> Result<()> {
        let size = self.population.len();
        let min = self.config.mutation_strength_min;
        let share = min + (1.0 - min) * round as f64 / self.config.mutation_strength_growth as f64;
        let count = ((size as f64 * share).round() as usize).clamp(1, size);
        let length = chain_length(self.config.tabu.jump_magnitude, self.n);
        tracing::debug!(round, count, length, "mutating population");

        let picked = rand::seq::index::sample(&mut *self.rng, size, count);
        for i in picked {
            if self.budget.is_exhausted() {
                break;
            }
            let mut solution = self.population[i].solution.clone();
            chain_mutation(&mut solution, length, &mut *self.rng);
            let objectives = self.evaluate(&solution);
            let mutant = self.improve(solution, objectives)?;
            self.update_best(&mutant);
            self.population[i] = mutant;
        }
        Ok(())
    }

    fn reseed_from_elites(&mut self) {
        let mut elites = self.elites.members().to_vec();
        elites.shuffle(&mut *self.rng);
        tracing::debug!(
            count = elites.len().min(self.population.len()),
            "reseeding population from elites"
        );
        for (slot, elite) in self.population.iter_mut().zip(elites) {
            *slot = elite;
        }
    }
}

fn member(solution: Permutation, objectives: Vec<f64>) -> Member {
    let fitness = objectives.iter().sum::<f64>() / objectives.len() as f64;
    Member {
        solution,
        objectives,
        fitness,
    }
}

fn evaluate_vector<O: Objective>(objectives: &[O], solution: &Permutation) -> Vec<f64> {
    objectives
        .iter()
        .map(|o| o.evaluate(solution.as_slice()))
        .collect()
}

#[cfg(feature = "parallel")]
fn evaluate_batch<O: Objective + Sync>(
    objectives: &[O],
    solutions: &[Permutation],
    parallel: bool,
) -> Vec<Vec<f64>> {
    use rayon::prelude::*;

    if parallel {
        solutions
            .par_iter()
            .map(|s| evaluate_vector(objectives, s))
            .collect()
    } else {
        solutions
            .iter()
            .map(|s| evaluate_vector(objectives, s))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate_batch<O: Objective>(
    objectives: &[O],
    solutions: &[Permutation],
    _parallel: bool,
) -> Vec<Vec<f64>> {
    solutions
        .iter()
        .map(|s| evaluate_vector(objectives, s))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::dominates;
    use crate::objective::fixtures::{random_qap, PLANTED12};
    use crate::objective::{FnObjective, Qap};
    use crate::tabu::{Perturbation, TabuConfig};

    fn weighted_positions(p: &[usize]) -> f64 {
        p.iter().enumerate().map(|(i, &v)| (i * v) as f64).sum()
    }

    fn small_config() -> MemeticConfig {
        MemeticConfig::default()
            .with_population_size(4)
            .with_improvement_depth(100)
            .with_seed(42)
    }

    // ---- Single objective ----

    #[test]
    fn test_planted_qap_reaches_optimum() {
        let qap = Qap::from_qaplib(PLANTED12).unwrap();
        let config = MemeticConfig::default().with_seed(0).with_target(-9552.0);
        let result = MemeticRunner::run(&[qap.clone()], 200_000, &config).unwrap();

        assert_eq!(result.stop_reason, StopReason::TargetReached);
        assert!(qap.cost(result.best.as_slice()) <= 9552);
        assert_eq!(result.best_value, -9552.0);
        assert_eq!(result.best_objectives, vec![-9552.0]);
    }

    #[test]
    fn test_increasing_order_found() {
        let objective = FnObjective::new(8, weighted_positions);
        let result = MemeticRunner::run(&[objective], 50_000, &small_config()).unwrap();
        assert_eq!(result.best, Permutation::identity(8));
        assert_eq!(result.best_value, 140.0);
        assert_eq!(result.stop_reason, StopReason::BudgetExhausted);
    }

    #[test]
    fn test_best_value_matches_solution() {
        let qap = random_qap(10, 4);
        let config = small_config().with_crossover(Crossover::Uniform);
        let result = MemeticRunner::run(&[qap.clone()], 30_000, &config).unwrap();
        assert_eq!(result.best_value, qap.evaluate(result.best.as_slice()));
        assert!(result.iterations > 0);
    }

    #[test]
    fn test_annealed_perturbation_runs() {
        let qap = random_qap(9, 12);
        let config = small_config()
            .with_tabu(TabuConfig::default().with_perturbation(Perturbation::Annealed));
        let result = MemeticRunner::run(&[qap.clone()], 20_000, &config).unwrap();
        assert_eq!(result.best_value, qap.evaluate(result.best.as_slice()));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let qap = random_qap(9, 1);
        let a = MemeticRunner::run(&[qap.clone()], 20_000, &small_config()).unwrap();
        let b = MemeticRunner::run(&[qap], 20_000, &small_config()).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.evaluations, b.evaluations);
        assert_eq!(a.iterations, b.iterations);
    }

    #[test]
    fn test_one_dimensional_archive_holds_best() {
        let qap = random_qap(8, 9);
        let result = MemeticRunner::run(&[qap], 10_000, &small_config()).unwrap();
        let entries = result.archive.result();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].objectives, vec![result.best_value]);
    }

    // ---- Termination ----

    #[test]
    fn test_budget_respected() {
        let qap = random_qap(10, 2);
        let budget = 5_000;
        let result = MemeticRunner::run(&[qap], budget, &small_config()).unwrap();
        assert_eq!(result.stop_reason, StopReason::BudgetExhausted);
        assert!(result.evaluations >= budget);
        // Overshoot is bounded by the largest single charge.
        assert!(result.evaluations < budget + EvaluationBudget::neighbourhood_cost(10));
    }

    #[test]
    fn test_time_limit_stops_run() {
        let qap = random_qap(12, 3);
        let config = small_config().with_time_limit_ms(20);
        let result = MemeticRunner::run(&[qap], u64::MAX, &config).unwrap();
        assert_eq!(result.stop_reason, StopReason::TimeLimit);
    }

    #[test]
    fn test_snapshots_recorded() {
        let qap = random_qap(8, 5);
        let config = small_config().with_snapshot_every(500);
        let result = MemeticRunner::run(&[qap], 10_000, &config).unwrap();

        // Every threshold is recorded, seeding included.
        assert!(result.snapshots.len() >= 19);
        assert!(result.snapshots[0].evaluations < 500 + EvaluationBudget::neighbourhood_cost(8));
        for pair in result.snapshots.windows(2) {
            assert!(pair[1].evaluations > pair[0].evaluations);
            assert!(pair[1].best_value >= pair[0].best_value);
        }
        let anytime = result.anytime_value().unwrap();
        assert!(anytime <= result.best_value);
    }

    fn flat(_: &[usize]) -> f64 {
        1.0
    }

    #[test]
    fn test_target_ends_seeding() {
        let objectives = [FnObjective::new(8, flat), FnObjective::new(8, flat)];
        let config = MemeticConfig::default()
            .with_population_size(10)
            .with_improvement_depth(1)
            .with_target(1.0)
            .with_seed(7);
        let result = MemeticRunner::run(&objectives, 1_000_000, &config).unwrap();

        assert_eq!(result.stop_reason, StopReason::TargetReached);
        assert_eq!(result.iterations, 0);
        // Seed batch, one search (initial scan plus a three-swap burst),
        // then the re-evaluation of its result. The other nine seeds are
        // never searched.
        let one_search = 4 * EvaluationBudget::neighbourhood_cost(8);
        assert_eq!(result.evaluations, 10 + one_search + 1);
    }

    // ---- Multi-objective ----

    #[test]
    fn test_multi_objective_archive_is_non_dominated() {
        let objectives = [random_qap(8, 21), random_qap(8, 22)];
        let config = small_config().with_archive_leaf_capacity(3);
        let result = MemeticRunner::run(&objectives, 30_000, &config).unwrap();

        let entries = result.archive.result();
        assert!(!entries.is_empty());
        for a in &entries {
            for b in &entries {
                assert!(!dominates(&a.objectives, &b.objectives));
            }
            for (k, o) in objectives.iter().enumerate() {
                assert_eq!(a.objectives[k], o.evaluate(a.solution.as_slice()));
            }
        }
        let mean = result.best_objectives.iter().sum::<f64>() / 2.0;
        assert_eq!(result.best_value, mean);
    }

    // ---- Errors ----

    #[test]
    fn test_no_objectives() {
        let objectives: [Qap; 0] = [];
        let err = MemeticRunner::run(&objectives, 100, &small_config()).unwrap_err();
        assert_eq!(err, SearchError::NoObjectives);
    }

    #[test]
    fn test_size_mismatch() {
        let objectives = [random_qap(5, 1), random_qap(6, 1)];
        let err = MemeticRunner::run(&objectives, 100, &small_config()).unwrap_err();
        assert_eq!(
            err,
            SearchError::SizeMismatch {
                expected: 5,
                found: 6
            }
        );
    }

    #[test]
    fn test_invalid_config() {
        let qap = random_qap(5, 1);
        let config = small_config().with_population_size(1);
        assert!(matches!(
            MemeticRunner::run(&[qap], 100, &config),
            Err(SearchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_non_finite_objective() {
        let objective = FnObjective::new(4, |_: &[usize]| f64::NAN);
        assert_eq!(
            MemeticRunner::run(&[objective], 1_000, &small_config()).unwrap_err(),
            SearchError::NonFiniteObjective
        );
    }
}
