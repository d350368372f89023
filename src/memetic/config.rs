//! Memetic loop configuration.
//!
//! [`MemeticConfig`] holds every parameter of the population loop and embeds
//! the [`TabuConfig`] used for each local-search call.

use crate::archive::DEFAULT_LEAF_CAPACITY;
use crate::error::{Result, SearchError};
use crate::tabu::{Perturbation, TabuConfig};

/// Crossover operator applied to the two selected parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crossover {
    /// Keeps the positions where the parents agree and fills the rest from
    /// either parent at random.
    Uniform,

    /// Partially mapped crossover over a random segment.
    #[default]
    PartiallyMatched,
}

/// Configuration of the memetic population loop.
///
/// # Defaults
///
/// ```
/// use u_permsearch::memetic::{Crossover, MemeticConfig};
///
/// let config = MemeticConfig::default();
/// assert_eq!(config.population_size, 10);
/// assert_eq!(config.crossover, Crossover::PartiallyMatched);
/// assert!(config.validate().is_ok());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_permsearch::memetic::{Crossover, MemeticConfig};
///
/// let config = MemeticConfig::default()
///     .with_population_size(20)
///     .with_crossover(Crossover::Uniform)
///     .with_target(-9552.0)
///     .with_seed(7);
/// assert_eq!(config.seed, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemeticConfig {
    /// Number of members in the population.
    pub population_size: usize,

    /// Iteration limit of every local-search call.
    pub improvement_depth: usize,

    /// Number of draws per tournament (with replacement).
    pub tournament_size: usize,

    /// Crossover operator.
    pub crossover: Crossover,

    /// Iterations without improvement before a mutation burst.
    pub mutation_frequency: usize,

    /// Fraction of the population mutated by the first burst.
    pub mutation_strength_min: f64,

    /// Bursts before the mutated fraction reaches the whole population and
    /// the next stagnation triggers a reseed from the elites.
    pub mutation_strength_growth: usize,

    /// Maximum number of elites kept for reseeding.
    pub elite_capacity: usize,

    /// Leaf capacity of the Pareto archive.
    pub archive_leaf_capacity: usize,

    /// Stop once the best fitness reaches this value.
    pub target: Option<f64>,

    /// Record a snapshot every time this many further units are consumed.
    pub snapshot_every: Option<u64>,

    /// Optional wall-clock limit in milliseconds.
    pub time_limit_ms: Option<u64>,

    /// Random seed. `None` seeds from the operating system.
    pub seed: Option<u64>,

    /// Evaluates the initial population in parallel (needs the `parallel`
    /// feature).
    pub parallel: bool,

    /// Local-search configuration.
    pub tabu: TabuConfig,
}

impl Default for MemeticConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            improvement_depth: 10_000,
            tournament_size: 4,
            crossover: Crossover::PartiallyMatched,
            mutation_frequency: 5,
            mutation_strength_min: 0.5,
            mutation_strength_growth: 5,
            elite_capacity: 100,
            archive_leaf_capacity: DEFAULT_LEAF_CAPACITY,
            target: None,
            snapshot_every: None,
            time_limit_ms: None,
            seed: None,
            parallel: false,
            tabu: TabuConfig::default(),
        }
    }
}

impl MemeticConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the local-search iteration limit.
    pub fn with_improvement_depth(mut self, depth: usize) -> Self {
        self.improvement_depth = depth;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the crossover operator.
    pub fn with_crossover(mut self, crossover: Crossover) -> Self {
        self.crossover = crossover;
        self
    }

    /// Sets the mutation schedule.
    pub fn with_mutation(mut self, frequency: usize, strength_min: f64, growth: usize) -> Self {
        self.mutation_frequency = frequency;
        self.mutation_strength_min = strength_min.clamp(0.0, 1.0);
        self.mutation_strength_growth = growth;
        self
    }

    /// Sets the elite capacity.
    pub fn with_elite_capacity(mut self, capacity: usize) -> Self {
        self.elite_capacity = capacity;
        self
    }

    /// Sets the Pareto archive leaf capacity.
    pub fn with_archive_leaf_capacity(mut self, capacity: usize) -> Self {
        self.archive_leaf_capacity = capacity;
        self
    }

    /// Stops the run once the best fitness reaches `target`.
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    /// Records a snapshot every `units` evaluation units.
    pub fn with_snapshot_every(mut self, units: u64) -> Self {
        self.snapshot_every = Some(units);
        self
    }

    /// Sets the wall-clock limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel evaluation of the initial population.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Replaces the local-search configuration.
    pub fn with_tabu(mut self, tabu: TabuConfig) -> Self {
        self.tabu = tabu;
        self
    }

    /// Parameters tuned head-to-head on QAPLIB instances.
    ///
    /// - Population 6, tournament 6, PMX crossover
    /// - Improvement depth 719
    /// - Mutation every 12 stagnating iterations, strength 0.6967, growth 13
    /// - Normal perturbation with jump 0.3327, directed floor 0.0674
    pub fn tuned() -> Self {
        Self {
            population_size: 6,
            improvement_depth: 719,
            tournament_size: 6,
            crossover: Crossover::PartiallyMatched,
            mutation_frequency: 12,
            mutation_strength_min: 0.6967,
            mutation_strength_growth: 13,
            tabu: TabuConfig::default()
                .with_perturbation(Perturbation::Normal)
                .with_jump_magnitude(0.3327)
                .with_stagnation(322, 1.6775, 9.7211)
                .with_tabu_tenure(0.3089, 1.8264)
                .with_min_directed_perturbation(0.0674),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(SearchError::InvalidConfig(
                "population_size must be at least 2".into(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(SearchError::InvalidConfig(
                "tournament_size must be at least 1".into(),
            ));
        }
        if self.mutation_frequency == 0 {
            return Err(SearchError::InvalidConfig(
                "mutation_frequency must be at least 1".into(),
            ));
        }
        if self.mutation_strength_growth == 0 {
            return Err(SearchError::InvalidConfig(
                "mutation_strength_growth must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_strength_min) {
            return Err(SearchError::InvalidConfig(
                "mutation_strength_min must be in [0, 1]".into(),
            ));
        }
        if self.elite_capacity == 0 {
            return Err(SearchError::InvalidConfig(
                "elite_capacity must be at least 1".into(),
            ));
        }
        if self.archive_leaf_capacity == 0 {
            return Err(SearchError::InvalidConfig(
                "archive_leaf_capacity must be at least 1".into(),
            ));
        }
        if self.snapshot_every == Some(0) {
            return Err(SearchError::InvalidConfig(
                "snapshot_every must be positive or None".into(),
            ));
        }
        if self.time_limit_ms == Some(0) {
            return Err(SearchError::InvalidConfig(
                "time_limit_ms must be positive or None".into(),
            ));
        }
        if self.target.is_some_and(|t| !t.is_finite()) {
            return Err(SearchError::InvalidConfig("target must be finite".into()));
        }
        self.tabu.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MemeticConfig::default();
        assert_eq!(config.population_size, 10);
        assert_eq!(config.improvement_depth, 10_000);
        assert_eq!(config.tournament_size, 4);
        assert_eq!(config.mutation_frequency, 5);
        assert!((config.mutation_strength_min - 0.5).abs() < 1e-10);
        assert_eq!(config.mutation_strength_growth, 5);
        assert_eq!(config.elite_capacity, 100);
        assert_eq!(config.archive_leaf_capacity, 20);
        assert!(config.target.is_none());
        assert!(config.seed.is_none());
        assert!(!config.parallel);
    }

    #[test]
    fn test_builder_chain() {
        let config = MemeticConfig::default()
            .with_population_size(8)
            .with_improvement_depth(50)
            .with_tournament_size(2)
            .with_mutation(3, 1.5, 4)
            .with_snapshot_every(100)
            .with_time_limit_ms(250)
            .with_parallel(true);
        assert_eq!(config.population_size, 8);
        assert_eq!(config.improvement_depth, 50);
        assert_eq!(config.tournament_size, 2);
        assert_eq!(config.mutation_frequency, 3);
        assert!((config.mutation_strength_min - 1.0).abs() < 1e-10);
        assert_eq!(config.snapshot_every, Some(100));
        assert_eq!(config.time_limit_ms, Some(250));
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tuned_preset_is_valid() {
        let config = MemeticConfig::tuned();
        assert_eq!(config.population_size, 6);
        assert_eq!(config.improvement_depth, 719);
        assert_eq!(config.tabu.stagnation_after, 322);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects() {
        let invalid = [
            MemeticConfig::default().with_population_size(1),
            MemeticConfig::default().with_tournament_size(0),
            MemeticConfig::default().with_mutation(0, 0.5, 5),
            MemeticConfig::default().with_mutation(5, 0.5, 0),
            MemeticConfig::default().with_elite_capacity(0),
            MemeticConfig::default().with_archive_leaf_capacity(0),
            MemeticConfig::default().with_snapshot_every(0),
            MemeticConfig::default().with_time_limit_ms(0),
            MemeticConfig::default().with_target(f64::NAN),
            MemeticConfig::default().with_tabu(TabuConfig::default().with_tabu_tenure(2.0, 1.0)),
        ];
        for config in invalid {
            assert!(
                matches!(config.validate(), Err(SearchError::InvalidConfig(_))),
                "{config:?}"
            );
        }
    }
}
