//! Memetic population loop.
//!
//! A steady-state memetic algorithm over permutations. Every child produced
//! by crossover is improved by a [`TabuLocalSearch`](crate::tabu::TabuLocalSearch)
//! call before it competes for a place in the population, and every improved
//! solution is offered to a [`ParetoArchive`](crate::archive::ParetoArchive).
//!
//! # Algorithm
//!
//! 1. Seed a random population and improve each member
//! 2. Select two distinct parents by tournament
//! 3. Recombine them (PMX or uniform) and improve the child
//! 4. Replace the worst member with the child, unless the search has
//!    stagnated for `mutation_frequency` iterations
//! 5. On stagnation, chain-mutate a growing share of the population, or
//!    reseed it from the elites once the mutations stop helping
//!
//! With several objectives each local search maximizes a random weighted
//! sum, and member fitness is the mean of the objective vector.
//!
//! # Key Types
//!
//! - [`MemeticRunner`]: executes the loop
//! - [`MemeticConfig`]: loop and local-search parameters
//! - [`MemeticResult`]: best solution, archive, and run statistics
//!
//! # References
//!
//! - Moscato (1989), "On Evolution, Search, Optimization, Genetic Algorithms and
//!   Martial Arts: Towards Memetic Algorithms"
//! - Benlic & Hao (2015), "Memetic search for the quadratic assignment problem",
//!   *Expert Systems with Applications* 42(1), 584-595

mod config;
mod elite;
mod operators;
mod runner;
mod selection;
mod snapshot;

pub use config::{Crossover, MemeticConfig};
pub use elite::{EliteSet, Member};
pub use operators::{chain_length, chain_mutation, pmx_crossover, random_pmx, uniform_crossover};
pub use runner::{MemeticResult, MemeticRunner, StopReason};
pub use selection::{select_parents, tournament};
pub use snapshot::{anytime_value, Snapshot, SnapshotRecorder};
