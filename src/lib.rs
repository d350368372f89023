//! Tabu-guided memetic local search and incremental Pareto archive for
//! permutation problems.
//!
//! Provides two coupled building blocks:
//!
//! - **Memetic search**: a steady-state population loop whose children are
//!   improved by a tabu-guided local search over the pairwise-swap
//!   neighbourhood, with incremental delta evaluation and a shared
//!   evaluation budget.
//! - **Pareto archive**: a region-partitioned tree that keeps the
//!   non-dominated subset of a high-frequency stream of objective vectors.
//!
//! All objectives are **maximized**. Minimization problems such as the QAP
//! are expressed through negated costs (see [`objective::Qap`]).
//!
//! # Architecture
//!
//! Leaf modules first: [`permutation`] and [`budget`] hold the shared data
//! types, [`objective`] the evaluation contract, [`tabu`] the local search,
//! [`archive`] the non-dominated set, and [`memetic`] the loop that ties them
//! together. The crate installs no `tracing` subscriber; runs emit `info!`
//! and `debug!` events for the caller to collect.
//!
//! # Example
//!
//! ```
//! use u_permsearch::memetic::{MemeticConfig, MemeticRunner};
//! use u_permsearch::objective::FnObjective;
//!
//! let objectives: [FnObjective<fn(&[usize]) -> f64>; 2] = [
//!     FnObjective::new(5, |p: &[usize]| p[0] as f64),
//!     FnObjective::new(5, |p: &[usize]| p[4] as f64),
//! ];
//! let config = MemeticConfig::default()
//!     .with_population_size(4)
//!     .with_improvement_depth(20)
//!     .with_seed(1);
//! let result = MemeticRunner::run(&objectives, 5_000, &config).unwrap();
//! assert!(!result.archive.is_empty());
//! ```

pub mod archive;
pub mod budget;
pub mod error;
pub mod memetic;
pub mod monitor;
pub mod objective;
pub mod permutation;
pub mod tabu;

/// Absolute tolerance under which two objective values count as equal.
pub const TOLERANCE: f64 = 1e-7;

pub use archive::{ArchiveEntry, ParetoArchive};
pub use budget::EvaluationBudget;
pub use error::{Result, SearchError};
pub use memetic::{MemeticConfig, MemeticResult, MemeticRunner, StopReason};
pub use monitor::{NoOpMonitor, SearchMonitor, TimeLimitMonitor};
pub use objective::{DeltaMatrix, FnObjective, Objective};
pub use permutation::Permutation;
pub use tabu::{TabuConfig, TabuLocalSearch};
