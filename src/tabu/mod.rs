//! Tabu-guided local search.
//!
//! A steepest-ascent climber over the pairwise-swap neighbourhood that
//! escapes local optima with bursts of forced swaps. Recently swapped pairs
//! are tabu for a randomized tenure unless swapping them would beat the best
//! value found so far.
//!
//! # Key Types
//!
//! - [`TabuLocalSearch`]: the search itself
//! - [`TabuConfig`] / [`Perturbation`]: diversification parameters
//! - [`SearchContext`]: budget, monitor, and RNG handed to each call
//! - [`TabuState`]: per-pair swap memory
//!
//! # References
//!
//! - Glover, F. (1989). "Tabu Search, Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! - Taillard, E. (1991). "Robust taboo search for the quadratic assignment problem",
//!   *Parallel Computing* 17, 443-455.

mod config;
mod search;
mod state;

pub use config::{Perturbation, TabuConfig};
pub use search::{LocalSearchOutcome, SearchContext, TabuLocalSearch};
pub use state::TabuState;
