//! Tabu local search configuration.

use crate::error::{Result, SearchError};

/// Diversification applied when steepest ascent reaches a local optimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Perturbation {
    /// Stop at the first local optimum (pure hill climbing).
    Disabled,

    /// Bursts of forced swaps, each chosen either as the best non-tabu pair
    /// or uniformly at random. The burst length grows while the search keeps
    /// falling back into the same optimum.
    #[default]
    Normal,

    /// Forced swaps chosen among non-tabu pairs by a short geometric
    /// temperature ramp over their normalized delta rank.
    Annealed,
}

/// Configuration of [`TabuLocalSearch`](super::TabuLocalSearch).
///
/// Magnitudes and tenures are fractions of the permutation size `n`.
///
/// # Examples
///
/// ```
/// use u_permsearch::tabu::{Perturbation, TabuConfig};
///
/// let config = TabuConfig::default()
///     .with_perturbation(Perturbation::Annealed)
///     .with_tabu_tenure(0.5, 1.5);
/// assert_eq!(config.stagnation_after, 250);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabuConfig {
    /// Diversification strategy.
    pub perturbation: Perturbation,

    /// Base burst length as a fraction of `n` (at least 2 swaps).
    pub jump_magnitude: f64,

    /// Escapes without improving the best before a stagnation jump.
    pub stagnation_after: usize,

    /// Lower bound of the stagnation jump, as a fraction of `n`.
    pub min_stagnation_magnitude: f64,

    /// Upper bound of the stagnation jump, as a fraction of `n`.
    pub max_stagnation_magnitude: f64,

    /// Lower bound of the tabu tenure, as a fraction of `n`.
    pub min_tabu_tenure: f64,

    /// Upper bound of the tabu tenure, as a fraction of `n`.
    pub max_tabu_tenure: f64,

    /// Floor of the probability of a tabu-guided (instead of random) swap.
    pub min_directed_perturbation: f64,

    /// Final temperature of the annealed ramp.
    pub min_temperature: f64,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            perturbation: Perturbation::Normal,
            jump_magnitude: 0.15,
            stagnation_after: 250,
            min_stagnation_magnitude: 0.2,
            max_stagnation_magnitude: 0.4,
            min_tabu_tenure: 0.9,
            max_tabu_tenure: 1.1,
            min_directed_perturbation: 0.75,
            min_temperature: 0.1,
        }
    }
}

impl TabuConfig {
    /// Sets the diversification strategy.
    pub fn with_perturbation(mut self, perturbation: Perturbation) -> Self {
        self.perturbation = perturbation;
        self
    }

    /// Sets the base burst length fraction.
    pub fn with_jump_magnitude(mut self, magnitude: f64) -> Self {
        self.jump_magnitude = magnitude.max(0.0);
        self
    }

    /// Sets the stagnation window and the jump range drawn after it.
    pub fn with_stagnation(mut self, after: usize, min_magnitude: f64, max_magnitude: f64) -> Self {
        self.stagnation_after = after;
        self.min_stagnation_magnitude = min_magnitude.max(0.0);
        self.max_stagnation_magnitude = max_magnitude.max(0.0);
        self
    }

    /// Sets the tenure range.
    pub fn with_tabu_tenure(mut self, min: f64, max: f64) -> Self {
        self.min_tabu_tenure = min.max(0.0);
        self.max_tabu_tenure = max.max(0.0);
        self
    }

    /// Sets the floor probability of tabu-guided swaps.
    pub fn with_min_directed_perturbation(mut self, p: f64) -> Self {
        self.min_directed_perturbation = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the final annealing temperature.
    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.stagnation_after == 0 {
            return Err(SearchError::InvalidConfig(
                "stagnation_after must be at least 1".into(),
            ));
        }
        if self.min_stagnation_magnitude > self.max_stagnation_magnitude {
            return Err(SearchError::InvalidConfig(
                "min_stagnation_magnitude exceeds max_stagnation_magnitude".into(),
            ));
        }
        if self.min_tabu_tenure > self.max_tabu_tenure {
            return Err(SearchError::InvalidConfig(
                "min_tabu_tenure exceeds max_tabu_tenure".into(),
            ));
        }
        if !(self.min_temperature > 0.0 && self.min_temperature.is_finite()) {
            return Err(SearchError::InvalidConfig(
                "min_temperature must be positive".into(),
            ));
        }
        if !self.jump_magnitude.is_finite() {
            return Err(SearchError::InvalidConfig(
                "jump_magnitude must be finite".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TabuConfig::default();
        assert_eq!(config.perturbation, Perturbation::Normal);
        assert!((config.jump_magnitude - 0.15).abs() < 1e-12);
        assert_eq!(config.stagnation_after, 250);
        assert!((config.min_stagnation_magnitude - 0.2).abs() < 1e-12);
        assert!((config.max_stagnation_magnitude - 0.4).abs() < 1e-12);
        assert!((config.min_tabu_tenure - 0.9).abs() < 1e-12);
        assert!((config.max_tabu_tenure - 1.1).abs() < 1e-12);
        assert!((config.min_directed_perturbation - 0.75).abs() < 1e-12);
        assert!((config.min_temperature - 0.1).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = TabuConfig::default()
            .with_perturbation(Perturbation::Disabled)
            .with_jump_magnitude(0.3)
            .with_stagnation(100, 0.5, 0.9)
            .with_tabu_tenure(0.3, 1.8)
            .with_min_directed_perturbation(1.7)
            .with_min_temperature(0.5);

        assert_eq!(config.perturbation, Perturbation::Disabled);
        assert!((config.jump_magnitude - 0.3).abs() < 1e-12);
        assert_eq!(config.stagnation_after, 100);
        assert!((config.max_stagnation_magnitude - 0.9).abs() < 1e-12);
        assert!((config.min_tabu_tenure - 0.3).abs() < 1e-12);
        assert!((config.min_directed_perturbation - 1.0).abs() < 1e-12);
        assert!((config.min_temperature - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_validate_inverted_ranges() {
        assert!(TabuConfig::default()
            .with_tabu_tenure(2.0, 1.0)
            .validate()
            .is_err());
        assert!(TabuConfig::default()
            .with_stagnation(10, 0.5, 0.1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_zero_window() {
        assert!(TabuConfig::default()
            .with_stagnation(0, 0.2, 0.4)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_temperature() {
        assert!(TabuConfig::default()
            .with_min_temperature(0.0)
            .validate()
            .is_err());
    }
}
