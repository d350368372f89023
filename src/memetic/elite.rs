//! Bounded set of the best distinct members.

use crate::permutation::Permutation;

/// An evaluated population member.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// The solution.
    pub solution: Permutation,
    /// Its objective vector.
    pub objectives: Vec<f64>,
    /// Scalar fitness (mean of `objectives`).
    pub fitness: f64,
}

/// Best distinct members seen so far, used to reseed a stagnating
/// population.
///
/// Holds at most `capacity` members, no two with the same solution. When
/// full, a fitter newcomer replaces the lowest-fitness member.
#[derive(Debug, Clone)]
pub struct EliteSet {
    capacity: usize,
    members: Vec<Member>,
}

impl EliteSet {
    /// Creates an empty set.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "elite capacity must be at least 1");
        Self {
            capacity,
            members: Vec::with_capacity(capacity.min(1024)),
        }
    }

    /// Offers a member. Returns `true` if it was added.
    pub fn offer(&mut self, member: &Member) -> bool {
        if self.members.iter().any(|m| m.solution == member.solution) {
            return false;
        }
        if self.members.len() < self.capacity {
            self.members.push(member.clone());
            return true;
        }
        let Some((worst, _)) = self
            .members
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.fitness.total_cmp(&b.1.fitness))
        else {
            return false;
        };
        if member.fitness > self.members[worst].fitness {
            self.members[worst] = member.clone();
            true
        } else {
            false
        }
    }

    /// Current members, in insertion order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(first: usize, fitness: f64) -> Member {
        let mut values: Vec<usize> = (0..4).collect();
        values.swap(0, first);
        Member {
            solution: Permutation::try_from(values).unwrap(),
            objectives: vec![fitness],
            fitness,
        }
    }

    #[test]
    fn test_fills_up_to_capacity() {
        let mut elites = EliteSet::new(3);
        assert!(elites.offer(&member(0, 1.0)));
        assert!(elites.offer(&member(1, 2.0)));
        assert!(elites.offer(&member(2, 0.5)));
        assert_eq!(elites.len(), 3);
    }

    #[test]
    fn test_deduplicates_by_solution() {
        let mut elites = EliteSet::new(3);
        assert!(elites.offer(&member(1, 1.0)));
        assert!(!elites.offer(&member(1, 9.0)));
        assert_eq!(elites.len(), 1);
        assert_eq!(elites.members()[0].fitness, 1.0);
    }

    #[test]
    fn test_evicts_lowest_fitness() {
        let mut elites = EliteSet::new(2);
        elites.offer(&member(0, 1.0));
        elites.offer(&member(1, 3.0));
        assert!(elites.offer(&member(2, 2.0)));
        let mut fitness: Vec<f64> = elites.members().iter().map(|m| m.fitness).collect();
        fitness.sort_by(f64::total_cmp);
        assert_eq!(fitness, vec![2.0, 3.0]);

        assert!(!elites.offer(&member(3, 1.5)));
        assert_eq!(elites.len(), 2);
    }
}
