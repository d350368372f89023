//! Tournament parent selection.
//!
//! Fitness is **maximized**: the highest value wins a tournament.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use rand::Rng;

/// Tournament selection: draw `k` indices with replacement and return the
/// one with the highest fitness (the first drawn wins ties).
///
/// When `exclude` is set, that index is never drawn.
///
/// # Complexity
/// O(k) per selection
///
/// # Panics
/// Panics if no index can be drawn.
pub fn tournament<R: Rng>(fitness: &[f64], k: usize, exclude: Option<usize>, rng: &mut R) -> usize {
    let pool = fitness.len() - usize::from(exclude.is_some_and(|e| e < fitness.len()));
    assert!(pool > 0, "cannot select from an empty population");

    let mut draw = || {
        let idx = rng.random_range(0..pool);
        match exclude {
            Some(e) if idx >= e => idx + 1,
            _ => idx,
        }
    };

    let mut best_idx = draw();
    for _ in 1..k.max(1) {
        let idx = draw();
        if fitness[idx] > fitness[best_idx] {
            best_idx = idx;
        }
    }
    best_idx
}

/// Two distinct parents by two tournaments; the second excludes the first
/// winner.
///
/// # Panics
/// Panics if `fitness` has fewer than two entries.
pub fn select_parents<R: Rng>(fitness: &[f64], k: usize, rng: &mut R) -> (usize, usize) {
    assert!(fitness.len() >= 2, "two parents need at least two members");
    let first = tournament(fitness, k, None, rng);
    let second = tournament(fitness, k, Some(first), rng);
    (first, second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_tournament_prefers_fitter() {
        let mut rng = StdRng::seed_from_u64(42);
        let fitness = [1.0, 10.0, 2.0, 3.0, 0.5];
        let mut wins = [0usize; 5];
        for _ in 0..1000 {
            wins[tournament(&fitness, 3, None, &mut rng)] += 1;
        }
        assert!(wins[1] > wins[0]);
        assert!(wins[1] > wins[4]);
    }

    #[test]
    fn test_full_pressure_picks_best() {
        let mut rng = StdRng::seed_from_u64(5);
        let fitness = [1.0, 4.0, 2.0];
        // 64 draws miss index 1 with probability (2/3)^64.
        assert_eq!(tournament(&fitness, 64, None, &mut rng), 1);
    }

    #[test]
    fn test_exclude_is_never_drawn() {
        let mut rng = StdRng::seed_from_u64(9);
        let fitness = [5.0, 1.0, 2.0, 3.0];
        for _ in 0..500 {
            assert_ne!(tournament(&fitness, 2, Some(0), &mut rng), 0);
            assert_ne!(tournament(&fitness, 2, Some(3), &mut rng), 3);
        }
    }

    #[test]
    fn test_parents_are_distinct() {
        let mut rng = StdRng::seed_from_u64(1);
        let fitness = [3.0, 3.0];
        for _ in 0..200 {
            let (a, b) = select_parents(&fitness, 4, &mut rng);
            assert_ne!(a, b);
        }
    }

    #[test]
    #[should_panic(expected = "empty population")]
    fn test_empty_panics() {
        let mut rng = StdRng::seed_from_u64(1);
        tournament(&[], 2, None, &mut rng);
    }
}
