//! Permutation solutions.
//!
//! A [`Permutation`] is a bijection of `0..n`. It can only be built through a
//! validating constructor or through the crate's own operators, which preserve
//! the bijection by construction, so every value of the type is well formed.

use crate::error::{Result, SearchError};
use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::Index;

/// A bijective assignment of `n` items to `n` positions.
///
/// # Examples
///
/// ```
/// use u_permsearch::Permutation;
///
/// let p = Permutation::try_from(vec![2, 0, 1]).unwrap();
/// assert_eq!(p.as_slice(), &[2, 0, 1]);
///
/// assert!(Permutation::try_from(vec![0, 0, 1]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<usize>", into = "Vec<usize>"))]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// The identity permutation `[0, 1, ..., n-1]`.
    pub fn identity(n: usize) -> Self {
        Self((0..n).collect())
    }

    /// A uniformly random permutation of size `n`.
    pub fn random<R: Rng>(n: usize, rng: &mut R) -> Self {
        let mut values: Vec<usize> = (0..n).collect();
        values.shuffle(rng);
        Self(values)
    }

    /// Wraps a vector the caller has already proven to be a bijection.
    pub(crate) fn from_vec_unchecked(values: Vec<usize>) -> Self {
        debug_assert!(is_permutation(&values), "operator broke the bijection");
        Self(values)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty permutation.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Underlying index slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Consumes the permutation and returns its values.
    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }

    /// Exchanges the values at positions `i` and `j`.
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    pub fn swap(&mut self, i: usize, j: usize) {
        self.0.swap(i, j);
    }
}

impl TryFrom<Vec<usize>> for Permutation {
    type Error = SearchError;

    fn try_from(values: Vec<usize>) -> Result<Self> {
        validate(&values)?;
        Ok(Self(values))
    }
}

impl From<Permutation> for Vec<usize> {
    fn from(p: Permutation) -> Self {
        p.0
    }
}

impl AsRef<[usize]> for Permutation {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

impl Index<usize> for Permutation {
    type Output = usize;

    fn index(&self, i: usize) -> &usize {
        &self.0[i]
    }
}

/// Returns `true` if `values` is a bijection of `0..values.len()`.
pub fn is_permutation(values: &[usize]) -> bool {
    validate(values).is_ok()
}

fn validate(values: &[usize]) -> Result<()> {
    let n = values.len();
    let mut seen = vec![false; n];
    for &v in values {
        if v >= n {
            return Err(SearchError::NotAPermutation {
                len: n,
                reason: format!("value {v} out of range"),
            });
        }
        if seen[v] {
            return Err(SearchError::NotAPermutation {
                len: n,
                reason: format!("value {v} repeated"),
            });
        }
        seen[v] = true;
    }
    Ok(())
}
