//! Quadratic assignment problem.
//!
//! `cost(p) = sum_{i,j} a[i][j] * b[p[i]][p[j]]`, where `a` is indexed by
//! positions and `b` by the items assigned to them. The objective value is
//! the negated cost.
//!
//! Swap deltas use the `O(n)` formula per pair, and after a swap of `(r, s)`
//! every pair disjoint from `{r, s}` is patched in `O(1)`, so a neighbourhood
//! update costs `O(n^2)` instead of `O(n^3)`.
//!
//! # References
//!
//! - Taillard (1991), "Robust taboo search for the quadratic assignment problem",
//!   *Parallel Computing* 17, 443-455
//! - Burkard, Karisch & Rendl (1997), "QAPLIB - A Quadratic Assignment Problem Library"
//! - Knowles & Corne (2003), "Instance generators and test suites for the
//!   multiobjective quadratic assignment problem"

use super::{DeltaMatrix, Objective};
use crate::error::{Result, SearchError};

/// A QAP instance with integer matrices.
///
/// # Examples
///
/// ```
/// use u_permsearch::objective::{Objective, Qap};
///
/// let qap = Qap::from_qaplib("2\n\n0 3\n3 0\n\n0 5\n5 0\n").unwrap();
/// assert_eq!(qap.cost(&[0, 1]), 30);
/// assert_eq!(qap.evaluate(&[1, 0]), -30.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qap {
    n: usize,
    a: Vec<i64>,
    b: Vec<i64>,
}

impl Qap {
    /// Builds an instance from row-major `n x n` matrices.
    pub fn new(n: usize, a: Vec<i64>, b: Vec<i64>) -> Result<Self> {
        for m in [&a, &b] {
            if m.len() != n * n {
                return Err(SearchError::Parse(format!(
                    "matrix has {} entries, expected {}",
                    m.len(),
                    n * n
                )));
            }
        }
        Ok(Self { n, a, b })
    }

    /// Parses the QAPLIB layout: `n`, then matrix `a`, then matrix `b`,
    /// all whitespace separated.
    pub fn from_qaplib(text: &str) -> Result<Self> {
        let mut tokens = text.split_whitespace();
        let n: usize = match tokens.next() {
            Some(t) => t
                .parse()
                .map_err(|_| SearchError::Parse(format!("invalid size `{t}`")))?,
            None => return Err(SearchError::Parse("empty instance".into())),
        };
        let values = tokens.map(parse_entry).collect::<Result<Vec<i64>>>()?;
        if values.len() != 2 * n * n {
            return Err(SearchError::Parse(format!(
                "expected {} matrix entries, found {}",
                2 * n * n,
                values.len()
            )));
        }
        let b = values[n * n..].to_vec();
        let mut a = values;
        a.truncate(n * n);
        Self::new(n, a, b)
    }

    /// Parses a multi-objective mQAP file into one instance per flow matrix.
    ///
    /// The first line is a header. It is followed by the `n x n` distance
    /// matrix and then by one or more `n x n` flow matrices, one row per
    /// line. Blank lines are ignored and `n` is taken from the width of the
    /// first row. Instance `k` has cost `sum flow_k[i][j] * dist[p[i]][p[j]]`.
    pub fn multi_from_str(text: &str) -> Result<Vec<Self>> {
        let rows = text
            .lines()
            .skip(1)
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.split_whitespace().map(parse_entry).collect::<Result<Vec<i64>>>())
            .collect::<Result<Vec<_>>>()?;
        let n = match rows.first() {
            Some(r) => r.len(),
            None => return Err(SearchError::Parse("no matrix rows".into())),
        };
        if rows.iter().any(|r| r.len() != n) {
            return Err(SearchError::Parse(format!("every row must have {n} entries")));
        }
        if rows.len() < 2 * n || rows.len() % n != 0 {
            return Err(SearchError::Parse(format!(
                "{} rows do not form a distance matrix followed by flow matrices",
                rows.len()
            )));
        }
        let mut matrices = rows.chunks(n).map(|chunk| chunk.concat());
        let distances = matrices
            .next()
            .ok_or_else(|| SearchError::Parse("missing distance matrix".into()))?;
        matrices
            .map(|flow| Self::new(n, flow, distances.clone()))
            .collect()
    }

    /// Instance size.
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    fn a(&self, i: usize, j: usize) -> i64 {
        self.a[i * self.n + j]
    }

    #[inline]
    fn b(&self, i: usize, j: usize) -> i64 {
        self.b[i * self.n + j]
    }

    /// Assignment cost of `p` (lower is better).
    pub fn cost(&self, p: &[usize]) -> i64 {
        let n = self.n;
        let mut sum = 0;
        for i in 0..n {
            for j in 0..n {
                sum += self.a(i, j) * self.b(p[i], p[j]);
            }
        }
        sum
    }

    /// Cost change of swapping positions `i` and `j` of `p`.
    fn swap_cost(&self, p: &[usize], i: usize, j: usize) -> i64 {
        let (pi, pj) = (p[i], p[j]);
        let mut d = (self.a(i, i) - self.a(j, j)) * (self.b(pj, pj) - self.b(pi, pi))
            + (self.a(i, j) - self.a(j, i)) * (self.b(pj, pi) - self.b(pi, pj));
        for (k, &pk) in p.iter().enumerate() {
            if k != i && k != j {
                d += (self.a(k, i) - self.a(k, j)) * (self.b(pk, pj) - self.b(pk, pi))
                    + (self.a(i, k) - self.a(j, k)) * (self.b(pj, pk) - self.b(pi, pk));
            }
        }
        d
    }

    /// Change of `swap_cost(i, j)` caused by the swap of `(r, s)` that
    /// produced `p`. Valid only when `{i, j}` and `{r, s}` are disjoint.
    fn swap_cost_shift(&self, p: &[usize], i: usize, j: usize, r: usize, s: usize) -> i64 {
        let (pi, pj, pr, ps) = (p[i], p[j], p[r], p[s]);
        (self.a(r, i) - self.a(r, j) + self.a(s, j) - self.a(s, i))
            * (self.b(ps, pi) - self.b(ps, pj) + self.b(pr, pj) - self.b(pr, pi))
            + (self.a(i, r) - self.a(j, r) + self.a(j, s) - self.a(i, s))
                * (self.b(pi, ps) - self.b(pj, ps) + self.b(pj, pr) - self.b(pi, pr))
    }
}

fn parse_entry(token: &str) -> Result<i64> {
    token
        .parse()
        .map_err(|_| SearchError::Parse(format!("invalid matrix entry `{token}`")))
}

impl Objective for Qap {
    fn size(&self) -> usize {
        self.n
    }

    fn evaluate(&self, solution: &[usize]) -> f64 {
        -(self.cost(solution) as f64)
    }

    fn evaluate_neighbourhood(
        &self,
        solution: &[usize],
        _value: f64,
        last_swap: Option<(usize, usize)>,
        delta: &mut DeltaMatrix,
    ) {
        let n = self.n;
        match last_swap {
            Some((r, s)) if r != s => {
                for i in 0..n {
                    for j in (i + 1)..n {
                        if i == r || i == s || j == r || j == s {
                            delta.set(i, j, -(self.swap_cost(solution, i, j) as f64));
                        } else {
                            let shift = self.swap_cost_shift(solution, i, j, r, s);
                            delta.add(i, j, -(shift as f64));
                        }
                    }
                }
            }
            _ => {
                for i in 0..n {
                    for j in (i + 1)..n {
                        delta.set(i, j, -(self.swap_cost(solution, i, j) as f64));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Twelve-location instance whose optimum `[6,4,11,1,0,2,8,10,9,5,7,3]`
    /// costs 9552.
    pub const PLANTED12: &str = "12

  4 90 10 23 43  0  0  0  0  0  0  0
 90  4  0  0  0 88  0  0  0  0  0  0
 10  0  4  0  0  0 26 16  0  0  0  0
 23  0  0  4  0  0  0  0  0  0  0  0
 43  0  0  0  4  0  0  0  0  0  0  0
  0 88  0  0  0  4  0  0  0  0  0  0
  0  0 26  0  0  0  4  0  0  0  0  0
  0  0 16  0  0  0  0  4 96  0  0  0
  0  0  0  0  0  0  0 96  4  0 29  0
  0  0  0  0  0  0  0  0  0  4  0 37
  0  0  0  0  0  0  0  0 29  0  4  0
  0  0  0  0  0  0  0  0  0 37  0  4

199 36 54 26 59 72  0 34 79 17 46 95
 36 199 73 35 90 58  0 78 35 44 79 36
 54 73 199 21  0 97 58 66 69 61 54 63
 26 35 21 199 93  0 46 40 37 48 68 85
 59 90  0 93 199 64  0 29 76 16  5 76
 72 58 97  0 64 199 96 55 38 54  0 34
  0  0 58 46  0 96 199 83 35 11 56  0
 34 78 66 40 29 55 83 199 44  0 15 80
 79 35 69 37 76 38 35 44 199 64 39  0
 17 44 61 48 16 54 11  0 64 199  0 86
 46 79 54 68  5  0 56 15 39  0 199  0
 95 36 63 85 76 34  0 80  0 86  0 199
";

    pub const PLANTED12_OPTIMUM: [usize; 12] = [6, 4, 11, 1, 0, 2, 8, 10, 9, 5, 7, 3];

    pub fn random_qap(n: usize, seed: u64) -> super::Qap {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(seed);
        let a = (0..n * n).map(|_| rng.random_range(0..20)).collect();
        let b = (0..n * n).map(|_| rng.random_range(0..20)).collect();
        super::Qap::new(n, a, b).expect("square matrices")
    }
}
