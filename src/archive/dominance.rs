//! Pareto dominance, region masks, and pivot selection.
//!
//! All objectives are **maximized**: larger values are better.

/// Outcome of a pairwise Pareto comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Both vectors are equal.
    Equal,
    /// Neither dominates the other.
    Neither,
}

/// Compares two objective vectors for Pareto dominance (maximization).
///
/// # Examples
///
/// ```
/// use u_permsearch::archive::{dominance_cmp, Dominance};
///
/// assert_eq!(dominance_cmp(&[3.0, 2.0], &[2.0, 2.0]), Dominance::Left);
/// assert_eq!(dominance_cmp(&[3.0, 1.0], &[2.0, 2.0]), Dominance::Neither);
/// assert_eq!(dominance_cmp(&[1.0, 1.0], &[1.0, 1.0]), Dominance::Equal);
/// ```
pub fn dominance_cmp(a: &[f64], b: &[f64]) -> Dominance {
    let mut a_better_in_some = false;
    let mut b_better_in_some = false;

    for (&va, &vb) in a.iter().zip(b.iter()) {
        if va > vb {
            a_better_in_some = true;
        } else if vb > va {
            b_better_in_some = true;
        }
    }

    match (a_better_in_some, b_better_in_some) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        (false, false) => Dominance::Equal,
        (true, true) => Dominance::Neither,
    }
}

/// `a` is at least as good as `b` everywhere and better somewhere.
#[inline]
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    dominance_cmp(a, b) == Dominance::Left
}

/// `a` is at least as good as `b` everywhere.
#[inline]
pub fn weakly_dominates(a: &[f64], b: &[f64]) -> bool {
    a.iter().zip(b).all(|(x, y)| x >= y)
}

/// Region of `point` relative to `reference`: bit `k` is set iff
/// `point[k] <= reference[k]`.
///
/// A point in region `m` can only be weakly dominated by points in regions
/// that are subsets of `m`, which is what lets the archive skip whole
/// subtrees.
///
/// # Examples
///
/// ```
/// use u_permsearch::archive::region_mask;
///
/// assert_eq!(region_mask(&[-4.0, -4.0], &[-2.0, -5.0]), 0b10);
/// assert_eq!(region_mask(&[-4.0, -4.0], &[-7.0, -2.0]), 0b01);
/// ```
#[inline]
pub fn region_mask(reference: &[f64], point: &[f64]) -> u64 {
    point
        .iter()
        .zip(reference)
        .enumerate()
        .fold(0, |mask, (k, (p, r))| if p <= r { mask | (1 << k) } else { mask })
}

/// `max - min` over the components of `v`.
fn span(v: &[f64]) -> f64 {
    let (lo, hi) = v
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    hi - lo
}

/// Chooses a split pivot among `items`.
///
/// Removes every item dominated by another one, and every item equal to an
/// earlier one, then moves the remaining item with the smallest span to
/// index 0 (first wins on ties). Returns the removed items.
///
/// # Examples
///
/// ```
/// use u_permsearch::archive::select_pivot;
///
/// let mut points = vec![vec![1.0, 5.0], vec![0.0, 4.0], vec![3.0, 3.0]];
/// let removed = select_pivot(&mut points, |p| p.as_slice());
/// assert_eq!(removed, vec![vec![0.0, 4.0]]);
/// assert_eq!(points[0], vec![3.0, 3.0]);
/// ```
pub fn select_pivot<T, F>(items: &mut Vec<T>, objectives: F) -> Vec<T>
where
    F: Fn(&T) -> &[f64],
{
    let redundant: Vec<bool> = (0..items.len())
        .map(|i| {
            let vi = objectives(&items[i]);
            items.iter().enumerate().any(|(j, other)| {
                j != i
                    && match dominance_cmp(objectives(other), vi) {
                        Dominance::Left => true,
                        Dominance::Equal => j < i,
                        _ => false,
                    }
            })
        })
        .collect();

    let mut removed = Vec::new();
    let mut kept = Vec::with_capacity(items.len());
    for (item, drop) in items.drain(..).zip(redundant) {
        if drop {
            removed.push(item);
        } else {
            kept.push(item);
        }
    }
    *items = kept;

    let mut pivot = 0;
    for (k, item) in items.iter().enumerate().skip(1) {
        if span(objectives(item)) < span(objectives(&items[pivot])) {
            pivot = k;
        }
    }
    if !items.is_empty() {
        items.swap(0, pivot);
    }
    removed
}
