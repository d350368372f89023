//! Anytime-performance snapshots.

/// Best fitness known after `evaluations` units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Best fitness at the time of the snapshot.
    pub best_value: f64,
    /// Evaluation units consumed so far.
    pub evaluations: u64,
}

/// Records a snapshot each time another `every` units have been consumed.
#[derive(Debug, Clone)]
pub struct SnapshotRecorder {
    every: Option<u64>,
    next_at: u64,
    snapshots: Vec<Snapshot>,
}

impl SnapshotRecorder {
    /// `None` disables recording.
    pub fn new(every: Option<u64>) -> Self {
        Self {
            every,
            next_at: every.unwrap_or(u64::MAX),
            snapshots: Vec::new(),
        }
    }

    /// Observes the current usage. Records one snapshot per crossed
    /// threshold. A threshold crossed before any finite `best_value` is
    /// known is recorded at the first observation that has one.
    pub fn observe(&mut self, evaluations: u64, best_value: f64) {
        let Some(every) = self.every else {
            return;
        };
        if evaluations < self.next_at || !best_value.is_finite() {
            return;
        }
        self.snapshots.push(Snapshot {
            best_value,
            evaluations,
        });
        self.next_at = (evaluations / every + 1).saturating_mul(every);
    }

    /// Recorded snapshots in order.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Consumes the recorder.
    pub fn into_snapshots(self) -> Vec<Snapshot> {
        self.snapshots
    }
}

/// Evaluation-weighted mean of the best value:
/// `sum_i best_i * (e_i - e_{i-1}) / e_last`, with `e_0 = 0`.
///
/// Returns `None` without snapshots or when no evaluation was recorded.
///
/// # Examples
///
/// ```
/// use u_permsearch::memetic::{anytime_value, Snapshot};
///
/// let snapshots = [
///     Snapshot { best_value: 1.0, evaluations: 10 },
///     Snapshot { best_value: 4.0, evaluations: 40 },
/// ];
/// assert_eq!(anytime_value(&snapshots), Some(3.25));
/// ```
pub fn anytime_value(snapshots: &[Snapshot]) -> Option<f64> {
    let last = snapshots.last()?.evaluations;
    if last == 0 {
        return None;
    }
    let mut previous = 0;
    let mut total = 0.0;
    for s in snapshots {
        total += s.best_value * s.evaluations.saturating_sub(previous) as f64;
        previous = s.evaluations;
    }
    Some(total / last as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_records_nothing() {
        let mut recorder = SnapshotRecorder::new(None);
        recorder.observe(1_000_000, 1.0);
        assert!(recorder.snapshots().is_empty());
    }

    #[test]
    fn test_one_snapshot_per_threshold() {
        let mut recorder = SnapshotRecorder::new(Some(100));
        recorder.observe(50, 1.0);
        recorder.observe(100, 2.0);
        recorder.observe(150, 3.0);
        // Several thresholds crossed at once yield one snapshot.
        recorder.observe(420, 4.0);
        recorder.observe(499, 5.0);
        recorder.observe(500, 6.0);
        let evaluations: Vec<u64> = recorder.snapshots().iter().map(|s| s.evaluations).collect();
        assert_eq!(evaluations, vec![100, 420, 500]);
    }

    #[test]
    fn test_threshold_waits_for_finite_best() {
        let mut recorder = SnapshotRecorder::new(Some(10));
        recorder.observe(10, f64::NEG_INFINITY);
        recorder.observe(15, f64::NEG_INFINITY);
        recorder.observe(17, 1.0);
        recorder.observe(19, 2.0);
        recorder.observe(20, 3.0);
        assert_eq!(
            recorder.into_snapshots(),
            vec![
                Snapshot {
                    best_value: 1.0,
                    evaluations: 17
                },
                Snapshot {
                    best_value: 3.0,
                    evaluations: 20
                },
            ]
        );
    }

    #[test]
    fn test_anytime_value_weighting() {
        let snapshots = [
            Snapshot {
                best_value: 2.0,
                evaluations: 50,
            },
            Snapshot {
                best_value: 6.0,
                evaluations: 100,
            },
        ];
        assert_eq!(anytime_value(&snapshots), Some(4.0));
        assert_eq!(anytime_value(&[]), None);
    }
}
