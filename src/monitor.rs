//! Search monitors.
//!
//! A [`SearchMonitor`] is polled by the local search after every charge to
//! the evaluation budget. It can observe progress and request a stop, which
//! is how wall-clock deadlines reach into a long local-search call.

use crate::budget::EvaluationBudget;
use std::time::{Duration, Instant};

/// Observer polled from inside the search loops.
pub trait SearchMonitor {
    /// Called after evaluation units were charged to `budget`.
    fn on_evaluations(&mut self, _budget: &EvaluationBudget) {}

    /// Called with the start value of a local search and again with every
    /// new best value it finds.
    fn on_best(&mut self, _value: f64) {}

    /// Returns `true` to stop the current search as soon as possible.
    fn should_stop(&self) -> bool {
        false
    }
}

impl<M: SearchMonitor + ?Sized> SearchMonitor for &mut M {
    fn on_evaluations(&mut self, budget: &EvaluationBudget) {
        (**self).on_evaluations(budget)
    }

    fn on_best(&mut self, value: f64) {
        (**self).on_best(value)
    }

    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}

/// Monitor that never stops and records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMonitor;

impl SearchMonitor for NoOpMonitor {}

/// Stops once a wall-clock limit has elapsed since construction.
#[derive(Debug, Clone, Copy)]
pub struct TimeLimitMonitor {
    start: Instant,
    limit: Duration,
}

impl TimeLimitMonitor {
    /// Starts the clock now.
    pub fn new(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    /// Time elapsed since construction.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl SearchMonitor for TimeLimitMonitor {
    fn should_stop(&self) -> bool {
        self.start.elapsed() >= self.limit
    }
}
