use serde::{Serialize, Deserialize};

use crate::loss::strategy::LossStrategy;
use crate::math::grad_check::GradCheckSample;

/// Result of running one strategy during a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyTiming {
    pub strategy: LossStrategy,
    pub loss: f64,
    /// Mean wall-clock time of one evaluation, in milliseconds.
    pub mean_ms: f64,
    /// Fastest single evaluation, in milliseconds.
    pub min_ms: f64,
}

/// Outcome of `compare_strategies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub num_classes: usize,
    pub num_features: usize,
    pub num_samples: usize,
    pub reg: f64,
    /// One entry per strategy, in `LossStrategy::ALL` order.
    pub timings: Vec<StrategyTiming>,
    /// `|loss_naive - loss_vectorized|`
    pub loss_difference: f64,
    /// Largest elementwise gradient difference between the strategies.
    pub grad_max_abs_difference: f64,
    /// Frobenius norm of the gradient difference.
    pub grad_frobenius_difference: f64,
    /// True when both differences are within the configured tolerance.
    pub agree: bool,
    /// Sparse finite-difference probes of the vectorized gradient.
    pub grad_check: Vec<GradCheckSample>,
}

impl ComparisonReport {
    /// Naive mean time divided by vectorized mean time.
    pub fn speedup(&self) -> Option<f64> {
        let time_of = |s: LossStrategy| {
            self.timings.iter().find(|t| t.strategy == s).map(|t| t.mean_ms)
        };
        match (time_of(LossStrategy::Naive), time_of(LossStrategy::Vectorized)) {
            (Some(naive), Some(vectorized)) if vectorized > 0.0 => Some(naive / vectorized),
            _ => None,
        }
    }

    /// Largest relative error seen by the gradient check, if one ran.
    pub fn worst_grad_check_error(&self) -> Option<f64> {
        self.grad_check.iter().map(|s| s.relative_error).reduce(f64::max)
    }
}
