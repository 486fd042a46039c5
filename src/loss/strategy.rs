use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::loss::softmax::{softmax_loss_naive, softmax_loss_vectorized, LossGradient};
use crate::math::matrix::Matrix;

/// Selects which formulation computes the softmax loss.
///
/// - `Naive`      — explicit loop over samples; one score vector and one
///   softmax per sample, gradient rows accumulated in place.
/// - `Vectorized` — whole-batch matrix products with a one-hot indicator.
///
/// Both return the same loss and gradient up to floating-point rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossStrategy {
    Naive,
    Vectorized,
}

impl LossStrategy {
    pub const ALL: [LossStrategy; 2] = [LossStrategy::Naive, LossStrategy::Vectorized];

    pub fn name(&self) -> &'static str {
        match self {
            LossStrategy::Naive      => "naive",
            LossStrategy::Vectorized => "vectorized",
        }
    }

    pub fn compute(
        &self,
        weights: &Matrix,
        data: &Matrix,
        labels: &[usize],
        reg: f64,
    ) -> Result<LossGradient> {
        match self {
            LossStrategy::Naive      => softmax_loss_naive(weights, data, labels, reg),
            LossStrategy::Vectorized => softmax_loss_vectorized(weights, data, labels, reg),
        }
    }
}
