pub mod error;
pub mod math;
pub mod loss;
pub mod compare;

// Convenience re-exports
pub use error::{LossError, Result};
pub use math::matrix::Matrix;
pub use math::grad_check::{grad_check_sparse, numerical_gradient, relative_error, GradCheckSample};
pub use loss::softmax::{softmax_loss_naive, softmax_loss_vectorized, LossGradient};
pub use loss::strategy::LossStrategy;
pub use compare::{compare_strategies, random_problem, CompareConfig, ComparisonReport, Problem};
