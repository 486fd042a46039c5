pub mod softmax;
pub mod strategy;

pub use softmax::{softmax_loss_naive, softmax_loss_vectorized, LossGradient};
pub use strategy::LossStrategy;
