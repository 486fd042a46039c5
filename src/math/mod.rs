pub mod matrix;
pub mod grad_check;

pub use matrix::Matrix;
