use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LossError>;

/// Errors produced when loss inputs violate their shape or range contract.
#[derive(Debug, Error)]
pub enum LossError {
    /// A dimension does not line up with the one it must match.
    #[error("shape mismatch for {what}: got {got}, expected {expected}")]
    ShapeMismatch {
        /// Which dimension disagreed (e.g. "X.rows vs W.cols").
        what: &'static str,
        got: usize,
        expected: usize,
    },

    /// A label is not a valid class index.
    #[error("label {label} at sample {index} is out of range for {num_classes} classes")]
    LabelOutOfRange {
        index: usize,
        label: usize,
        num_classes: usize,
    },

    /// Rows of a matrix literal have different lengths.
    #[error("row {row} has {got} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        got: usize,
        expected: usize,
    },

    /// An input is invalid for semantic reasons.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
