use log::trace;
use serde::{Serialize, Deserialize};

use crate::error::{LossError, Result};
use crate::math::matrix::{hadamard, log_sum_exp, softmax, Matrix};

/// Scalar loss paired with its gradient w.r.t. the weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossGradient {
    pub loss: f64,
    /// Same shape as the weight matrix.
    pub grad: Matrix,
}

/// Softmax cross-entropy with L2 regularization, computed one sample at a time.
///
/// - `weights` — `[num_classes, num_features]`, one row per class
/// - `data`    — `[num_features, num_samples]`, one column per sample
/// - `labels`  — `num_samples` class indices in `[0, num_classes)`
/// - `reg`     — L2 strength, `>= 0`
///
/// Loss is `mean_i(-log p_i) + 0.5 * reg * sum(W²)` where `p_i` is the
/// softmax probability of the true class. For each sample the gradient row
/// of class `j` accumulates `(p_ij - 1{j = y_i}) * x_i`; the sum is averaged
/// and `reg * W` is added.
pub fn softmax_loss_naive(
    weights: &Matrix,
    data: &Matrix,
    labels: &[usize],
    reg: f64,
) -> Result<LossGradient> {
    check_inputs(weights, data, labels, reg)?;

    let mut loss = 0.0;
    let mut grad = Matrix::zeros(weights.rows, weights.cols);

    for (i, &label) in labels.iter().enumerate() {
        let x = data.column(i);
        let scores: Vec<f64> = weights.data.iter()
            .map(|w| w.iter().zip(&x).map(|(a, b)| a * b).sum::<f64>())
            .collect();

        // -log(e^{s_y} / Σ e^{s_k}) without forming the probability.
        loss += log_sum_exp(&scores) - scores[label];

        for (j, p) in softmax(&scores).into_iter().enumerate() {
            let coeff = if j == label { p - 1.0 } else { p };
            for (g, xk) in grad.data[j].iter_mut().zip(&x) {
                *g += coeff * xk;
            }
        }
    }

    Ok(finish(loss, grad, weights, labels.len(), reg))
}

/// Same contract as [`softmax_loss_naive`], expressed as whole-matrix products.
///
/// Scores are `(W·X)ᵀ` of shape `[num_samples, num_classes]`; the gradient is
/// `(X · (P - Y))ᵀ / N + reg * W` with `P` the row-wise softmax and `Y` the
/// one-hot label indicator.
pub fn softmax_loss_vectorized(
    weights: &Matrix,
    data: &Matrix,
    labels: &[usize],
    reg: f64,
) -> Result<LossGradient> {
    check_inputs(weights, data, labels, reg)?;

    let scores = (weights * data).transpose();
    let indicator = Matrix::one_hot(labels, weights.rows);

    let normalizers: f64 = scores.log_sum_exp_rows().iter().sum();
    let true_scores = hadamard(&scores, &indicator).sum();
    let loss = normalizers - true_scores;

    let delta = &scores.softmax_rows() - &indicator;
    let grad = (data * &delta).transpose();

    Ok(finish(loss, grad, weights, labels.len(), reg))
}

/// Averages the summed loss and gradient over `n` samples and adds the
/// regularization terms.
fn finish(loss_sum: f64, grad_sum: Matrix, weights: &Matrix, n: usize, reg: f64) -> LossGradient {
    let inv_n = 1.0 / n as f64;
    let mut loss = loss_sum * inv_n;
    let mut grad = grad_sum.scale(inv_n);

    if reg != 0.0 {
        loss += 0.5 * reg * weights.sum_squares();
        grad = &grad + &weights.scale(reg);
    }

    LossGradient { loss, grad }
}

/// Validates the shape and range contract shared by both strategies.
pub fn check_inputs(weights: &Matrix, data: &Matrix, labels: &[usize], reg: f64) -> Result<()> {
    weights.check_consistent()?;
    data.check_consistent()?;
    if weights.rows == 0 || weights.cols == 0 {
        return Err(LossError::InvalidInput("weights must have at least one class and one feature"));
    }
    if data.rows != weights.cols {
        return Err(LossError::ShapeMismatch {
            what: "data rows vs weight columns",
            got: data.rows,
            expected: weights.cols,
        });
    }
    if labels.len() != data.cols {
        return Err(LossError::ShapeMismatch {
            what: "label count vs data columns",
            got: labels.len(),
            expected: data.cols,
        });
    }
    if labels.is_empty() {
        return Err(LossError::InvalidInput("at least one sample is required"));
    }
    if let Some((index, &label)) = labels.iter().enumerate().find(|&(_, &l)| l >= weights.rows) {
        return Err(LossError::LabelOutOfRange { index, label, num_classes: weights.rows });
    }
    if !reg.is_finite() || reg < 0.0 {
        return Err(LossError::InvalidInput("regularization strength must be finite and non-negative"));
    }

    trace!(
        "softmax loss: classes={} features={} samples={} reg={reg}",
        weights.rows, weights.cols, labels.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> (Matrix, Matrix, Vec<usize>) {
        let w = Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]]).unwrap();
        let x = Matrix::from_data(vec![vec![1.0], vec![1.0]]).unwrap();
        (w, x, vec![0])
    }

    #[test]
    fn naive_matches_worked_example() {
        let (w, x, y) = scenario();
        let out = softmax_loss_naive(&w, &x, &y, 0.0).unwrap();

        let e = std::f64::consts::E;
        let p0 = e / (2.0 * e + 1.0);
        let p2 = 1.0 / (2.0 * e + 1.0);
        assert!((out.loss + p0.ln()).abs() < 1e-12);
        assert!((out.loss - 0.8620).abs() < 1e-3);
        assert!((out.grad.data[0][0] - (p0 - 1.0)).abs() < 1e-12);
        assert!((out.grad.data[1][1] - p0).abs() < 1e-12);
        assert!((out.grad.data[2][0] - p2).abs() < 1e-12);
        assert!((out.grad.data[0][0] - -0.5777).abs() < 1e-4);
        assert!((out.grad.data[2][1] - 0.1554).abs() < 1e-4);
    }

    #[test]
    fn vectorized_matches_worked_example() {
        let (w, x, y) = scenario();
        let naive = softmax_loss_naive(&w, &x, &y, 0.0).unwrap();
        let vec = softmax_loss_vectorized(&w, &x, &y, 0.0).unwrap();
        assert!((naive.loss - vec.loss).abs() < 1e-12);
        assert!(naive.grad.max_abs_diff(&vec.grad) < 1e-12);
    }

    #[test]
    fn regularization_adds_penalty_and_weight_term() {
        let (w, x, y) = scenario();
        let plain = softmax_loss_naive(&w, &x, &y, 0.0).unwrap();
        let reg = softmax_loss_vectorized(&w, &x, &y, 0.5).unwrap();
        // sum(W²) = 2
        assert!((reg.loss - plain.loss - 0.5 * 0.5 * 2.0).abs() < 1e-12);
        assert!((reg.grad.data[0][0] - plain.grad.data[0][0] - 0.5).abs() < 1e-12);
        assert!((reg.grad.data[2][0] - plain.grad.data[2][0]).abs() < 1e-12);
    }

    #[test]
    fn rejects_feature_mismatch() {
        let (w, _, y) = scenario();
        let x = Matrix::from_data(vec![vec![1.0], vec![1.0], vec![1.0]]).unwrap();
        let err = softmax_loss_naive(&w, &x, &y, 0.0).unwrap_err();
        assert!(matches!(err, LossError::ShapeMismatch { got: 3, expected: 2, .. }));
    }

    #[test]
    fn rejects_label_count_mismatch() {
        let (w, x, _) = scenario();
        let err = softmax_loss_vectorized(&w, &x, &[0, 1], 0.0).unwrap_err();
        assert!(matches!(err, LossError::ShapeMismatch { got: 2, expected: 1, .. }));
    }

    #[test]
    fn rejects_out_of_range_label() {
        let (w, x, _) = scenario();
        let err = softmax_loss_vectorized(&w, &x, &[3], 0.0).unwrap_err();
        assert!(matches!(err, LossError::LabelOutOfRange { index: 0, label: 3, num_classes: 3 }));
    }

    #[test]
    fn rejects_negative_reg() {
        let (w, x, y) = scenario();
        assert!(matches!(
            softmax_loss_naive(&w, &x, &y, -1.0),
            Err(LossError::InvalidInput(_))
        ));
        assert!(softmax_loss_naive(&w, &x, &y, f64::NAN).is_err());
    }

    #[test]
    fn rejects_empty_sample_set() {
        let (w, _, _) = scenario();
        let empty = Matrix::zeros(2, 0);
        for result in [
            softmax_loss_naive(&w, &empty, &[], 0.0),
            softmax_loss_vectorized(&w, &empty, &[], 0.0),
        ] {
            assert!(matches!(result, Err(LossError::InvalidInput(_))));
        }
    }

    #[test]
    fn rejects_empty_weights() {
        let (_, x, y) = scenario();
        for weights in [Matrix::zeros(0, 2), Matrix::zeros(3, 0)] {
            assert!(matches!(
                softmax_loss_naive(&weights, &x, &y, 0.0),
                Err(LossError::InvalidInput(_))
            ));
            assert!(matches!(
                softmax_loss_vectorized(&weights, &x, &y, 0.0),
                Err(LossError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn rejects_matrix_disagreeing_with_its_shape() {
        let (w, _, _) = scenario();
        // Claims two samples but only holds one per feature row.
        let x = Matrix { rows: 2, cols: 2, data: vec![vec![1.0], vec![1.0]] };
        let err = softmax_loss_naive(&w, &x, &[0, 0], 0.0).unwrap_err();
        assert!(matches!(err, LossError::RaggedRows { row: 0, got: 1, expected: 2 }));
    }

    #[test]
    fn large_weights_stay_finite() {
        let (w, x, y) = scenario();
        let big = w.scale(1e6);
        for out in [
            softmax_loss_naive(&big, &x, &y, 0.0).unwrap(),
            softmax_loss_vectorized(&big, &x, &y, 0.0).unwrap(),
        ] {
            assert!(out.loss.is_finite());
            assert!(out.grad.is_finite());
        }
    }
}
