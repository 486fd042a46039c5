use log::debug;
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{LossError, Result};
use crate::math::matrix::Matrix;

/// One probed entry of a sparse gradient check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradCheckSample {
    pub row: usize,
    pub col: usize,
    pub numerical: f64,
    pub analytic: f64,
    pub relative_error: f64,
}

/// `|a - b| / (|a| + |b|)`, or 0 when both are exactly zero.
pub fn relative_error(a: f64, b: f64) -> f64 {
    let denom = a.abs() + b.abs();
    if denom == 0.0 {
        0.0
    } else {
        (a - b).abs() / denom
    }
}

/// Centered finite difference `(f(W + h) - f(W - h)) / 2h` at `(row, col)`.
fn centered_difference<F>(f: &mut F, probe: &mut Matrix, row: usize, col: usize, h: f64) -> Result<f64>
where
    F: FnMut(&Matrix) -> Result<f64>,
{
    let original = probe.data[row][col];

    probe.data[row][col] = original + h;
    let plus = f(probe);
    probe.data[row][col] = original - h;
    let minus = f(probe);
    probe.data[row][col] = original;

    Ok((plus? - minus?) / (2.0 * h))
}

/// Numerical gradient of a scalar function of `weights`, one centered
/// difference per entry. Costs `2 * rows * cols` evaluations of `f`.
pub fn numerical_gradient<F>(mut f: F, weights: &Matrix, h: f64) -> Result<Matrix>
where
    F: FnMut(&Matrix) -> Result<f64>,
{
    if !(h > 0.0) {
        return Err(LossError::InvalidInput("finite-difference step must be positive"));
    }

    let mut probe = weights.clone();
    let mut grad = Matrix::zeros(weights.rows, weights.cols);
    for i in 0..weights.rows {
        for j in 0..weights.cols {
            grad.data[i][j] = centered_difference(&mut f, &mut probe, i, j, h)?;
        }
    }
    Ok(grad)
}

/// Compares `analytic` against centered differences of `f` at
/// `num_checks` randomly chosen entries of `weights`.
pub fn grad_check_sparse<F, R>(
    mut f: F,
    weights: &Matrix,
    analytic: &Matrix,
    num_checks: usize,
    h: f64,
    rng: &mut R,
) -> Result<Vec<GradCheckSample>>
where
    F: FnMut(&Matrix) -> Result<f64>,
    R: Rng + ?Sized,
{
    if analytic.rows != weights.rows || analytic.cols != weights.cols {
        return Err(LossError::ShapeMismatch {
            what: "gradient elements vs weight elements",
            got: analytic.rows * analytic.cols,
            expected: weights.rows * weights.cols,
        });
    }
    if weights.rows == 0 || weights.cols == 0 {
        return Ok(Vec::new());
    }
    if !(h > 0.0) {
        return Err(LossError::InvalidInput("finite-difference step must be positive"));
    }

    let mut probe = weights.clone();
    let mut samples = Vec::with_capacity(num_checks);

    for _ in 0..num_checks {
        let row = rng.gen_range(0..weights.rows);
        let col = rng.gen_range(0..weights.cols);

        let numerical = centered_difference(&mut f, &mut probe, row, col, h)?;
        let analytic = analytic.data[row][col];
        let relative_error = relative_error(numerical, analytic);

        debug!("grad check ({row}, {col}): numerical {numerical:.6e} analytic {analytic:.6e} relative error {relative_error:.3e}");
        samples.push(GradCheckSample { row, col, numerical, analytic, relative_error });
    }

    Ok(samples)
}
