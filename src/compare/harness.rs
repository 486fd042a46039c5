use std::num::NonZeroUsize;
use std::time::Instant;

use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};

use crate::compare::compare_config::CompareConfig;
use crate::compare::problem::Problem;
use crate::compare::report::{ComparisonReport, StrategyTiming};
use crate::error::{LossError, Result};
use crate::loss::softmax::LossGradient;
use crate::loss::strategy::LossStrategy;
use crate::math::grad_check::grad_check_sparse;

/// Finite-difference step used by the sparse gradient check.
const GRAD_CHECK_STEP: f64 = 1e-5;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Builds the seeded random problem described by `config`.
pub fn random_problem(config: &CompareConfig) -> Result<Problem> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    Ok(Problem::random(
        config.num_classes,
        config.num_features,
        config.num_samples,
        config.reg,
        &mut rng,
    ))
}

/// Evaluates every `LossStrategy` on `problem`, times them, and checks that
/// they agree with each other and with a finite-difference gradient.
///
/// Shape and size fields of `config` are ignored here; the problem carries
/// its own. `repeats`, `grad_checks`, `tolerance` and `seed` apply.
pub fn compare_strategies(problem: &Problem, config: &CompareConfig) -> Result<ComparisonReport> {
    problem.validate()?;
    let repeats = NonZeroUsize::new(config.repeats)
        .ok_or(LossError::InvalidInput("repeats must be at least 1"))?;

    info!(
        "comparing strategies: classes={} features={} samples={} reg={}",
        problem.num_classes(), problem.num_features(), problem.num_samples(), problem.reg
    );

    let mut timings = Vec::with_capacity(LossStrategy::ALL.len());
    let mut results: Vec<LossGradient> = Vec::with_capacity(LossStrategy::ALL.len());

    for strategy in LossStrategy::ALL {
        let (result, timing) = time_strategy(strategy, problem, repeats)?;
        info!(
            "{}: loss {:.8} in {:.3} ms (min {:.3} ms)",
            strategy.name(), timing.loss, timing.mean_ms, timing.min_ms
        );
        timings.push(timing);
        results.push(result);
    }

    let (naive, vectorized) = (&results[0], &results[1]);
    let loss_difference = (naive.loss - vectorized.loss).abs();
    let grad_max_abs_difference = naive.grad.max_abs_diff(&vectorized.grad);
    let grad_frobenius_difference = (&naive.grad - &vectorized.grad).sum_squares().sqrt();
    let agree = loss_difference <= config.tolerance && grad_max_abs_difference <= config.tolerance;

    info!(
        "loss difference {loss_difference:.3e}, gradient difference {grad_max_abs_difference:.3e} (frobenius {grad_frobenius_difference:.3e})"
    );

    let grad_check = if config.grad_checks > 0 {
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
        grad_check_sparse(
            |w| Ok(LossStrategy::Vectorized.compute(w, &problem.data, &problem.labels, problem.reg)?.loss),
            &problem.weights,
            &vectorized.grad,
            config.grad_checks,
            GRAD_CHECK_STEP,
            &mut rng,
        )?
    } else {
        Vec::new()
    };

    Ok(ComparisonReport {
        num_classes: problem.num_classes(),
        num_features: problem.num_features(),
        num_samples: problem.num_samples(),
        reg: problem.reg,
        timings,
        loss_difference,
        grad_max_abs_difference,
        grad_frobenius_difference,
        agree,
        grad_check,
    })
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Runs `strategy` `repeats` times and returns the last result with its timing.
fn time_strategy(
    strategy: LossStrategy,
    problem: &Problem,
    repeats: NonZeroUsize,
) -> Result<(LossGradient, StrategyTiming)> {
    let timed_run = |run: usize| -> Result<(LossGradient, f64)> {
        let t_start = Instant::now();
        let result = strategy.compute(&problem.weights, &problem.data, &problem.labels, problem.reg)?;
        let elapsed_ms = t_start.elapsed().as_secs_f64() * 1000.0;
        debug!("{} run {}: {elapsed_ms:.3} ms", strategy.name(), run + 1);
        Ok((result, elapsed_ms))
    };

    let (mut result, first_ms) = timed_run(0)?;
    let mut total_ms = first_ms;
    let mut min_ms = first_ms;

    for run in 1..repeats.get() {
        let (next, elapsed_ms) = timed_run(run)?;
        total_ms += elapsed_ms;
        min_ms = min_ms.min(elapsed_ms);
        result = next;
    }

    let timing = StrategyTiming {
        strategy,
        loss: result.loss,
        mean_ms: total_ms / repeats.get() as f64,
        min_ms,
    };
    Ok((result, timing))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> CompareConfig {
        CompareConfig {
            num_classes: 4,
            num_features: 5,
            num_samples: 12,
            reg: 0.1,
            seed: 9,
            repeats: 2,
            grad_checks: 6,
            tolerance: 1e-7,
        }
    }

    #[test]
    fn strategies_agree_on_random_problem() {
        let config = small_config();
        let problem = random_problem(&config).unwrap();
        let report = compare_strategies(&problem, &config).unwrap();

        assert!(report.agree);
        assert_eq!(report.timings.len(), 2);
        assert_eq!(report.timings[0].strategy, LossStrategy::Naive);
        assert_eq!(report.grad_check.len(), 6);
        assert!(report.worst_grad_check_error().unwrap() < 1e-5);
    }

    #[test]
    fn zero_grad_checks_skips_check() {
        let config = CompareConfig { grad_checks: 0, ..small_config() };
        let problem = random_problem(&config).unwrap();
        let report = compare_strategies(&problem, &config).unwrap();
        assert!(report.grad_check.is_empty());
        assert!(report.worst_grad_check_error().is_none());
    }

    #[test]
    fn same_seed_same_problem() {
        let config = small_config();
        let a = random_problem(&config).unwrap();
        let b = random_problem(&config).unwrap();
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.labels, b.labels);
    }

    #[test]
    fn zero_repeats_is_rejected() {
        let config = small_config();
        let problem = random_problem(&config).unwrap();
        let result = compare_strategies(&problem, &CompareConfig { repeats: 0, ..config });
        assert!(matches!(result, Err(LossError::InvalidInput(_))));
    }

    #[test]
    fn single_repeat_reports_one_timing_per_strategy() {
        let config = CompareConfig { repeats: 1, grad_checks: 0, ..small_config() };
        let problem = random_problem(&config).unwrap();
        let report = compare_strategies(&problem, &config).unwrap();
        for timing in &report.timings {
            assert_eq!(timing.mean_ms, timing.min_ms);
        }
    }

    #[test]
    fn invalid_problem_is_rejected() {
        let config = small_config();
        let mut problem = random_problem(&config).unwrap();
        problem.labels.pop();
        assert!(compare_strategies(&problem, &config).is_err());
    }
}
