//! Long-only allocation optimizers: maximum Sharpe and minimum variance.
//!
//! Both start from equal weights and solve over the long-only budget set
//! (0 <= w_i <= 1, sum w = 1). Results are reported as percentages: weights
//! scaled by 100 and rounded to one decimal, stats evaluated on the scaled
//! weights and rounded to two decimals.

use crate::domain::constraints::{ConstraintSet, FEASIBILITY_TOLERANCE};
use crate::domain::error::FrontierError;
use crate::domain::returns::ReturnStats;
use crate::domain::solver::{Objective, ProjectedGradient, SolverConfig};
use crate::domain::statistics::{
    PortfolioStats, dot, equal_weights, evaluate, mat_vec_mul, quad_form,
};

/// Variance floor keeping the Sharpe gradient finite near riskless allocations.
const VARIANCE_FLOOR: f64 = 1e-16;

/// -(mu . w) / sqrt(w' Sigma w)
pub struct NegativeSharpe<'a> {
    stats: &'a ReturnStats,
}

impl<'a> NegativeSharpe<'a> {
    pub fn new(stats: &'a ReturnStats) -> Self {
        Self { stats }
    }
}

impl Objective for NegativeSharpe<'_> {
    fn name(&self) -> &str {
        "max-sharpe"
    }

    fn value(&self, w: &[f64]) -> f64 {
        let ret = dot(self.stats.mean_returns(), w);
        let var = quad_form(self.stats.covariance(), w).max(VARIANCE_FLOOR);
        -ret / var.sqrt()
    }

    fn gradient(&self, w: &[f64]) -> Vec<f64> {
        let mu = self.stats.mean_returns();
        let sigma_w = mat_vec_mul(self.stats.covariance(), w);
        let ret = dot(mu, w);
        let var = dot(w, &sigma_w).max(VARIANCE_FLOOR);
        let vol = var.sqrt();
        mu.iter()
            .zip(&sigma_w)
            .map(|(m, sw)| -(m / vol - ret * sw / (var * vol)))
            .collect()
    }
}

/// w' Sigma w
pub struct PortfolioVariance<'a> {
    stats: &'a ReturnStats,
}

impl<'a> PortfolioVariance<'a> {
    pub fn new(stats: &'a ReturnStats) -> Self {
        Self { stats }
    }
}

impl Objective for PortfolioVariance<'_> {
    fn name(&self) -> &str {
        "min-variance"
    }

    fn value(&self, w: &[f64]) -> f64 {
        quad_form(self.stats.covariance(), w)
    }

    fn gradient(&self, w: &[f64]) -> Vec<f64> {
        mat_vec_mul(self.stats.covariance(), w)
            .into_iter()
            .map(|g| 2.0 * g)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub symbols: Vec<String>,
    /// Percent weights, one decimal, summing to exactly 100.0.
    pub weights: Vec<f64>,
    /// Stats of the percent weights, two decimals.
    pub stats: PortfolioStats,
    /// Solver weights on the unit simplex, unrounded.
    pub unit_weights: Vec<f64>,
    pub unit_stats: PortfolioStats,
    pub iterations: usize,
}

pub fn optimize_sharpe(stats: &ReturnStats, n_assets: usize) -> Result<OptimizationResult, FrontierError> {
    optimize_sharpe_with(stats, n_assets, &SolverConfig::default())
}

pub fn optimize_sharpe_with(
    stats: &ReturnStats,
    n_assets: usize,
    config: &SolverConfig,
) -> Result<OptimizationResult, FrontierError> {
    optimize(stats, n_assets, config, &NegativeSharpe::new(stats))
}

pub fn optimize_min_variance(
    stats: &ReturnStats,
    n_assets: usize,
) -> Result<OptimizationResult, FrontierError> {
    optimize_min_variance_with(stats, n_assets, &SolverConfig::default())
}

pub fn optimize_min_variance_with(
    stats: &ReturnStats,
    n_assets: usize,
    config: &SolverConfig,
) -> Result<OptimizationResult, FrontierError> {
    optimize(stats, n_assets, config, &PortfolioVariance::new(stats))
}

fn optimize(
    stats: &ReturnStats,
    n_assets: usize,
    config: &SolverConfig,
    objective: &dyn Objective,
) -> Result<OptimizationResult, FrontierError> {
    if n_assets == 0 {
        return Err(FrontierError::invalid_parameter(
            "n_assets",
            "must be at least 1",
        ));
    }
    if n_assets != stats.asset_count() {
        return Err(FrontierError::dimension_mismatch(
            "optimizer asset count",
            stats.asset_count(),
            n_assets,
        ));
    }

    let (unit_weights, iterations) = if n_assets == 1 {
        // The only feasible point of a one-asset budget.
        (vec![1.0], 0)
    } else {
        let constraints = ConstraintSet::long_only(n_assets)?;
        let solution = ProjectedGradient::new(*config).minimize(
            objective,
            &constraints,
            &equal_weights(n_assets),
        )?;
        (snap_to_bounds(solution.x), solution.iterations)
    };

    log::info!(
        "{} solved over {} assets in {} iterations",
        objective.name(),
        n_assets,
        iterations
    );

    let unit_stats = evaluate(&unit_weights, stats)?;
    let percent: Vec<f64> = unit_weights.iter().map(|w| w * 100.0).collect();
    let percent_stats = evaluate(&percent, stats)?.rounded(2);

    Ok(OptimizationResult {
        symbols: stats.symbols().to_vec(),
        weights: round_percentages(&percent),
        stats: percent_stats,
        unit_weights,
        unit_stats,
        iterations,
    })
}

/// Zero out weights within feasibility tolerance of the lower bound and
/// rescale the rest onto the budget.
fn snap_to_bounds(weights: Vec<f64>) -> Vec<f64> {
    let snapped: Vec<f64> = weights
        .into_iter()
        .map(|w| if w < FEASIBILITY_TOLERANCE { 0.0 } else { w })
        .collect();
    let total: f64 = snapped.iter().sum();
    snapped.into_iter().map(|w| w / total).collect()
}

/// Round to one decimal with largest-remainder allocation, so the rounded
/// values keep the (rounded) total of the inputs.
pub fn round_percentages(percent: &[f64]) -> Vec<f64> {
    let tenths: Vec<f64> = percent.iter().map(|p| (p * 10.0).max(0.0)).collect();
    let target = tenths.iter().sum::<f64>().round() as i64;

    let mut floors: Vec<i64> = tenths.iter().map(|t| t.floor() as i64).collect();
    let mut order: Vec<usize> = (0..tenths.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = tenths[a] - tenths[a].floor();
        let rb = tenths[b] - tenths[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });

    let deficit = target - floors.iter().sum::<i64>();
    for &i in order.iter().take(deficit.max(0) as usize) {
        floors[i] += 1;
    }

    floors.into_iter().map(|f| f as f64 / 10.0).collect()
}
