//! Monte-Carlo sweep over random long-only allocations.
//!
//! Each draw takes N uniform(0, 1) values, divides by their sum and maps the
//! resulting simplex point to (volatility, return). The points feed a
//! risk/return scatter coloured by Sharpe ratio.

use crate::domain::error::FrontierError;
use crate::domain::returns::ReturnStats;
use crate::domain::statistics::evaluate;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_SIMULATIONS: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct FrontierPoint {
    pub volatility: f64,
    pub expected_return: f64,
    pub sharpe_ratio: f64,
    pub weights: Vec<f64>,
}

/// Points in draw order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrontierSample {
    pub points: Vec<FrontierPoint>,
}

impl FrontierSample {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// (volatility, return) pairs for plotting.
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.volatility, p.expected_return))
            .collect()
    }

    pub fn max_sharpe(&self) -> Option<&FrontierPoint> {
        self.points
            .iter()
            .max_by(|a, b| a.sharpe_ratio.total_cmp(&b.sharpe_ratio))
    }
}

/// Draw a random point on the N-simplex. Empty for `n == 0`.
pub fn random_weights<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let uniform = Uniform::new(0.0, 1.0);
    loop {
        let raw: Vec<f64> = (0..n).map(|_| uniform.sample(&mut *rng)).collect();
        let sum: f64 = raw.iter().sum();
        // All-zero draws are redrawn; the sum is almost surely positive.
        if sum > 0.0 {
            return raw.into_iter().map(|x| x / sum).collect();
        }
    }
}

pub fn sample_frontier<R: Rng + ?Sized>(
    stats: &ReturnStats,
    n_assets: usize,
    simulations: usize,
    rng: &mut R,
) -> Result<FrontierSample, FrontierError> {
    if simulations == 0 {
        return Err(FrontierError::invalid_parameter(
            "simulations",
            "must be at least 1",
        ));
    }
    if n_assets == 0 {
        return Err(FrontierError::invalid_parameter(
            "n_assets",
            "must be at least 1",
        ));
    }
    if n_assets != stats.asset_count() {
        return Err(FrontierError::dimension_mismatch(
            "frontier asset count",
            stats.asset_count(),
            n_assets,
        ));
    }

    let mut points = Vec::with_capacity(simulations);
    for _ in 0..simulations {
        let weights = random_weights(n_assets, &mut *rng);
        let result = evaluate(&weights, stats)?;
        points.push(FrontierPoint {
            volatility: result.volatility,
            expected_return: result.expected_return,
            sharpe_ratio: result.sharpe_ratio,
            weights,
        });
    }

    log::debug!("sampled {} frontier points over {} assets", simulations, n_assets);
    Ok(FrontierSample { points })
}

/// Runs the sweep with a seeded generator, or an entropy-seeded one when `seed` is `None`.
pub fn sample_frontier_seeded(
    stats: &ReturnStats,
    n_assets: usize,
    simulations: usize,
    seed: Option<u64>,
) -> Result<FrontierSample, FrontierError> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    sample_frontier(stats, n_assets, simulations, &mut rng)
}
