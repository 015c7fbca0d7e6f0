//! End-to-end analysis over one price table.
//!
//! Stages run in dependency order: return statistics, frontier sweep,
//! maximum-Sharpe solve, minimum-variance solve, baseline evaluation.

use crate::domain::error::FrontierError;
use crate::domain::frontier::{DEFAULT_SIMULATIONS, FrontierSample, sample_frontier_seeded};
use crate::domain::optimizer::{
    OptimizationResult, optimize_min_variance_with, optimize_sharpe_with,
};
use crate::domain::price_table::{LevelSeries, PriceTable};
use crate::domain::returns::{ReturnStats, compute_return_stats};
use crate::domain::solver::SolverConfig;
use crate::domain::statistics::{PortfolioStats, equal_weights, evaluate};

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub simulations: usize,
    pub seed: Option<u64>,
    /// Weights for the side-by-side baseline; equal weights when `None`.
    pub baseline_weights: Option<Vec<f64>>,
    pub solver: SolverConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            simulations: DEFAULT_SIMULATIONS,
            seed: None,
            baseline_weights: None,
            solver: SolverConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub stats: ReturnStats,
    pub levels: Vec<LevelSeries>,
    pub frontier: FrontierSample,
    pub max_sharpe: OptimizationResult,
    pub min_variance: OptimizationResult,
    pub baseline_weights: Vec<f64>,
    pub baseline: PortfolioStats,
}

impl AnalysisReport {
    pub fn symbols(&self) -> &[String] {
        self.stats.symbols()
    }
}

pub fn analyze(table: &PriceTable, config: &AnalysisConfig) -> Result<AnalysisReport, FrontierError> {
    let stats = compute_return_stats(table)?;
    let n = stats.asset_count();

    log::info!(
        "analysing {} assets over {} trading days",
        n,
        table.row_count()
    );

    let frontier = sample_frontier_seeded(&stats, n, config.simulations, config.seed)?;
    let max_sharpe = optimize_sharpe_with(&stats, n, &config.solver)?;
    let min_variance = optimize_min_variance_with(&stats, n, &config.solver)?;

    let baseline_weights = config
        .baseline_weights
        .clone()
        .unwrap_or_else(|| equal_weights(n));
    let baseline = evaluate(&baseline_weights, &stats)?;

    Ok(AnalysisReport {
        levels: table.normalized_levels(),
        stats,
        frontier,
        max_sharpe,
        min_variance,
        baseline_weights,
        baseline,
    })
}
