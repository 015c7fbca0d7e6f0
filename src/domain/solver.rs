//! Projected-gradient solver for smooth objectives over a `ConstraintSet`.
//!
//! Each iteration steps against the gradient, projects back onto the
//! feasible set and backtracks until the Armijo condition holds with a
//! decrease above floating-point noise. The run stops once the
//! projected-gradient residual ||P(x - g) - x||, relative to max(1, ||g||),
//! is below tolerance. A stalled line search counts as converged only when
//! that residual is below `STALL_RESIDUAL`.

use crate::domain::constraints::{ConstraintSet, FEASIBILITY_TOLERANCE};
use crate::domain::error::FrontierError;
use crate::domain::statistics::dot;

pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

const ARMIJO: f64 = 1e-4;
const MIN_STEP: f64 = 1e-20;
const MAX_STEP: f64 = 1e6;
/// Loosest relative residual accepted when no step can lower the objective.
const STALL_RESIDUAL: f64 = 1e-6;
/// Decreases within this many ulps of the objective are rounding noise.
const NOISE_ULPS: f64 = 4.0;

/// A differentiable function to minimize.
pub trait Objective {
    fn name(&self) -> &str;
    fn value(&self, x: &[f64]) -> f64;
    fn gradient(&self, x: &[f64]) -> Vec<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectedGradient {
    config: SolverConfig,
}

impl ProjectedGradient {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> SolverConfig {
        self.config
    }

    pub fn minimize(
        &self,
        objective: &dyn Objective,
        constraints: &ConstraintSet,
        initial: &[f64],
    ) -> Result<Solution, FrontierError> {
        if initial.len() != constraints.dimension() {
            return Err(FrontierError::dimension_mismatch(
                "initial guess",
                constraints.dimension(),
                initial.len(),
            ));
        }
        if self.config.max_iterations == 0 {
            return Err(FrontierError::invalid_parameter(
                "max_iterations",
                "must be at least 1",
            ));
        }
        if !(self.config.tolerance.is_finite() && self.config.tolerance > 0.0) {
            return Err(FrontierError::invalid_parameter(
                "tolerance",
                "must be a positive number",
            ));
        }

        let diverged = |iterations: usize, reason: &str| FrontierError::OptimizationDiverged {
            objective: objective.name().to_string(),
            iterations,
            reason: reason.to_string(),
        };

        let mut x = constraints.project(initial);
        let mut fx = objective.value(&x);
        if !fx.is_finite() {
            return Err(diverged(0, "objective is not finite at the initial guess"));
        }

        let mut step = 1.0_f64;
        for iteration in 1..=self.config.max_iterations {
            let g = objective.gradient(&x);
            if g.iter().any(|v| !v.is_finite()) {
                return Err(diverged(iteration, "gradient is not finite"));
            }

            let residual = stationarity_residual(constraints, &x, &g);
            if residual <= self.config.tolerance {
                return self.finish(constraints, x, fx, iteration - 1, &diverged);
            }

            let noise = NOISE_ULPS * f64::EPSILON * fx.abs();
            let mut t = step;
            let accepted = loop {
                let candidate = constraints.project(&shifted(&x, -t, &g));
                let fc = objective.value(&candidate);
                let delta: Vec<f64> = candidate.iter().zip(&x).map(|(c, xi)| c - xi).collect();
                if fc.is_finite() && fx - fc > noise && fc <= fx + ARMIJO * dot(&g, &delta) {
                    break Some((candidate, fc));
                }
                t *= 0.5;
                if t < MIN_STEP {
                    break None;
                }
            };

            match accepted {
                Some((candidate, fc)) => {
                    x = candidate;
                    fx = fc;
                    step = (t * 2.0).min(MAX_STEP);
                }
                None if residual <= self.config.tolerance.max(STALL_RESIDUAL) => {
                    log::debug!(
                        "{}: line search stalled at iteration {} with residual {:e}",
                        objective.name(),
                        iteration,
                        residual
                    );
                    return self.finish(constraints, x, fx, iteration, &diverged);
                }
                None => {
                    return Err(diverged(
                        iteration,
                        &format!("line search stalled with residual {residual:e}"),
                    ));
                }
            }
        }

        Err(diverged(
            self.config.max_iterations,
            "iteration cap reached before convergence",
        ))
    }

    fn finish(
        &self,
        constraints: &ConstraintSet,
        x: Vec<f64>,
        value: f64,
        iterations: usize,
        diverged: &dyn Fn(usize, &str) -> FrontierError,
    ) -> Result<Solution, FrontierError> {
        if x.iter().any(|v| !v.is_finite()) || !value.is_finite() {
            return Err(diverged(iterations, "solution is not finite"));
        }
        let violation = constraints.max_violation(&x);
        if violation > FEASIBILITY_TOLERANCE {
            return Err(diverged(
                iterations,
                &format!("constraint violation {violation:e} exceeds tolerance"),
            ));
        }
        log::debug!("converged after {} iterations, objective {}", iterations, value);
        Ok(Solution {
            x,
            value,
            iterations,
        })
    }
}

fn shifted(x: &[f64], scale: f64, direction: &[f64]) -> Vec<f64> {
    x.iter()
        .zip(direction)
        .map(|(xi, di)| xi + scale * di)
        .collect()
}

/// ||P(x - g) - x|| / max(1, ||g||_inf); zero exactly at a KKT point.
fn stationarity_residual(constraints: &ConstraintSet, x: &[f64], g: &[f64]) -> f64 {
    let projected = constraints.project(&shifted(x, -1.0, g));
    let scale = g.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
    distance(&projected, x) / scale
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
