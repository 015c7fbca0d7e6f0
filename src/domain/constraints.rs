//! Named constraints over a weight vector.
//!
//! A long-only budget is one `BoxConstraint` per asset (0 <= w_i <= 1) plus a
//! `BudgetConstraint` (sum w = 1). `ConstraintSet::project` maps any point to
//! the nearest feasible point, which is all the solver needs.

use crate::domain::error::FrontierError;

/// Tolerance on constraint residuals for an accepted solution.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// lower <= w_i <= upper for one asset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxConstraint {
    pub lower: f64,
    pub upper: f64,
}

impl BoxConstraint {
    pub fn violation(&self, value: f64) -> f64 {
        (self.lower - value).max(value - self.upper).max(0.0)
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }
}

/// sum(w) == target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetConstraint {
    pub target: f64,
}

impl BudgetConstraint {
    pub fn violation(&self, weights: &[f64]) -> f64 {
        (weights.iter().sum::<f64>() - self.target).abs()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSet {
    bounds: Vec<BoxConstraint>,
    budget: BudgetConstraint,
}

impl ConstraintSet {
    pub fn new(bounds: Vec<BoxConstraint>, budget: BudgetConstraint) -> Result<Self, FrontierError> {
        if bounds.is_empty() {
            return Err(FrontierError::invalid_parameter(
                "bounds",
                "at least one asset is required",
            ));
        }
        if let Some(b) = bounds
            .iter()
            .find(|b| !b.lower.is_finite() || !b.upper.is_finite() || b.lower > b.upper)
        {
            return Err(FrontierError::invalid_parameter(
                "bounds",
                format!("invalid box [{}, {}]", b.lower, b.upper),
            ));
        }
        let lo: f64 = bounds.iter().map(|b| b.lower).sum();
        let hi: f64 = bounds.iter().map(|b| b.upper).sum();
        if !budget.target.is_finite() || budget.target < lo || budget.target > hi {
            return Err(FrontierError::invalid_parameter(
                "budget",
                format!("target {} outside attainable range [{lo}, {hi}]", budget.target),
            ));
        }
        Ok(Self { bounds, budget })
    }

    /// [0, 1] per asset, weights summing to 1.
    pub fn long_only(n: usize) -> Result<Self, FrontierError> {
        Self::new(
            vec![
                BoxConstraint {
                    lower: 0.0,
                    upper: 1.0
                };
                n
            ],
            BudgetConstraint { target: 1.0 },
        )
    }

    pub fn dimension(&self) -> usize {
        self.bounds.len()
    }

    pub fn bounds(&self) -> &[BoxConstraint] {
        &self.bounds
    }

    pub fn budget(&self) -> BudgetConstraint {
        self.budget
    }

    /// Largest residual across every box and the budget.
    pub fn max_violation(&self, weights: &[f64]) -> f64 {
        let worst_box = self
            .bounds
            .iter()
            .zip(weights)
            .map(|(b, &w)| b.violation(w))
            .fold(0.0, f64::max);
        worst_box.max(self.budget.violation(weights))
    }

    pub fn is_feasible(&self, weights: &[f64]) -> bool {
        weights.len() == self.bounds.len()
            && weights.iter().all(|w| w.is_finite())
            && self.max_violation(weights) <= FEASIBILITY_TOLERANCE
    }

    /// Euclidean projection onto the feasible set.
    ///
    /// The projection has the form w_i = clamp(v_i - lambda); the budget
    /// multiplier lambda is found by bisection since the clamped sum is
    /// non-increasing in lambda.
    pub fn project(&self, v: &[f64]) -> Vec<f64> {
        let clamped_sum = |lambda: f64| -> f64 {
            self.bounds
                .iter()
                .zip(v)
                .map(|(b, &x)| b.clamp(x - lambda))
                .sum()
        };

        let mut lo = self
            .bounds
            .iter()
            .zip(v)
            .map(|(b, &x)| x - b.upper)
            .fold(f64::INFINITY, f64::min);
        let mut hi = self
            .bounds
            .iter()
            .zip(v)
            .map(|(b, &x)| x - b.lower)
            .fold(f64::NEG_INFINITY, f64::max);

        let target = self.budget.target;
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            let s = clamped_sum(mid);
            if (s - target).abs() <= 1e-15 {
                lo = mid;
                hi = mid;
                break;
            }
            if s > target {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo <= f64::EPSILON * (1.0 + lo.abs().max(hi.abs())) {
                break;
            }
        }

        let lambda = 0.5 * (lo + hi);
        self.bounds
            .iter()
            .zip(v)
            .map(|(b, &x)| b.clamp(x - lambda))
            .collect()
    }
}
