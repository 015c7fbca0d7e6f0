//! Portfolio statistics for a weight allocation.
//!
//! return     = mu . w
//! volatility = sqrt(max(0, w' Sigma w))
//! sharpe     = return / volatility
//!
//! Zero volatility yields +inf for a positive return, -inf for a negative
//! return and 0.0 for a zero return. Sharpe is never NaN.

use crate::domain::error::FrontierError;
use crate::domain::returns::ReturnStats;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioStats {
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

impl PortfolioStats {
    /// True when volatility is zero and the Sharpe ratio is a sentinel.
    pub fn is_degenerate(&self) -> bool {
        self.volatility == 0.0
    }

    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            expected_return: round_to(self.expected_return, decimals),
            volatility: round_to(self.volatility, decimals),
            sharpe_ratio: round_to(self.sharpe_ratio, decimals),
        }
    }
}

/// Evaluate raw weights against the stats. Weights are not re-normalized.
pub fn evaluate(weights: &[f64], stats: &ReturnStats) -> Result<PortfolioStats, FrontierError> {
    if weights.len() != stats.asset_count() {
        return Err(FrontierError::dimension_mismatch(
            "weight vector",
            stats.asset_count(),
            weights.len(),
        ));
    }

    let expected_return = dot(stats.mean_returns(), weights);
    let volatility = quad_form(stats.covariance(), weights).max(0.0).sqrt();

    Ok(PortfolioStats {
        expected_return,
        volatility,
        sharpe_ratio: sharpe_ratio(expected_return, volatility),
    })
}

pub fn sharpe_ratio(expected_return: f64, volatility: f64) -> f64 {
    if volatility > 0.0 {
        expected_return / volatility
    } else if expected_return > 0.0 {
        f64::INFINITY
    } else if expected_return < 0.0 {
        f64::NEG_INFINITY
    } else {
        0.0
    }
}

pub fn equal_weights(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// Half-away-from-zero rounding; non-finite values pass through.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub(crate) fn mat_vec_mul(matrix: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    matrix.iter().map(|row| dot(row, v)).collect()
}

pub(crate) fn quad_form(matrix: &[Vec<f64>], v: &[f64]) -> f64 {
    dot(v, &mat_vec_mul(matrix, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_asset_stats() -> ReturnStats {
        ReturnStats::new(
            vec!["A".into(), "B".into()],
            vec![0.10, 0.20],
            vec![vec![0.04, 0.01], vec![0.01, 0.09]],
        )
        .unwrap()
    }

    #[test]
    fn evaluate_equal_weights() {
        let stats = two_asset_stats();
        let result = evaluate(&[0.5, 0.5], &stats).unwrap();
        // var = 0.25*0.04 + 2*0.25*0.01 + 0.25*0.09 = 0.0375
        assert_relative_eq!(result.expected_return, 0.15, epsilon = 1e-12);
        assert_relative_eq!(result.volatility, 0.0375f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(result.sharpe_ratio, 0.15 / 0.0375f64.sqrt(), epsilon = 1e-12);
        assert!(!result.is_degenerate());
    }

    #[test]
    fn evaluate_does_not_renormalize() {
        let stats = two_asset_stats();
        let result = evaluate(&[1.0, 1.0], &stats).unwrap();
        assert_relative_eq!(result.expected_return, 0.30, epsilon = 1e-12);
    }

    #[test]
    fn evaluate_rejects_wrong_length() {
        let stats = two_asset_stats();
        let err = evaluate(&[1.0], &stats).unwrap_err();
        assert!(matches!(
            err,
            FrontierError::DimensionMismatch { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn zero_volatility_sharpe_sentinels() {
        assert_eq!(sharpe_ratio(0.1, 0.0), f64::INFINITY);
        assert_eq!(sharpe_ratio(-0.1, 0.0), f64::NEG_INFINITY);
        assert_eq!(sharpe_ratio(0.0, 0.0), 0.0);
    }

    #[test]
    fn negative_quadratic_form_is_clamped() {
        let stats = ReturnStats::new(
            vec!["A".into()],
            vec![0.05],
            vec![vec![-1e-18]],
        )
        .unwrap();
        let result = evaluate(&[1.0], &stats).unwrap();
        assert_eq!(result.volatility, 0.0);
        assert_eq!(result.sharpe_ratio, f64::INFINITY);
        assert!(result.is_degenerate());
    }

    #[test]
    fn rounded_stats() {
        let stats = PortfolioStats {
            expected_return: 12.3456,
            volatility: 20.004,
            sharpe_ratio: f64::INFINITY,
        };
        let r = stats.rounded(2);
        assert_eq!(r.expected_return, 12.35);
        assert_eq!(r.volatility, 20.0);
        assert_eq!(r.sharpe_ratio, f64::INFINITY);
    }

    #[test]
    fn equal_weights_sum_to_one() {
        let w = equal_weights(4);
        assert_eq!(w, vec![0.25; 4]);
        assert!(equal_weights(0).is_empty());
    }
}
