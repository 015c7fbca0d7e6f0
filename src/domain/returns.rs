//! Log-returns and annualized return statistics.
//!
//! r[t] = ln(P[t] / P[t-1]); the first date has no prior price and is dropped.
//! mean and sample covariance of r are annualized by 252 trading days.

use crate::domain::error::FrontierError;
use crate::domain::price_table::PriceTable;
use chrono::NaiveDate;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Daily log-returns, one row per date after the first.
#[derive(Debug, Clone, PartialEq)]
pub struct LogReturnSeries {
    pub symbols: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<Vec<f64>>,
}

/// Annualized mean-return vector and covariance matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStats {
    symbols: Vec<String>,
    mean_returns: Vec<f64>,
    covariance: Vec<Vec<f64>>,
}

impl ReturnStats {
    /// Build stats from precomputed annualized values.
    pub fn new(
        symbols: Vec<String>,
        mean_returns: Vec<f64>,
        covariance: Vec<Vec<f64>>,
    ) -> Result<Self, FrontierError> {
        let n = symbols.len();
        if n == 0 {
            return Err(FrontierError::InsufficientData {
                stage: "return statistics".into(),
                rows: 0,
                assets: 0,
            });
        }
        if mean_returns.len() != n {
            return Err(FrontierError::dimension_mismatch(
                "mean returns",
                n,
                mean_returns.len(),
            ));
        }
        if covariance.len() != n {
            return Err(FrontierError::dimension_mismatch(
                "covariance rows",
                n,
                covariance.len(),
            ));
        }
        if let Some(row) = covariance.iter().find(|row| row.len() != n) {
            return Err(FrontierError::dimension_mismatch(
                "covariance columns",
                n,
                row.len(),
            ));
        }
        Ok(Self {
            symbols,
            mean_returns,
            covariance,
        })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn mean_returns(&self) -> &[f64] {
        &self.mean_returns
    }

    pub fn covariance(&self) -> &[Vec<f64>] {
        &self.covariance
    }

    pub fn asset_count(&self) -> usize {
        self.symbols.len()
    }
}

fn check_shape(table: &PriceTable) -> Result<(), FrontierError> {
    if table.row_count() < 2 || table.asset_count() == 0 {
        return Err(FrontierError::InsufficientData {
            stage: "return statistics".into(),
            rows: table.row_count(),
            assets: table.asset_count(),
        });
    }
    Ok(())
}

pub fn log_returns(table: &PriceTable) -> Result<LogReturnSeries, FrontierError> {
    check_shape(table)?;

    let rows = table
        .rows()
        .windows(2)
        .map(|w| {
            w[1].iter()
                .zip(&w[0])
                .map(|(curr, prev)| (curr / prev).ln())
                .collect()
        })
        .collect();

    Ok(LogReturnSeries {
        symbols: table.symbols().to_vec(),
        dates: table.dates()[1..].to_vec(),
        rows,
    })
}

pub fn compute_return_stats(table: &PriceTable) -> Result<ReturnStats, FrontierError> {
    let series = log_returns(table)?;
    let n = series.symbols.len();
    let count = series.rows.len() as f64;

    let mut means = vec![0.0; n];
    for row in &series.rows {
        for (j, r) in row.iter().enumerate() {
            means[j] += r;
        }
    }
    for m in &mut means {
        *m /= count;
    }

    let mut cov = vec![vec![0.0; n]; n];
    for row in &series.rows {
        for i in 0..n {
            let di = row[i] - means[i];
            for j in i..n {
                cov[i][j] += di * (row[j] - means[j]);
            }
        }
    }

    // One return row has no sample variance; the floored denominator yields zero.
    let denom = (count - 1.0).max(1.0);
    for i in 0..n {
        for j in i..n {
            let v = cov[i][j] / denom * TRADING_DAYS_PER_YEAR;
            cov[i][j] = v;
            cov[j][i] = v;
        }
    }

    let mean_returns: Vec<f64> = means.iter().map(|m| m * TRADING_DAYS_PER_YEAR).collect();

    log::debug!(
        "return stats: {} assets over {} return rows",
        n,
        series.rows.len()
    );

    ReturnStats::new(series.symbols, mean_returns, cov)
}
