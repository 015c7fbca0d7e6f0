//! Adjusted-close price table indexed by trading date.
//!
//! One column per resolved asset, one row per trading date. The table is
//! read-only once built; every downstream statistic is derived from it.

use crate::domain::error::FrontierError;
use chrono::NaiveDate;
use std::collections::HashSet;

/// A single adjusted-close observation for one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adj_close: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    symbols: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<f64>>,
}

/// Price path rebased to 100 at the first date.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSeries {
    pub symbol: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl PriceTable {
    /// Build a table from symbols, dates and row-major prices.
    ///
    /// Symbols are upper-cased and must be unique. Dates must be strictly
    /// increasing and every row must hold one positive, finite price per symbol.
    pub fn new(
        symbols: Vec<String>,
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, FrontierError> {
        let symbols: Vec<String> = symbols.into_iter().map(|s| s.trim().to_uppercase()).collect();

        let mut seen = HashSet::new();
        for symbol in &symbols {
            if symbol.is_empty() {
                return Err(FrontierError::invalid_parameter("symbols", "empty symbol"));
            }
            if !seen.insert(symbol.as_str()) {
                return Err(FrontierError::invalid_parameter(
                    "symbols",
                    format!("duplicate symbol {symbol}"),
                ));
            }
        }

        if dates.len() != rows.len() {
            return Err(FrontierError::dimension_mismatch(
                "price table rows",
                dates.len(),
                rows.len(),
            ));
        }

        if let Some(w) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(FrontierError::invalid_parameter(
                "dates",
                format!("dates must be strictly increasing ({} then {})", w[0], w[1]),
            ));
        }

        for (date, row) in dates.iter().zip(&rows) {
            if row.len() != symbols.len() {
                return Err(FrontierError::dimension_mismatch(
                    &format!("price row {date}"),
                    symbols.len(),
                    row.len(),
                ));
            }
            for (symbol, &value) in symbols.iter().zip(row) {
                if !value.is_finite() || value <= 0.0 {
                    return Err(FrontierError::InvalidPrice {
                        symbol: symbol.clone(),
                        date: *date,
                        value,
                    });
                }
            }
        }

        Ok(Self {
            symbols,
            dates,
            rows,
        })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn asset_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.symbols.len() {
            return None;
        }
        Some(self.rows.iter().map(|row| row[index]).collect())
    }

    /// price / price[0] * 100 for every asset.
    pub fn normalized_levels(&self) -> Vec<LevelSeries> {
        let Some(first) = self.rows.first() else {
            return self
                .symbols
                .iter()
                .map(|s| LevelSeries {
                    symbol: s.clone(),
                    points: Vec::new(),
                })
                .collect();
        };

        self.symbols
            .iter()
            .enumerate()
            .map(|(j, symbol)| LevelSeries {
                symbol: symbol.clone(),
                points: self
                    .dates
                    .iter()
                    .zip(&self.rows)
                    .map(|(date, row)| (*date, row[j] / first[j] * 100.0))
                    .collect(),
            })
            .collect()
    }
}
