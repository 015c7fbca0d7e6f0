#![allow(dead_code)]

use chrono::NaiveDate;
use frontier::domain::analysis::AnalysisReport;
use frontier::domain::error::FrontierError;
use frontier::domain::price_table::{PricePoint, PriceTable};
use frontier::ports::price_port::PricePort;
use frontier::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct MockPricePort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, symbol: &str, start: NaiveDate, prices: &[f64]) -> Self {
        self.data
            .insert(symbol.to_string(), make_points(start, prices));
        self
    }

    pub fn with_points(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_adjusted_close(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, FrontierError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(FrontierError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|points| {
                points
                    .iter()
                    .copied()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, FrontierError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Records every write instead of touching the filesystem.
pub struct RecordingReportPort {
    pub writes: RefCell<Vec<(PathBuf, Vec<String>)>>,
}

impl RecordingReportPort {
    pub fn new() -> Self {
        Self {
            writes: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for RecordingReportPort {
    fn write(&self, report: &AnalysisReport, output_dir: &Path) -> Result<(), FrontierError> {
        self.writes
            .borrow_mut()
            .push((output_dir.to_path_buf(), report.symbols().to_vec()));
        Ok(())
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Consecutive calendar days starting at `start`, one per price.
pub fn make_points(start: NaiveDate, prices: &[f64]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &adj_close)| PricePoint {
            date: start + chrono::Duration::days(i as i64),
            adj_close,
        })
        .collect()
}

pub fn make_table(symbols: &[&str], columns: &[&[f64]]) -> PriceTable {
    let rows = columns.first().map(|c| c.len()).unwrap_or(0);
    let start = date("2024-01-01");
    PriceTable::new(
        symbols.iter().map(|s| s.to_string()).collect(),
        (0..rows)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect(),
        (0..rows)
            .map(|i| columns.iter().map(|c| c[i]).collect())
            .collect(),
    )
    .unwrap()
}

pub const PRICES_A: [f64; 4] = [100.0, 102.0, 101.0, 105.0];
pub const PRICES_B: [f64; 4] = [50.0, 49.0, 51.0, 52.0];

/// The two-asset table used for the hand-checked reference values.
pub fn two_asset_table() -> PriceTable {
    make_table(&["A", "B"], &[&PRICES_A, &PRICES_B])
}

/// A deterministic pseudo-random walk, positive by construction.
pub fn random_walk(start: f64, steps: usize, seed: u64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut price = start;
    let mut out = Vec::with_capacity(steps);
    for _ in 0..steps {
        out.push(price);
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let u = (state >> 11) as f64 / (1u64 << 53) as f64;
        price *= 1.0 + (u - 0.48) * 0.04;
    }
    out
}

pub fn five_asset_table() -> PriceTable {
    let cols: Vec<Vec<f64>> = (0..5)
        .map(|i| random_walk(50.0 + 10.0 * i as f64, 60, 17 + i as u64))
        .collect();
    let refs: Vec<&[f64]> = cols.iter().map(|c| c.as_slice()).collect();
    make_table(&["AAA", "BBB", "CCC", "DDD", "EEE"], &refs)
}
