//! CSV price adapter: one `<SYMBOL>.csv` file per symbol.
//!
//! Files need a header row with a date column (`date`) and a price column
//! (`adj_close` / `Adj Close`, falling back to `close`). Header matching
//! ignores case and treats spaces as underscores, so Yahoo-style exports
//! load unchanged.

use crate::domain::error::FrontierError;
use crate::domain::price_table::PricePoint;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace(' ', "_")
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| {
        headers
            .iter()
            .position(|h| normalize_header(h) == *name)
    })
}

impl PricePort for CsvPriceAdapter {
    fn fetch_adjusted_close(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, FrontierError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| FrontierError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| FrontierError::Data {
                reason: format!("CSV header error in {}: {}", path.display(), e),
            })?
            .clone();

        let date_col = find_column(&headers, &["date"]).ok_or_else(|| FrontierError::Data {
            reason: format!("missing date column in {}", path.display()),
        })?;
        let price_col = find_column(&headers, &["adj_close", "adjclose", "close"]).ok_or_else(|| {
            FrontierError::Data {
                reason: format!("missing adj_close/close column in {}", path.display()),
            }
        })?;

        let mut points = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| FrontierError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = record.get(date_col).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                FrontierError::Data {
                    reason: format!("invalid date '{}' on row {}: {}", date_str, line + 1, e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let price_str = record.get(price_col).unwrap_or_default().trim();
            let adj_close: f64 = price_str.parse().map_err(|e| FrontierError::Data {
                reason: format!("invalid price '{}' on row {}: {}", price_str, line + 1, e),
            })?;

            points.push(PricePoint { date, adj_close });
        }

        points.sort_by_key(|p| p.date);
        log::debug!("{}: read {} rows from {}", symbol, points.len(), path.display());
        Ok(points)
    }

    fn list_symbols(&self) -> Result<Vec<String>, FrontierError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| FrontierError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FrontierError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    symbols.push(stem.to_uppercase());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
