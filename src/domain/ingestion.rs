//! Price ingestion: resolve requested symbols into one aligned `PriceTable`.
//!
//! Symbols that fail to fetch or return no data are dropped and reported,
//! never silently. Resolved series are aligned on the dates they all share.

use crate::domain::error::FrontierError;
use crate::domain::price_table::PriceTable;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    FetchFailed(String),
    NoData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DroppedSymbol {
    pub symbol: String,
    pub reason: DropReason,
}

#[derive(Debug, Clone)]
pub struct IngestionResult {
    pub table: PriceTable,
    pub resolved_symbols: Vec<String>,
    pub dropped_symbols: Vec<DroppedSymbol>,
}

impl IngestionResult {
    pub fn requested_count(&self) -> usize {
        self.resolved_symbols.len() + self.dropped_symbols.len()
    }

    pub fn dropped_names(&self) -> Vec<&str> {
        self.dropped_symbols
            .iter()
            .map(|d| d.symbol.as_str())
            .collect()
    }
}

/// Split a comma-separated symbol list into unique upper-case symbols.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, FrontierError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(FrontierError::invalid_parameter(
                "symbols",
                "empty token in symbol list",
            ));
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(FrontierError::invalid_parameter(
                "symbols",
                format!("duplicate symbol {symbol}"),
            ));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

pub fn ingest(
    port: &dyn PricePort,
    symbols: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<IngestionResult, FrontierError> {
    let mut resolved: Vec<(String, BTreeMap<NaiveDate, f64>)> = Vec::new();
    let mut dropped = Vec::new();

    for raw in symbols {
        let symbol = raw.trim().to_uppercase();
        match port.fetch_adjusted_close(&symbol, start_date, end_date) {
            Err(e) => {
                log::warn!("dropping {} ({})", symbol, e);
                dropped.push(DroppedSymbol {
                    symbol,
                    reason: DropReason::FetchFailed(e.to_string()),
                });
            }
            Ok(points) if points.is_empty() => {
                log::warn!("dropping {} (no prices between {} and {})", symbol, start_date, end_date);
                dropped.push(DroppedSymbol {
                    symbol,
                    reason: DropReason::NoData,
                });
            }
            Ok(points) => {
                log::info!("{}: {} prices", symbol, points.len());
                let series = points.into_iter().map(|p| (p.date, p.adj_close)).collect();
                resolved.push((symbol, series));
            }
        }
    }

    if resolved.is_empty() {
        return Err(FrontierError::InsufficientData {
            stage: "price ingestion".into(),
            rows: 0,
            assets: 0,
        });
    }

    let all_dates: BTreeSet<NaiveDate> = resolved
        .iter()
        .flat_map(|(_, series)| series.keys().copied())
        .collect();
    let common: Vec<NaiveDate> = all_dates
        .iter()
        .copied()
        .filter(|d| resolved.iter().all(|(_, series)| series.contains_key(d)))
        .collect();

    if common.len() < all_dates.len() {
        log::warn!(
            "{} of {} dates lack a price for every symbol and were dropped",
            all_dates.len() - common.len(),
            all_dates.len()
        );
    }

    let rows: Vec<Vec<f64>> = common
        .iter()
        .map(|d| resolved.iter().map(|(_, series)| series[d]).collect())
        .collect();
    let resolved_symbols: Vec<String> = resolved.into_iter().map(|(s, _)| s).collect();

    if !dropped.is_empty() {
        log::info!(
            "analysing {} of {} requested symbols",
            resolved_symbols.len(),
            resolved_symbols.len() + dropped.len()
        );
    }

    let table = PriceTable::new(resolved_symbols.clone(), common, rows)?;

    Ok(IngestionResult {
        table,
        resolved_symbols,
        dropped_symbols: dropped,
    })
}
