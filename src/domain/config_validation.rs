//! Configuration validation.
//!
//! Validates every analysis setting before any price data is read.

use crate::domain::error::FrontierError;
use crate::domain::ingestion::parse_symbols;
use crate::domain::solver::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), FrontierError> {
    validate_symbols(config)?;
    validate_dates(config)?;
    validate_simulations(config)?;
    validate_seed(config)?;
    validate_baseline_weights(config)?;
    validate_optimizer(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> FrontierError {
    FrontierError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), FrontierError> {
    match config.get_string("analysis", "symbols") {
        Some(s) if !s.trim().is_empty() => parse_symbols(&s)
            .map(|_| ())
            .map_err(|e| invalid("analysis", "symbols", e.to_string())),
        _ => Err(FrontierError::ConfigMissing {
            section: "analysis".to_string(),
            key: "symbols".to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), FrontierError> {
    let start = parse_date(config.get_string("analysis", "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string("analysis", "end_date").as_deref(), "end_date")?;

    if start >= end {
        return Err(invalid(
            "analysis",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, FrontierError> {
    match value {
        None => Err(FrontierError::ConfigMissing {
            section: "analysis".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                "analysis",
                field,
                format!("invalid {field} format, expected YYYY-MM-DD"),
            )
        }),
    }
}

fn validate_simulations(config: &dyn ConfigPort) -> Result<(), FrontierError> {
    if let Some(raw) = config.get_string("analysis", "simulations") {
        match raw.trim().parse::<i64>() {
            Ok(n) if n >= 1 => {}
            _ => {
                return Err(invalid(
                    "analysis",
                    "simulations",
                    "simulations must be a positive integer",
                ));
            }
        }
    }
    Ok(())
}

fn validate_seed(config: &dyn ConfigPort) -> Result<(), FrontierError> {
    if let Some(raw) = config.get_string("analysis", "seed") {
        if raw.trim().parse::<u64>().is_err() {
            return Err(invalid(
                "analysis",
                "seed",
                "seed must be a non-negative integer",
            ));
        }
    }
    Ok(())
}

/// Parse a comma-separated weight list.
pub fn parse_weights(raw: &str) -> Result<Vec<f64>, FrontierError> {
    raw.split(',')
        .map(|token| {
            let token = token.trim();
            match token.parse::<f64>() {
                Ok(w) if w.is_finite() && w >= 0.0 => Ok(w),
                _ => Err(invalid(
                    "analysis",
                    "baseline_weights",
                    format!("invalid weight '{token}'"),
                )),
            }
        })
        .collect()
}

fn validate_baseline_weights(config: &dyn ConfigPort) -> Result<(), FrontierError> {
    let Some(raw) = config.get_string("analysis", "baseline_weights") else {
        return Ok(());
    };
    if raw.trim().is_empty() {
        return Ok(());
    }

    let weights = parse_weights(&raw)?;
    let symbols = config
        .get_string("analysis", "symbols")
        .map(|s| parse_symbols(&s))
        .transpose()?
        .unwrap_or_default();

    if weights.len() != symbols.len() {
        return Err(invalid(
            "analysis",
            "baseline_weights",
            format!(
                "expected {} weights (one per symbol), got {}",
                symbols.len(),
                weights.len()
            ),
        ));
    }
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > 1e-6 {
        return Err(invalid(
            "analysis",
            "baseline_weights",
            format!("weights must sum to 1, got {total}"),
        ));
    }
    Ok(())
}

fn validate_optimizer(config: &dyn ConfigPort) -> Result<(), FrontierError> {
    if config.get_int("optimizer", "max_iterations", DEFAULT_MAX_ITERATIONS as i64) < 1 {
        return Err(invalid(
            "optimizer",
            "max_iterations",
            "max_iterations must be at least 1",
        ));
    }
    let tolerance = config.get_double("optimizer", "tolerance", DEFAULT_TOLERANCE);
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(invalid(
            "optimizer",
            "tolerance",
            "tolerance must be positive",
        ));
    }
    Ok(())
}
