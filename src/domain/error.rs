//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for the frontier engine and its adapters.
#[derive(Debug, thiserror::Error)]
pub enum FrontierError {
    #[error("insufficient data for {stage}: have {rows} rows and {assets} assets, need at least 2 rows and 1 asset")]
    InsufficientData {
        stage: String,
        rows: usize,
        assets: usize,
    },

    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("invalid price for {symbol} on {date}: {value}")]
    InvalidPrice {
        symbol: String,
        date: NaiveDate,
        value: f64,
    },

    #[error("{objective} optimization diverged after {iterations} iterations: {reason}")]
    OptimizationDiverged {
        objective: String,
        iterations: usize,
        reason: String,
    },

    #[error("price data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FrontierError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        FrontierError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        FrontierError::DimensionMismatch {
            context: context.to_string(),
            expected,
            actual,
        }
    }
}

impl From<&FrontierError> for std::process::ExitCode {
    fn from(err: &FrontierError) -> Self {
        let code: u8 = match err {
            FrontierError::Io(_) => 1,
            FrontierError::ConfigParse { .. }
            | FrontierError::ConfigMissing { .. }
            | FrontierError::ConfigInvalid { .. } => 2,
            FrontierError::Data { .. } | FrontierError::InvalidPrice { .. } => 3,
            FrontierError::InvalidParameter { .. } | FrontierError::DimensionMismatch { .. } => 4,
            FrontierError::InsufficientData { .. } => 5,
            FrontierError::OptimizationDiverged { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
