//! Price source port trait.

use crate::domain::error::FrontierError;
use crate::domain::price_table::PricePoint;
use chrono::NaiveDate;

/// Supplies adjusted closing prices for one symbol at a time.
pub trait PricePort {
    /// Observations within [start_date, end_date], sorted by date.
    fn fetch_adjusted_close(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, FrontierError>;

    fn list_symbols(&self) -> Result<Vec<String>, FrontierError>;
}
