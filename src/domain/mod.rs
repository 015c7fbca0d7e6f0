//! Core engine types and logic.

pub mod analysis;
pub mod config_validation;
pub mod constraints;
pub mod error;
pub mod frontier;
pub mod ingestion;
pub mod optimizer;
pub mod price_table;
pub mod returns;
pub mod solver;
pub mod statistics;
