//! CSV report adapter: chart-ready series for plotting collaborators.
//!
//! Writes three files into the output directory:
//! - `frontier.csv`: one row per Monte-Carlo draw (volatility, return, sharpe, weights)
//! - `levels.csv`:   normalized price levels, one column per symbol
//! - `weights.csv`:  max-Sharpe, min-variance and baseline allocations with their stats

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::FrontierError;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

pub const FRONTIER_FILE: &str = "frontier.csv";
pub const LEVELS_FILE: &str = "levels.csv";
pub const WEIGHTS_FILE: &str = "weights.csv";

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn csv_error(path: &Path, e: impl std::fmt::Display) -> FrontierError {
    FrontierError::Io(std::io::Error::other(format!(
        "failed to write {}: {}",
        path.display(),
        e
    )))
}

fn write_frontier(report: &AnalysisReport, path: &Path) -> Result<(), FrontierError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;

    let mut header = vec![
        "volatility".to_string(),
        "expected_return".to_string(),
        "sharpe_ratio".to_string(),
    ];
    header.extend(report.symbols().iter().map(|s| format!("w_{s}")));
    wtr.write_record(&header).map_err(|e| csv_error(path, e))?;

    for p in &report.frontier.points {
        let mut row = vec![
            p.volatility.to_string(),
            p.expected_return.to_string(),
            p.sharpe_ratio.to_string(),
        ];
        row.extend(p.weights.iter().map(|w| w.to_string()));
        wtr.write_record(&row).map_err(|e| csv_error(path, e))?;
    }

    wtr.flush()?;
    Ok(())
}

fn write_levels(report: &AnalysisReport, path: &Path) -> Result<(), FrontierError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;

    let mut header = vec!["date".to_string()];
    header.extend(report.levels.iter().map(|l| l.symbol.clone()));
    wtr.write_record(&header).map_err(|e| csv_error(path, e))?;

    let rows = report.levels.first().map(|l| l.points.len()).unwrap_or(0);
    for i in 0..rows {
        let mut row = vec![report.levels[0].points[i].0.format("%Y-%m-%d").to_string()];
        row.extend(report.levels.iter().map(|l| l.points[i].1.to_string()));
        wtr.write_record(&row).map_err(|e| csv_error(path, e))?;
    }

    wtr.flush()?;
    Ok(())
}

fn write_weights(report: &AnalysisReport, path: &Path) -> Result<(), FrontierError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;

    let mut header = vec![
        "portfolio".to_string(),
        "expected_return".to_string(),
        "volatility".to_string(),
        "sharpe_ratio".to_string(),
    ];
    header.extend(report.symbols().iter().cloned());
    wtr.write_record(&header).map_err(|e| csv_error(path, e))?;

    let baseline_pct: Vec<f64> = report.baseline_weights.iter().map(|w| w * 100.0).collect();
    let baseline_stats = report.baseline.rounded(4);
    let portfolios = [
        ("max_sharpe", &report.max_sharpe.weights, report.max_sharpe.stats),
        ("min_variance", &report.min_variance.weights, report.min_variance.stats),
        ("baseline", &baseline_pct, baseline_stats),
    ];

    for (name, weights, stats) in portfolios {
        let mut row = vec![
            name.to_string(),
            stats.expected_return.to_string(),
            stats.volatility.to_string(),
            stats.sharpe_ratio.to_string(),
        ];
        row.extend(weights.iter().map(|w| w.to_string()));
        wtr.write_record(&row).map_err(|e| csv_error(path, e))?;
    }

    wtr.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &AnalysisReport, output_dir: &Path) -> Result<(), FrontierError> {
        fs::create_dir_all(output_dir)?;
        write_frontier(report, &output_dir.join(FRONTIER_FILE))?;
        write_levels(report, &output_dir.join(LEVELS_FILE))?;
        write_weights(report, &output_dir.join(WEIGHTS_FILE))?;
        log::info!("report written to {}", output_dir.display());
        Ok(())
    }
}
