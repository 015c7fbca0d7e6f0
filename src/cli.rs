//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::{AnalysisConfig, AnalysisReport, analyze};
use crate::domain::config_validation::{parse_date, parse_weights, validate_analysis_config};
use crate::domain::error::FrontierError;
use crate::domain::frontier::DEFAULT_SIMULATIONS;
use crate::domain::ingestion::{IngestionResult, ingest, parse_symbols};
use crate::domain::optimizer::OptimizationResult;
use crate::domain::solver::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, SolverConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "frontier", about = "Efficient-frontier portfolio analytics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute return statistics, the frontier sweep and optimal allocations
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated symbols, overriding [analysis] symbols
        #[arg(long)]
        symbols: Option<String>,
        /// First date (YYYY-MM-DD), overriding [analysis] start_date
        #[arg(long)]
        start: Option<String>,
        /// Last date (YYYY-MM-DD), overriding [analysis] end_date
        #[arg(long)]
        end: Option<String>,
        /// CSV price directory, overriding [data] dir
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        simulations: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Directory for frontier/levels/weights CSV files
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate an analysis configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in a CSV price directory
    ListSymbols {
        #[arg(long)]
        data_dir: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub symbols: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub simulations: Option<usize>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
}

/// Everything one analysis run needs, resolved from config and overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub data_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub analysis: AnalysisConfig,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            config,
            symbols,
            start,
            end,
            data_dir,
            simulations,
            seed,
            output,
        } => {
            let overrides = Overrides {
                symbols,
                start,
                end,
                data_dir,
                simulations,
                seed,
                output,
            };
            run_analyze(&config, &overrides)
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { data_dir } => run_list_symbols(&data_dir),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

/// Config view in which command-line overrides shadow the INI values.
pub struct LayeredConfig<'a> {
    base: &'a dyn ConfigPort,
    overrides: Vec<(&'static str, &'static str, String)>,
}

impl<'a> LayeredConfig<'a> {
    pub fn new(base: &'a dyn ConfigPort, overrides: &Overrides) -> Self {
        let path = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());
        let layers = [
            ("analysis", "symbols", overrides.symbols.clone()),
            ("analysis", "start_date", overrides.start.clone()),
            ("analysis", "end_date", overrides.end.clone()),
            ("analysis", "simulations", overrides.simulations.map(|n| n.to_string())),
            ("analysis", "seed", overrides.seed.map(|s| s.to_string())),
            ("data", "dir", path(&overrides.data_dir)),
            ("report", "output_dir", path(&overrides.output)),
        ];
        Self {
            base,
            overrides: layers
                .into_iter()
                .filter_map(|(section, key, value)| value.map(|v| (section, key, v)))
                .collect(),
        }
    }

    fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        self.overrides
            .iter()
            .find(|(s, k, _)| *s == section && *k == key)
            .map(|(_, _, v)| v.as_str())
    }
}

impl ConfigPort for LayeredConfig<'_> {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.lookup(section, key)
            .map(str::to_string)
            .or_else(|| self.base.get_string(section, key))
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        match self.lookup(section, key) {
            Some(v) => v.trim().parse().unwrap_or(default),
            None => self.base.get_int(section, key, default),
        }
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        match self.lookup(section, key) {
            Some(v) => v.trim().parse().unwrap_or(default),
            None => self.base.get_double(section, key, default),
        }
    }
}

/// Merge overrides into the config, validate the result and resolve a request.
pub fn build_request(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<AnalysisRequest, FrontierError> {
    let config = LayeredConfig::new(config, overrides);
    validate_analysis_config(&config)?;

    let symbols = parse_symbols(&config.get_string("analysis", "symbols").unwrap_or_default())?;
    let start_date = parse_date(
        config.get_string("analysis", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(config.get_string("analysis", "end_date").as_deref(), "end_date")?;

    let data_dir = config
        .get_string("data", "dir")
        .map(PathBuf::from)
        .ok_or_else(|| FrontierError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        })?;
    let output_dir = config.get_string("report", "output_dir").map(PathBuf::from);

    let simulations =
        config.get_int("analysis", "simulations", DEFAULT_SIMULATIONS as i64) as usize;
    let seed = config
        .get_string("analysis", "seed")
        .and_then(|s| s.trim().parse::<u64>().ok());

    let baseline_weights = match config.get_string("analysis", "baseline_weights") {
        Some(raw) if !raw.trim().is_empty() => Some(parse_weights(&raw)?),
        _ => None,
    };

    let solver = SolverConfig {
        max_iterations: config.get_int("optimizer", "max_iterations", DEFAULT_MAX_ITERATIONS as i64)
            as usize,
        tolerance: config.get_double("optimizer", "tolerance", DEFAULT_TOLERANCE),
    };

    Ok(AnalysisRequest {
        symbols,
        start_date,
        end_date,
        data_dir,
        output_dir,
        analysis: AnalysisConfig {
            simulations,
            seed,
            baseline_weights,
            solver,
        },
    })
}

/// Keep the baseline weights of resolved symbols, renormalized to sum to 1.
pub fn align_baseline(
    requested: &[String],
    weights: &[f64],
    resolved: &[String],
) -> Option<Vec<f64>> {
    let kept: Vec<f64> = resolved
        .iter()
        .filter_map(|s| {
            requested
                .iter()
                .position(|r| r == s)
                .and_then(|i| weights.get(i).copied())
        })
        .collect();
    let total: f64 = kept.iter().sum();
    if kept.len() != resolved.len() || total <= 0.0 {
        return None;
    }
    Some(kept.into_iter().map(|w| w / total).collect())
}

/// Ingest, analyze and (optionally) write the report.
pub fn run_analysis_pipeline(
    price_port: &dyn PricePort,
    report_port: &dyn ReportPort,
    request: &AnalysisRequest,
) -> Result<(IngestionResult, AnalysisReport), FrontierError> {
    let ingestion = ingest(
        price_port,
        &request.symbols,
        request.start_date,
        request.end_date,
    )?;

    let mut analysis = request.analysis.clone();
    if !ingestion.dropped_symbols.is_empty() {
        if let Some(weights) = &analysis.baseline_weights {
            let aligned = align_baseline(&request.symbols, weights, &ingestion.resolved_symbols);
            if aligned.is_none() {
                log::warn!("baseline weights cover no resolved symbol, using equal weights");
            }
            analysis.baseline_weights = aligned;
        }
    }

    let report = analyze(&ingestion.table, &analysis)?;

    if let Some(dir) = &request.output_dir {
        report_port.write(&report, dir)?;
    }

    Ok((ingestion, report))
}

fn run_analyze(config_path: &Path, overrides: &Overrides) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let request = match build_request(&adapter, overrides) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Analysing {} symbols from {} to {}",
        request.symbols.len(),
        request.start_date,
        request.end_date
    );

    let price_port = CsvPriceAdapter::new(request.data_dir.clone());
    let report_port = CsvReportAdapter::new();

    match run_analysis_pipeline(&price_port, &report_port, &request) {
        Ok((ingestion, report)) => {
            print_summary(&ingestion, &report);
            if let Some(dir) = &request.output_dir {
                eprintln!("\nReport written to: {}", dir.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn print_allocation(title: &str, result: &OptimizationResult) {
    eprintln!("\n=== {title} ===");
    for (symbol, weight) in result.symbols.iter().zip(&result.weights) {
        eprintln!("  {:<8} {:>6.1}%", symbol, weight);
    }
    eprintln!("  Return:     {:.2}", result.stats.expected_return);
    eprintln!("  Volatility: {:.2}", result.stats.volatility);
    eprintln!("  Sharpe:     {:.2}", result.stats.sharpe_ratio);
}

fn print_summary(ingestion: &IngestionResult, report: &AnalysisReport) {
    if !ingestion.dropped_symbols.is_empty() {
        eprintln!(
            "Dropped {} of {} symbols: {}",
            ingestion.dropped_symbols.len(),
            ingestion.requested_count(),
            ingestion.dropped_names().join(", ")
        );
    }

    eprintln!("\n=== Annualized Statistics ===");
    for (i, symbol) in report.symbols().iter().enumerate() {
        eprintln!(
            "  {:<8} return {:>8.4}  volatility {:>8.4}",
            symbol,
            report.stats.mean_returns()[i],
            report.stats.covariance()[i][i].max(0.0).sqrt()
        );
    }

    eprintln!("\n=== Baseline Portfolio ===");
    eprintln!("  Return:     {:.4}", report.baseline.expected_return);
    eprintln!("  Volatility: {:.4}", report.baseline.volatility);
    eprintln!("  Sharpe:     {:.4}", report.baseline.sharpe_ratio);

    if let Some(best) = report.frontier.max_sharpe() {
        eprintln!(
            "\nFrontier sweep: {} portfolios, best sampled Sharpe {:.4}",
            report.frontier.len(),
            best.sharpe_ratio
        );
    }

    print_allocation("Maximum Sharpe Portfolio", &report.max_sharpe);
    print_allocation("Minimum Variance Portfolio", &report.min_variance);
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_analysis_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let symbols = adapter.get_list("analysis", "symbols");
    eprintln!("  symbols: {}", symbols.join(", "));
    eprintln!(
        "  window:  {} to {}",
        adapter.get_string("analysis", "start_date").unwrap_or_default(),
        adapter.get_string("analysis", "end_date").unwrap_or_default()
    );
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(data_dir: &Path) -> ExitCode {
    let adapter = CsvPriceAdapter::new(data_dir.to_path_buf());
    match adapter.list_symbols() {
        Ok(symbols) if symbols.is_empty() => {
            eprintln!("No symbols found in {}", data_dir.display());
            ExitCode::SUCCESS
        }
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            eprintln!("{} symbols found", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
