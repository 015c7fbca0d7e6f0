//! CLI integration tests for the analyze command orchestration.
//!
//! Tests cover:
//! - Request building from INI files and command-line overrides
//! - Baseline alignment when symbols are dropped
//! - The analysis pipeline with MockPricePort
//! - End-to-end runs over CSV files on disk

mod common;

use common::*;
use frontier::adapters::csv_adapter::CsvPriceAdapter;
use frontier::adapters::csv_report_adapter::{
    CsvReportAdapter, FRONTIER_FILE, LEVELS_FILE, WEIGHTS_FILE,
};
use frontier::adapters::file_config_adapter::FileConfigAdapter;
use frontier::cli::{self, Overrides};
use frontier::domain::config_validation::validate_analysis_config;
use frontier::domain::error::FrontierError;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// `ExitCode` has no `PartialEq`, so compare through its debug form.
fn assert_exit_code(code: ExitCode, expected: u8) {
    assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::from(expected)));
}

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[analysis]
symbols = A, B
start_date = 2024-01-01
end_date = 2024-12-31
simulations = 40
seed = 7
baseline_weights = 0.6, 0.4

[data]
dir = /var/prices

[optimizer]
max_iterations = 5000
tolerance = 1e-10

[report]
output_dir = /tmp/frontier-report
"#;

mod request_building {
    use super::*;

    #[test]
    fn reads_every_section() {
        let file = write_temp_ini(VALID_INI);
        let config = FileConfigAdapter::from_file(file.path()).unwrap();
        let request = cli::build_request(&config, &Overrides::default()).unwrap();

        assert_eq!(request.symbols, vec!["A", "B"]);
        assert_eq!(request.start_date, date("2024-01-01"));
        assert_eq!(request.end_date, date("2024-12-31"));
        assert_eq!(request.data_dir, PathBuf::from("/var/prices"));
        assert_eq!(request.output_dir, Some(PathBuf::from("/tmp/frontier-report")));
        assert_eq!(request.analysis.simulations, 40);
        assert_eq!(request.analysis.seed, Some(7));
        assert_eq!(request.analysis.baseline_weights, Some(vec![0.6, 0.4]));
        assert_eq!(request.analysis.solver.max_iterations, 5000);
        assert_eq!(request.analysis.solver.tolerance, 1e-10);
    }

    #[test]
    fn overrides_take_precedence() {
        let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = Overrides {
            start: Some("2024-02-01".into()),
            data_dir: Some(PathBuf::from("/elsewhere")),
            simulations: Some(5),
            seed: Some(1),
            output: Some(PathBuf::from("/out")),
            ..Overrides::default()
        };
        let request = cli::build_request(&config, &overrides).unwrap();

        assert_eq!(request.start_date, date("2024-02-01"));
        assert_eq!(request.data_dir, PathBuf::from("/elsewhere"));
        assert_eq!(request.output_dir, Some(PathBuf::from("/out")));
        assert_eq!(request.analysis.simulations, 5);
        assert_eq!(request.analysis.seed, Some(1));
    }

    #[test]
    fn defaults_apply_when_keys_absent() {
        let ini = "[analysis]\nsymbols = a\nstart_date = 2024-01-01\nend_date = 2024-06-01\n[data]\ndir = prices\n";
        let config = FileConfigAdapter::from_string(ini).unwrap();
        let request = cli::build_request(&config, &Overrides::default()).unwrap();

        assert_eq!(request.symbols, vec!["A"]);
        assert_eq!(request.analysis.simulations, 500);
        assert_eq!(request.analysis.seed, None);
        assert_eq!(request.analysis.baseline_weights, None);
        assert_eq!(request.output_dir, None);
    }

    #[test]
    fn missing_data_dir_is_config_error() {
        let ini = "[analysis]\nsymbols = A\nstart_date = 2024-01-01\nend_date = 2024-06-01\n";
        let config = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::build_request(&config, &Overrides::default()).unwrap_err();
        assert!(matches!(err, FrontierError::ConfigMissing { ref key, .. } if key == "dir"));
    }

    #[test]
    fn symbol_override_must_match_baseline_count() {
        let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = Overrides {
            symbols: Some("A,B,C".into()),
            ..Overrides::default()
        };
        assert!(matches!(
            cli::build_request(&config, &overrides),
            Err(FrontierError::ConfigInvalid { key, .. }) if key == "baseline_weights"
        ));
    }

    #[test]
    fn inverted_override_window_is_rejected() {
        let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = Overrides {
            end: Some("2023-01-01".into()),
            ..Overrides::default()
        };
        assert!(cli::build_request(&config, &overrides).is_err());
    }

    #[test]
    fn flags_fill_keys_missing_from_ini() {
        let config = FileConfigAdapter::from_string("[data]\ndir = prices\n").unwrap();
        let overrides = Overrides {
            symbols: Some("aapl,goog".into()),
            start: Some("2023-01-01".into()),
            end: Some("2023-06-30".into()),
            ..Overrides::default()
        };
        let request = cli::build_request(&config, &overrides).unwrap();

        assert_eq!(request.symbols, vec!["AAPL", "GOOG"]);
        assert_eq!(request.start_date, date("2023-01-01"));
        assert_eq!(request.end_date, date("2023-06-30"));
    }

    #[test]
    fn merged_values_are_validated() {
        let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = Overrides {
            symbols: Some("A,,B".into()),
            ..Overrides::default()
        };
        assert!(matches!(
            cli::build_request(&config, &overrides),
            Err(FrontierError::ConfigInvalid { key, .. }) if key == "symbols"
        ));
    }

    #[test]
    fn valid_ini_passes_validation() {
        let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
        assert!(validate_analysis_config(&config).is_ok());
    }
}

mod baseline_alignment {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn renormalizes_over_resolved_symbols() {
        let aligned = cli::align_baseline(
            &names(&["A", "B", "C"]),
            &[0.5, 0.25, 0.25],
            &names(&["A", "C"]),
        )
        .unwrap();
        assert!((aligned[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((aligned[1] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn zero_weight_remainder_falls_back() {
        let aligned = cli::align_baseline(&names(&["A", "B"]), &[1.0, 0.0], &names(&["B"]));
        assert_eq!(aligned, None);
    }
}

mod analysis_pipeline {
    use super::*;

    fn request(output: Option<PathBuf>) -> cli::AnalysisRequest {
        let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let mut request = cli::build_request(&config, &Overrides::default()).unwrap();
        request.symbols = vec!["A".into(), "GONE".into(), "B".into()];
        request.analysis.baseline_weights = Some(vec![0.5, 0.2, 0.3]);
        request.output_dir = output;
        request
    }

    fn port() -> MockPricePort {
        let start = date("2024-01-01");
        MockPricePort::new()
            .with_prices("A", start, &PRICES_A)
            .with_prices("B", start, &PRICES_B)
            .with_error("GONE", "no such file")
    }

    #[test]
    fn drops_missing_symbols_and_aligns_baseline() {
        let reporter = RecordingReportPort::new();
        let (ingestion, report) =
            cli::run_analysis_pipeline(&port(), &reporter, &request(None)).unwrap();

        assert_eq!(ingestion.dropped_names(), vec!["GONE"]);
        assert_eq!(report.symbols(), &["A", "B"]);
        assert!((report.baseline_weights[0] - 0.625).abs() < 1e-12);
        assert!((report.baseline_weights[1] - 0.375).abs() < 1e-12);
        assert_eq!(report.max_sharpe.weights, vec![59.5, 40.5]);
        assert!(reporter.writes.borrow().is_empty());
    }

    #[test]
    fn writes_report_when_output_is_set() {
        let reporter = RecordingReportPort::new();
        let out = PathBuf::from("/tmp/recorded");
        cli::run_analysis_pipeline(&port(), &reporter, &request(Some(out.clone()))).unwrap();

        let writes = reporter.writes.borrow();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, out);
        assert_eq!(writes[0].1, vec!["A", "B"]);
    }

    #[test]
    fn all_symbols_missing_fails() {
        let reporter = RecordingReportPort::new();
        let mut req = request(None);
        req.symbols = vec!["GONE".into()];
        req.analysis.baseline_weights = None;
        let err = cli::run_analysis_pipeline(&port(), &reporter, &req).unwrap_err();
        assert_exit_code(ExitCode::from(&err), 5);
    }
}

mod end_to_end {
    use super::*;
    use std::fs;

    fn write_prices(dir: &std::path::Path, symbol: &str, prices: &[f64]) {
        let mut csv = String::from("Date,Close,Adj Close\n");
        for p in make_points(date("2024-01-01"), prices) {
            csv.push_str(&format!("{},{},{}\n", p.date, p.adj_close + 1.0, p.adj_close));
        }
        fs::write(dir.join(format!("{symbol}.csv")), csv).unwrap();
    }

    #[test]
    fn csv_files_to_report() {
        let data = tempfile::TempDir::new().unwrap();
        let out = tempfile::TempDir::new().unwrap();
        write_prices(data.path(), "A", &PRICES_A);
        write_prices(data.path(), "B", &PRICES_B);

        let ini = format!(
            "[analysis]\nsymbols = A,B\nstart_date = 2024-01-01\nend_date = 2024-12-31\nsimulations = 30\nseed = 1\n[data]\ndir = {}\n[report]\noutput_dir = {}\n",
            data.path().display(),
            out.path().display()
        );
        let config = FileConfigAdapter::from_string(&ini).unwrap();
        let request = cli::build_request(&config, &Overrides::default()).unwrap();

        let prices = CsvPriceAdapter::new(request.data_dir.clone());
        let (_, report) =
            cli::run_analysis_pipeline(&prices, &CsvReportAdapter::new(), &request).unwrap();

        assert_eq!(report.max_sharpe.weights, vec![59.5, 40.5]);
        let frontier = fs::read_to_string(out.path().join(FRONTIER_FILE)).unwrap();
        assert_eq!(frontier.lines().count(), 31);
        assert!(out.path().join(LEVELS_FILE).exists());
        let weights = fs::read_to_string(out.path().join(WEIGHTS_FILE)).unwrap();
        assert!(weights.contains("max_sharpe,377.28,22.64,16.66,59.5,40.5"));
    }

    #[test]
    fn validate_command_rejects_bad_config() {
        let file = write_temp_ini("[analysis]\nsymbols = A\nstart_date = 2024-05-01\nend_date = 2024-01-01\n");
        let code = cli::run(cli::Cli {
            command: cli::Command::Validate {
                config: file.path().to_path_buf(),
            },
        });
        assert_exit_code(code, 2);
    }

    #[test]
    fn missing_config_file_fails() {
        let code = cli::run(cli::Cli {
            command: cli::Command::Validate {
                config: PathBuf::from("/nonexistent/frontier.ini"),
            },
        });
        assert_exit_code(code, 2);
    }

    #[test]
    fn list_symbols_reads_directory() {
        let data = tempfile::TempDir::new().unwrap();
        write_prices(data.path(), "ZZZ", &PRICES_A);
        let code = cli::run(cli::Cli {
            command: cli::Command::ListSymbols {
                data_dir: data.path().to_path_buf(),
            },
        });
        assert_exit_code(code, 0);
    }
}
