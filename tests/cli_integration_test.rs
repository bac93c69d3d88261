//! CLI integration tests: INI + CSV files on disk through the full run.

mod common;

use bandtrader::adapters::csv_adapter::CsvPriceSource;
use bandtrader::adapters::csv_trade_writer::CsvTradeWriter;
use bandtrader::adapters::file_config_adapter::FileConfigAdapter;
use bandtrader::adapters::html_report::HtmlReportAdapter;
use bandtrader::cli::{self, RunArgs};
use bandtrader::domain::config_validation::build_run_config;
use bandtrader::domain::error::BandtraderError;
use bandtrader::domain::pipeline::run_pipeline;
use bandtrader::domain::signal::SignalRules;
use bandtrader::ports::data_port::PriceSource;
use bandtrader::ports::report_port::ReportPort;
use common::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write_prices(&self, symbol: &str, closes: &[f64]) {
        let data = self.path().join("data");
        fs::create_dir_all(&data).unwrap();
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| make_bar(i as i64, c))
            .collect();
        fs::write(data.join(format!("{symbol}.csv")), csv_content(&bars)).unwrap();
    }

    fn write_config(&self, body: &str) -> PathBuf {
        let path = self.path().join("run.ini");
        let content = format!(
            "[data]\ndir = {}\n\n{}",
            self.path().join("data").display(),
            body
        );
        fs::write(&path, content).unwrap();
        path
    }
}

const RUN_INI: &str = r#"
[run]
symbol = aapl
start_date = 2024-01-01
end_date = 2024-12-31
initial_capital = 10000

[signals]
rules = tiered
"#;

fn args(config: PathBuf) -> RunArgs {
    RunArgs {
        config,
        ..RunArgs::default()
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn build_run_config_from_ini() {
        let adapter = FileConfigAdapter::from_string(RUN_INI).unwrap();
        let config = build_run_config(&adapter).unwrap();
        assert_eq!(config.symbol, "AAPL");
        assert_eq!(config.start_date, date(2024, 1, 1));
        assert_eq!(config.end_date, date(2024, 12, 31));
        assert_eq!(config.initial_capital, 10_000.0);
        assert_eq!(config.signals.rules, SignalRules::Tiered);
    }

    #[test]
    fn missing_config_file_is_parse_error() {
        let err = cli::load_config(Path::new("/nonexistent/run.ini")).err().unwrap();
        assert!(matches!(err, BandtraderError::ConfigParse { .. }));
    }

    #[test]
    fn overrides_replace_ini_values() {
        let ws = Workspace::new();
        let path = ws.write_config(RUN_INI);
        let adapter = cli::load_with_overrides(&RunArgs {
            config: path,
            symbol: Some("msft".into()),
            capital: Some(2_500.0),
            rules: Some("strict".into()),
            ..RunArgs::default()
        })
        .unwrap();

        let config = build_run_config(&adapter).unwrap();
        assert_eq!(config.symbol, "MSFT");
        assert_eq!(config.initial_capital, 2_500.0);
        assert_eq!(config.signals.rules, SignalRules::Strict);
        assert_eq!(config.start_date, date(2024, 1, 1));
    }

    #[test]
    fn invalid_rules_override_rejected() {
        let ws = Workspace::new();
        let path = ws.write_config(RUN_INI);
        let err = cli::execute(&RunArgs {
            rules: Some("reckless".into()),
            ..args(path)
        })
        .err()
        .unwrap();
        assert!(matches!(err, BandtraderError::ConfigInvalid { .. }));
    }
}

mod csv_source {
    use super::*;

    #[test]
    fn reads_symbol_file_within_range() {
        let ws = Workspace::new();
        ws.write_prices("AAPL", &wave(40));
        let source = CsvPriceSource::new(ws.path().join("data"));

        let bars = source.fetch("AAPL", date(2024, 1, 5), date(2024, 1, 15)).unwrap();
        assert_eq!(bars.len(), 10);
        assert_eq!(bars[0].date, date(2024, 1, 5));
        assert_eq!(bars[0].volume, 10_004);
        assert!(bars[0].high > bars[0].low);
    }
}

mod full_run {
    use super::*;

    #[test]
    fn execute_runs_from_disk() {
        let ws = Workspace::new();
        ws.write_prices("AAPL", &wave(200));
        let path = ws.write_config(RUN_INI);

        let (_, output) = cli::execute(&args(path)).unwrap();
        assert_eq!(output.bar_count, 200);
        assert_eq!(output.signals.len(), 181);
        assert_eq!(output.simulation.equity_curve.len(), 181);
    }

    #[test]
    fn disk_run_matches_in_memory_run() {
        let ws = Workspace::new();
        let closes = wave(120);
        ws.write_prices("AAPL", &closes);
        let path = ws.write_config(RUN_INI);

        let (adapter, from_disk) = cli::execute(&args(path)).unwrap();
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| make_bar(i as i64, c))
            .collect();
        let src = MockPriceSource::new().with_bars("AAPL", bars);
        let in_memory = run_pipeline(&src, &build_run_config(&adapter).unwrap()).unwrap();

        assert_eq!(from_disk.summary, in_memory.summary);
        assert_eq!(from_disk.simulation.trades, in_memory.simulation.trades);
    }

    #[test]
    fn missing_price_file_is_data_unavailable() {
        let ws = Workspace::new();
        let path = ws.write_config(RUN_INI);
        let err = cli::execute(&args(path)).err().unwrap();
        assert!(matches!(err, BandtraderError::DataUnavailable { .. }));
    }

    #[test]
    fn short_file_is_insufficient_history() {
        let ws = Workspace::new();
        ws.write_prices("AAPL", &[100.0; 10]);
        let path = ws.write_config(RUN_INI);
        let err = cli::execute(&args(path)).err().unwrap();
        assert!(matches!(err, BandtraderError::InsufficientHistory { bars: 10, .. }));
    }

    #[test]
    fn writes_html_report_and_trade_csv() {
        let ws = Workspace::new();
        let mut closes = drop_then_recover();
        closes.extend(wave(60));
        ws.write_prices("AAPL", &closes);
        let path = ws.write_config(RUN_INI);
        let (_, output) = cli::execute(&args(path)).unwrap();

        let report = ws.path().join("out/report.html");
        let trades = ws.path().join("out/trades.csv");
        HtmlReportAdapter::new().write(&output, &report).unwrap();
        CsvTradeWriter.write(&output, &trades).unwrap();

        let html = fs::read_to_string(&report).unwrap();
        assert!(html.contains("AAPL"));
        assert!(html.contains("<svg"));
        assert!(html.contains("Trade History"));

        let csv = fs::read_to_string(&trades).unwrap();
        assert_eq!(csv.lines().count(), output.simulation.trades.len() + 1);
    }

    #[test]
    fn summary_and_signal_table_render() {
        let ws = Workspace::new();
        ws.write_prices("AAPL", &drop_then_recover());
        let path = ws.write_config(RUN_INI);
        let (_, output) = cli::execute(&args(path)).unwrap();

        let summary = cli::format_summary(&output.config, &output.summary);
        assert!(summary.contains("=== AAPL"));
        assert!(summary.contains("Trades:           1"));

        let table = cli::format_signal_table(&output.signals, false);
        assert_eq!(table.lines().count(), output.signals.len() + 1);
        assert!(table.contains("STRONG_BUY"));
        assert!(table.contains("NEUTRAL"));

        let flagged = cli::format_signal_table(&output.signals, true);
        assert!(flagged.lines().count() <= table.lines().count());
    }
}
