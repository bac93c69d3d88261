//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceSource;
use crate::adapters::csv_trade_writer::CsvTradeWriter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report::HtmlReportAdapter;
use crate::domain::config_validation::build_run_config;
use crate::domain::error::BandtraderError;
use crate::domain::metrics::Summary;
use crate::domain::pipeline::{run_pipeline, RunConfig, RunOutput};
use crate::domain::regime::MarketRegime;
use crate::domain::signal::SignalRow;
use crate::logging::setup_logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_REPORT_PATH: &str = "report.html";

#[derive(Parser, Debug)]
#[command(
    name = "bandtrader",
    about = "Bollinger/RSI/MACD signal generator and portfolio simulator"
)]
pub struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Config file plus per-run overrides shared by `run` and `signals`.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    #[arg(long)]
    pub symbol: Option<String>,
    /// First date, YYYY-MM-DD
    #[arg(long)]
    pub start: Option<String>,
    /// End date (exclusive), YYYY-MM-DD
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long)]
    pub capital: Option<f64>,
    /// tiered, strict or loose
    #[arg(long)]
    pub rules: Option<String>,
    /// Directory holding <SYMBOL>.csv price files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the simulation and write the report
    Run {
        #[command(flatten)]
        args: RunArgs,
        /// HTML report path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also export the trade list as CSV
        #[arg(long)]
        trades_csv: Option<PathBuf>,
    },
    /// Print the per-bar signal table
    Signals {
        #[command(flatten)]
        args: RunArgs,
        /// Only rows with at least one flag set
        #[arg(long)]
        flagged: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    setup_logging(if cli.verbose { "debug" } else { "info" });

    let result = match cli.command {
        Command::Run {
            args,
            output,
            trades_csv,
        } => run_simulation(&args, output.as_deref(), trades_csv.as_deref()),
        Command::Signals { args, flagged } => run_signals(&args, flagged),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BandtraderError> {
    FileConfigAdapter::from_file(path).map_err(|e| BandtraderError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Loads the config file and writes command-line overrides into it.
pub fn load_with_overrides(args: &RunArgs) -> Result<FileConfigAdapter, BandtraderError> {
    tracing::info!(path = %args.config.display(), "loading config");
    let mut adapter = load_config(&args.config)?;

    if let Some(symbol) = &args.symbol {
        adapter.set("run", "symbol", symbol);
    }
    if let Some(start) = &args.start {
        adapter.set("run", "start_date", start);
    }
    if let Some(end) = &args.end {
        adapter.set("run", "end_date", end);
    }
    if let Some(capital) = args.capital {
        adapter.set("run", "initial_capital", &capital.to_string());
    }
    if let Some(rules) = &args.rules {
        adapter.set("signals", "rules", rules);
    }
    if let Some(dir) = &args.data_dir {
        adapter.set("data", "dir", &dir.display().to_string());
    }
    Ok(adapter)
}

pub fn data_dir(config: &dyn ConfigPort) -> PathBuf {
    config
        .get_string("data", "dir")
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Loads, validates and runs the pipeline against the configured CSV directory.
pub fn execute(args: &RunArgs) -> Result<(FileConfigAdapter, RunOutput), BandtraderError> {
    let adapter = load_with_overrides(args)?;
    let run_config = build_run_config(&adapter)?;
    let source = CsvPriceSource::new(data_dir(&adapter));
    let output = run_pipeline(&source, &run_config)?;
    Ok((adapter, output))
}

fn run_simulation(
    args: &RunArgs,
    output_path: Option<&Path>,
    trades_csv: Option<&Path>,
) -> Result<(), BandtraderError> {
    let (adapter, output) = execute(args)?;

    println!("{}", format_summary(&output.config, &output.summary));

    let report_path = output_path
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("report", "output").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH));
    HtmlReportAdapter::new().write(&output, &report_path)?;
    println!("Report written to: {}", report_path.display());

    let csv_path = trades_csv
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("report", "trades_csv").map(PathBuf::from));
    if let Some(path) = csv_path {
        CsvTradeWriter.write(&output, &path)?;
        println!("Trades written to: {}", path.display());
    }

    Ok(())
}

fn run_signals(args: &RunArgs, flagged: bool) -> Result<(), BandtraderError> {
    let (_, output) = execute(args)?;
    print!("{}", format_signal_table(&output.signals, flagged));
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), BandtraderError> {
    let adapter = load_config(config_path)?;
    let run_config = build_run_config(&adapter)?;

    println!("Configuration OK: {}", config_path.display());
    println!("  Symbol:          {}", run_config.symbol);
    println!(
        "  Range:           {} to {} ({} days)",
        run_config.start_date,
        run_config.end_date,
        (run_config.end_date - run_config.start_date).num_days()
    );
    println!("  Initial capital: {:.2}", run_config.initial_capital);
    println!("  Signal rules:    {}", run_config.signals.rules);
    println!("  Data directory:  {}", data_dir(&adapter).display());
    Ok(())
}

pub fn format_summary(config: &RunConfig, summary: &Summary) -> String {
    let sign = if summary.profit >= 0.0 { "+" } else { "" };
    let mut out = String::new();
    out.push_str(&format!(
        "=== {} ({} to {}) ===\n",
        config.symbol, config.start_date, config.end_date
    ));
    out.push_str(&format!("Initial Capital:  ${:.2}\n", summary.initial_capital));
    out.push_str(&format!("Final Value:      ${:.2}\n", summary.final_value));
    out.push_str(&format!(
        "Profit:           {}${:.2} ({}{:.2}%)\n",
        sign, summary.profit, sign, summary.profit_pct
    ));
    out.push_str(&format!("Max Drawdown:     {:.2}%\n", summary.max_drawdown * 100.0));
    out.push_str(&format!("Cash:             ${:.2}\n", summary.cash));
    out.push_str(&format!("Shares:           {:.4}\n", summary.shares));
    out.push_str(&format!("Trades:           {}", summary.trade_count));
    out
}

pub fn format_signal_table(signals: &[SignalRow], flagged_only: bool) -> String {
    let mut out = format!(
        "{:<10} {:>10} {:>10} {:>10} {:>6} {:>9} {:>9}  {:<7}  {}\n",
        "date", "close", "lower", "upper", "rsi", "macd", "signal", "regime", "flags"
    );
    for s in signals.iter().filter(|s| !flagged_only || s.flags.any()) {
        let r = &s.row;
        let mut flags = Vec::new();
        if s.flags.strong_buy {
            flags.push("STRONG_BUY");
        }
        if s.flags.buy {
            flags.push("BUY");
        }
        if s.flags.strong_sell {
            flags.push("STRONG_SELL");
        }
        if s.flags.sell {
            flags.push("SELL");
        }
        out.push_str(&format!(
            "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>6.1} {:>9.4} {:>9.4}  {:<7}  {}\n",
            r.date(),
            r.close(),
            r.lower_band,
            r.upper_band,
            r.rsi,
            r.macd,
            r.signal_line,
            MarketRegime::classify(r.close(), r.ma50).to_string(),
            flags.join(",")
        ));
    }
    out
}
