//! End-to-end run: fetch, indicators, signals, simulation, summary.

use chrono::NaiveDate;

use crate::domain::backtest::{simulate, SimulationResult};
use crate::domain::decision::SizingRules;
use crate::domain::error::BandtraderError;
use crate::domain::indicator_frame::{compute_indicator_rows, MIN_WARMUP_BARS};
use crate::domain::metrics::Summary;
use crate::domain::ohlcv::validate_series;
use crate::domain::signal::{buy_markers, derive_signals, sell_markers, Marker, SignalConfig, SignalRow};
use crate::ports::data_port::PriceSource;

/// Shortest accepted date range in calendar days.
pub const MIN_SPAN_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub signals: SignalConfig,
    pub sizing: SizingRules,
}

impl RunConfig {
    pub fn new(symbol: &str, start_date: NaiveDate, end_date: NaiveDate, initial_capital: f64) -> Self {
        RunConfig {
            symbol: symbol.trim().to_uppercase(),
            start_date,
            end_date,
            initial_capital,
            signals: SignalConfig::default(),
            sizing: SizingRules::default(),
        }
    }

    pub fn validate(&self) -> Result<(), BandtraderError> {
        if self.symbol.trim().is_empty() {
            return Err(BandtraderError::invalid_input("symbol must not be empty"));
        }
        if self.start_date >= self.end_date {
            return Err(BandtraderError::invalid_input(format!(
                "start date {} must be before end date {}",
                self.start_date, self.end_date
            )));
        }
        let span = (self.end_date - self.start_date).num_days();
        if span < MIN_SPAN_DAYS {
            return Err(BandtraderError::invalid_input(format!(
                "date range of {} days is shorter than the {} day minimum",
                span, MIN_SPAN_DAYS
            )));
        }
        if !self.initial_capital.is_finite() || self.initial_capital < 0.0 {
            return Err(BandtraderError::invalid_input(
                "initial capital must be a non-negative number",
            ));
        }
        for (name, fraction) in self.sizing.named_fractions() {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(BandtraderError::invalid_input(format!(
                    "sizing fraction {} must be in (0, 1], got {}",
                    name, fraction
                )));
            }
        }
        Ok(())
    }
}

/// Everything a run produces, aligned with the filtered series.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub config: RunConfig,
    /// Bars returned by the source before filtering.
    pub bar_count: usize,
    pub signals: Vec<SignalRow>,
    pub simulation: SimulationResult,
    pub summary: Summary,
    pub buy_markers: Vec<Marker>,
    pub sell_markers: Vec<Marker>,
}

/// Runs the full pipeline for one symbol and date range.
pub fn run_pipeline(source: &dyn PriceSource, config: &RunConfig) -> Result<RunOutput, BandtraderError> {
    config.validate()?;

    tracing::info!(
        symbol = %config.symbol,
        start = %config.start_date,
        end = %config.end_date,
        "fetching price history"
    );
    let bars = source.fetch(&config.symbol, config.start_date, config.end_date)?;
    if bars.is_empty() {
        return Err(BandtraderError::DataUnavailable {
            symbol: config.symbol.clone(),
            start: config.start_date,
            end: config.end_date,
        });
    }
    validate_series(&bars)?;

    let insufficient = || BandtraderError::InsufficientHistory {
        symbol: config.symbol.clone(),
        bars: bars.len(),
        minimum: MIN_WARMUP_BARS,
    };
    if bars.len() < MIN_WARMUP_BARS {
        return Err(insufficient());
    }

    let filtered = compute_indicator_rows(&bars);
    if filtered.is_empty() {
        return Err(insufficient());
    }

    let signals = derive_signals(&filtered.rows, &config.signals);
    let simulation = simulate(&signals, config.initial_capital, &config.sizing);
    let summary = Summary::compute(&simulation).ok_or_else(insufficient)?;

    tracing::info!(
        symbol = %config.symbol,
        rows = signals.len(),
        trades = summary.trade_count,
        final_value = summary.final_value,
        "run complete"
    );

    Ok(RunOutput {
        config: config.clone(),
        bar_count: bars.len(),
        buy_markers: buy_markers(&signals, config.signals.rules),
        sell_markers: sell_markers(&signals, config.signals.rules),
        signals,
        simulation,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::Bar;
    use chrono::Duration;

    struct FixedSource(Vec<Bar>);

    impl PriceSource for FixedSource {
        fn fetch(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<Bar>, BandtraderError> {
            Ok(self.0.clone())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> RunConfig {
        RunConfig::new("test", date(2024, 1, 1), date(2024, 6, 1), 10_000.0)
    }

    fn flat_bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| Bar::flat(date(2024, 1, 1) + Duration::days(i as i64), 100.0, 1000))
            .collect()
    }

    #[test]
    fn new_normalises_symbol() {
        assert_eq!(RunConfig::new(" aapl ", date(2024, 1, 1), date(2024, 3, 1), 1.0).symbol, "AAPL");
    }

    #[test]
    fn rejects_empty_symbol() {
        let mut c = config();
        c.symbol = "  ".into();
        assert!(matches!(c.validate(), Err(BandtraderError::InvalidInput { .. })));
    }

    #[test]
    fn rejects_reversed_dates() {
        let c = RunConfig::new("X", date(2024, 6, 1), date(2024, 1, 1), 1.0);
        assert!(matches!(c.validate(), Err(BandtraderError::InvalidInput { .. })));
    }

    #[test]
    fn rejects_short_span() {
        let c = RunConfig::new("X", date(2024, 1, 1), date(2024, 1, 30), 1.0);
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("29 days"));
        let ok = RunConfig::new("X", date(2024, 1, 1), date(2024, 1, 31), 1.0);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn rejects_negative_capital() {
        let mut c = config();
        c.initial_capital = -1.0;
        assert!(c.validate().is_err());
        c.initial_capital = 0.0;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_bad_sizing() {
        let mut c = config();
        c.sizing.buy_bull = 1.5;
        assert!(c.validate().unwrap_err().to_string().contains("buy_bull"));
    }

    #[test]
    fn empty_source_is_data_unavailable() {
        let err = run_pipeline(&FixedSource(vec![]), &config()).unwrap_err();
        assert!(matches!(err, BandtraderError::DataUnavailable { .. }));
    }

    #[test]
    fn short_history_is_insufficient() {
        let err = run_pipeline(&FixedSource(flat_bars(19)), &config()).unwrap_err();
        match err {
            BandtraderError::InsufficientHistory { bars, minimum, .. } => {
                assert_eq!(bars, 19);
                assert_eq!(minimum, 20);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn duplicate_dates_are_invalid_input() {
        let mut bars = flat_bars(30);
        bars[10].date = bars[9].date;
        let err = run_pipeline(&FixedSource(bars), &config()).unwrap_err();
        assert!(matches!(err, BandtraderError::InvalidInput { .. }));
    }

    #[test]
    fn single_filtered_row_runs() {
        let output = run_pipeline(&FixedSource(flat_bars(20)), &config()).unwrap();
        assert_eq!(output.signals.len(), 1);
        assert_eq!(output.simulation.equity_curve.len(), 1);
        assert_eq!(output.summary.final_value, 10_000.0);
    }
}
