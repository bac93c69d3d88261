//! Builds and validates a run configuration from INI-style settings.
//!
//! Sections read:
//! - `[run]` symbol, start_date, end_date, initial_capital
//! - `[signals]` rules and the six thresholds
//! - `[sizing]` the eight trade fractions

use crate::domain::decision::SizingRules;
use crate::domain::error::BandtraderError;
use crate::domain::pipeline::RunConfig;
use crate::domain::signal::{SignalConfig, SignalRules, SignalThresholds};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

/// Reads `[run]`, `[signals]` and `[sizing]`, then validates the result.
pub fn build_run_config(config: &dyn ConfigPort) -> Result<RunConfig, BandtraderError> {
    let symbol = config
        .get_string("run", "symbol")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| missing("run", "symbol"))?;
    let start_date = parse_date(config.get_string("run", "start_date").as_deref(), "start_date")?;
    let end_date = parse_date(config.get_string("run", "end_date").as_deref(), "end_date")?;
    let initial_capital = config.get_double("run", "initial_capital", DEFAULT_INITIAL_CAPITAL);
    if initial_capital < 0.0 {
        return Err(BandtraderError::config_invalid(
            "run",
            "initial_capital",
            "initial_capital must be non-negative",
        ));
    }

    let mut run = RunConfig::new(&symbol, start_date, end_date, initial_capital);
    run.signals = build_signal_config(config)?;
    run.sizing = build_sizing_rules(config)?;
    run.validate()?;
    Ok(run)
}

pub fn build_signal_config(config: &dyn ConfigPort) -> Result<SignalConfig, BandtraderError> {
    let rules = match config.get_string("signals", "rules") {
        Some(s) => s
            .parse::<SignalRules>()
            .map_err(|reason| BandtraderError::config_invalid("signals", "rules", reason))?,
        None => SignalRules::default(),
    };

    let d = SignalThresholds::default();
    let thresholds = SignalThresholds {
        strict_rsi_buy: config.get_double("signals", "strict_rsi_buy", d.strict_rsi_buy),
        strict_rsi_sell: config.get_double("signals", "strict_rsi_sell", d.strict_rsi_sell),
        loose_rsi_buy: config.get_double("signals", "loose_rsi_buy", d.loose_rsi_buy),
        loose_rsi_sell: config.get_double("signals", "loose_rsi_sell", d.loose_rsi_sell),
        loose_band_buy: config.get_double("signals", "loose_band_buy", d.loose_band_buy),
        loose_band_sell: config.get_double("signals", "loose_band_sell", d.loose_band_sell),
    };
    validate_thresholds(&thresholds)?;

    Ok(SignalConfig { rules, thresholds })
}

pub fn build_sizing_rules(config: &dyn ConfigPort) -> Result<SizingRules, BandtraderError> {
    let d = SizingRules::default();
    let sizing = SizingRules {
        strong_buy_bull: config.get_double("sizing", "strong_buy_bull", d.strong_buy_bull),
        strong_buy_bear: config.get_double("sizing", "strong_buy_bear", d.strong_buy_bear),
        strong_buy_neutral: config.get_double("sizing", "strong_buy_neutral", d.strong_buy_neutral),
        buy_bull: config.get_double("sizing", "buy_bull", d.buy_bull),
        strong_sell_bull: config.get_double("sizing", "strong_sell_bull", d.strong_sell_bull),
        strong_sell_bear: config.get_double("sizing", "strong_sell_bear", d.strong_sell_bear),
        strong_sell_neutral: config.get_double(
            "sizing",
            "strong_sell_neutral",
            d.strong_sell_neutral,
        ),
        sell_bear: config.get_double("sizing", "sell_bear", d.sell_bear),
    };

    for (key, value) in sizing.named_fractions() {
        if !(value > 0.0 && value <= 1.0) {
            return Err(BandtraderError::config_invalid(
                "sizing",
                key,
                format!("{} must be in (0, 1]", key),
            ));
        }
    }
    Ok(sizing)
}

fn validate_thresholds(t: &SignalThresholds) -> Result<(), BandtraderError> {
    for (key, value) in [
        ("strict_rsi_buy", t.strict_rsi_buy),
        ("strict_rsi_sell", t.strict_rsi_sell),
        ("loose_rsi_buy", t.loose_rsi_buy),
        ("loose_rsi_sell", t.loose_rsi_sell),
    ] {
        if !(0.0..=100.0).contains(&value) {
            return Err(BandtraderError::config_invalid(
                "signals",
                key,
                format!("{} must be between 0 and 100", key),
            ));
        }
    }
    for (key, value) in [
        ("loose_band_buy", t.loose_band_buy),
        ("loose_band_sell", t.loose_band_sell),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(BandtraderError::config_invalid(
                "signals",
                key,
                format!("{} must be between 0 and 1", key),
            ));
        }
    }
    if t.loose_band_buy >= t.loose_band_sell {
        return Err(BandtraderError::config_invalid(
            "signals",
            "loose_band_buy",
            "loose_band_buy must be below loose_band_sell",
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, BandtraderError> {
    match value {
        None => Err(missing("run", field)),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            BandtraderError::config_invalid(
                "run",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn missing(section: &str, key: &str) -> BandtraderError {
    BandtraderError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}
