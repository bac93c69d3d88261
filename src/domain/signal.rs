//! Buy/sell signal derivation over a filtered indicator series.
//!
//! Two rule families exist:
//! - strict: band breach confirmed by RSI or a MACD crossover, producing
//!   `strong_buy` / `strong_sell`
//! - loose: any one of band position, RSI or MACD side, producing
//!   `buy` / `sell`
//!
//! [`SignalRules`] selects which families are active for a run.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::indicator_frame::IndicatorRow;

/// Band position reported when the upper and lower bands coincide.
pub const FLAT_BAND_POSITION: f64 = 0.5;

/// Which rule families produce flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalRules {
    /// Strict rules drive the strong flags, loose rules the plain flags.
    #[default]
    Tiered,
    /// Only the strong flags; `buy` and `sell` stay false.
    Strict,
    /// Only the plain flags; `strong_buy` and `strong_sell` stay false.
    Loose,
}

impl SignalRules {
    pub fn uses_strict(self) -> bool {
        matches!(self, SignalRules::Tiered | SignalRules::Strict)
    }

    pub fn uses_loose(self) -> bool {
        matches!(self, SignalRules::Tiered | SignalRules::Loose)
    }
}

impl fmt::Display for SignalRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalRules::Tiered => "tiered",
            SignalRules::Strict => "strict",
            SignalRules::Loose => "loose",
        };
        f.write_str(name)
    }
}

impl FromStr for SignalRules {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiered" => Ok(SignalRules::Tiered),
            "strict" => Ok(SignalRules::Strict),
            "loose" => Ok(SignalRules::Loose),
            other => Err(format!(
                "unknown signal rules '{}' (expected tiered, strict or loose)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalThresholds {
    pub strict_rsi_buy: f64,
    pub strict_rsi_sell: f64,
    pub loose_rsi_buy: f64,
    pub loose_rsi_sell: f64,
    pub loose_band_buy: f64,
    pub loose_band_sell: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        SignalThresholds {
            strict_rsi_buy: 35.0,
            strict_rsi_sell: 70.0,
            loose_rsi_buy: 40.0,
            loose_rsi_sell: 60.0,
            loose_band_buy: 0.15,
            loose_band_sell: 0.97,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalConfig {
    pub rules: SignalRules,
    pub thresholds: SignalThresholds,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalFlags {
    pub buy: bool,
    pub sell: bool,
    pub strong_buy: bool,
    pub strong_sell: bool,
}

impl SignalFlags {
    pub fn any(&self) -> bool {
        self.buy || self.sell || self.strong_buy || self.strong_sell
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalRow {
    pub row: IndicatorRow,
    pub flags: SignalFlags,
}

impl SignalRow {
    pub fn date(&self) -> NaiveDate {
        self.row.date()
    }

    pub fn close(&self) -> f64 {
        self.row.close()
    }
}

/// Chart marker for a signalled bar, priced at the close.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub date: NaiveDate,
    pub price: f64,
}

/// (close - lower) / (upper - lower), or [`FLAT_BAND_POSITION`] for a
/// zero-width band.
pub fn band_position(row: &IndicatorRow) -> f64 {
    let width = row.upper_band - row.lower_band;
    if width == 0.0 {
        FLAT_BAND_POSITION
    } else {
        (row.close() - row.lower_band) / width
    }
}

/// MACD moved from at-or-below the signal line to above it.
pub fn bullish_crossover(prev: Option<&IndicatorRow>, row: &IndicatorRow) -> bool {
    prev.is_some_and(|p| p.macd <= p.signal_line) && row.macd > row.signal_line
}

/// MACD moved from at-or-above the signal line to below it.
pub fn bearish_crossover(prev: Option<&IndicatorRow>, row: &IndicatorRow) -> bool {
    prev.is_some_and(|p| p.macd >= p.signal_line) && row.macd < row.signal_line
}

/// Flags for one row given the previous filtered row.
pub fn evaluate_row(
    prev: Option<&IndicatorRow>,
    row: &IndicatorRow,
    config: &SignalConfig,
) -> SignalFlags {
    let t = &config.thresholds;
    let mut flags = SignalFlags::default();

    if config.rules.uses_strict() {
        let close = row.close();
        flags.strong_buy = close < row.lower_band
            && (row.rsi < t.strict_rsi_buy || bullish_crossover(prev, row));
        flags.strong_sell = close > row.upper_band
            && (row.rsi > t.strict_rsi_sell || bearish_crossover(prev, row));
    }

    if config.rules.uses_loose() {
        let position = band_position(row);
        flags.buy =
            position <= t.loose_band_buy || row.rsi < t.loose_rsi_buy || row.macd > row.signal_line;
        flags.sell = position >= t.loose_band_sell
            || row.rsi > t.loose_rsi_sell
            || row.macd < row.signal_line;
    }

    flags
}

/// Classifies every row of a filtered series.
pub fn derive_signals(rows: &[IndicatorRow], config: &SignalConfig) -> Vec<SignalRow> {
    let signals: Vec<SignalRow> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let prev = i.checked_sub(1).map(|p| &rows[p]);
            SignalRow {
                row: row.clone(),
                flags: evaluate_row(prev, row, config),
            }
        })
        .collect();

    tracing::debug!(
        rules = %config.rules,
        rows = signals.len(),
        strong_buys = signals.iter().filter(|s| s.flags.strong_buy).count(),
        strong_sells = signals.iter().filter(|s| s.flags.strong_sell).count(),
        "signals derived"
    );
    signals
}

/// Chart markers follow the plain flags; strict-only runs fall back to the strong ones.
pub fn buy_markers(signals: &[SignalRow], rules: SignalRules) -> Vec<Marker> {
    if rules.uses_loose() {
        markers_where(signals, |f| f.buy)
    } else {
        markers_where(signals, |f| f.strong_buy)
    }
}

pub fn sell_markers(signals: &[SignalRow], rules: SignalRules) -> Vec<Marker> {
    if rules.uses_loose() {
        markers_where(signals, |f| f.sell)
    } else {
        markers_where(signals, |f| f.strong_sell)
    }
}

fn markers_where(signals: &[SignalRow], pick: impl Fn(&SignalFlags) -> bool) -> Vec<Marker> {
    signals
        .iter()
        .filter(|s| pick(&s.flags))
        .map(|s| Marker {
            date: s.date(),
            price: s.close(),
        })
        .collect()
}
