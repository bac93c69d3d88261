//! Indicator engine: turns a bar series into per-bar indicator rows.
//!
//! The full, unfiltered table is computed first (every field optional), then
//! rows missing any of the fields the signal rules read are removed. The
//! result is a [`FilteredSeries`]; every downstream index refers to it, never
//! to the raw bar series.

use chrono::NaiveDate;

use crate::domain::indicator::bollinger::{DEFAULT_PERIOD, DEFAULT_STDDEV_MULT_X100};
use crate::domain::indicator::macd::calculate_macd_default;
use crate::domain::indicator::rsi::DEFAULT_COM;
use crate::domain::indicator::{
    calculate_bollinger, calculate_ema, calculate_rsi, calculate_sma, calculate_stddev,
    IndicatorValue,
};
use crate::domain::ohlcv::Bar;

/// Bars needed before every filtered field is defined.
pub const MIN_WARMUP_BARS: usize = DEFAULT_PERIOD;
/// Slow moving average used for regime classification.
pub const REGIME_MA_PERIOD: usize = 50;

/// One bar plus every derived column, with undefined values as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawIndicatorRow {
    pub bar: Bar,
    pub sma20: Option<f64>,
    pub std20: Option<f64>,
    pub upper_band: Option<f64>,
    pub lower_band: Option<f64>,
    pub ema12: Option<f64>,
    pub ema26: Option<f64>,
    pub ma50: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub signal_line: Option<f64>,
    pub macd_histogram: Option<f64>,
}

/// A row that survived the defined-field filter.
///
/// Only `ma50` may still be undefined; it feeds regime classification and a
/// missing value means a neutral regime.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub bar: Bar,
    pub sma20: f64,
    pub std20: f64,
    pub upper_band: f64,
    pub lower_band: f64,
    pub ema12: f64,
    pub ema26: f64,
    pub ma50: Option<f64>,
    pub rsi: f64,
    pub macd: f64,
    pub signal_line: f64,
    pub macd_histogram: f64,
}

impl IndicatorRow {
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }
}

impl RawIndicatorRow {
    fn into_defined(self) -> Option<IndicatorRow> {
        Some(IndicatorRow {
            upper_band: self.upper_band?,
            lower_band: self.lower_band?,
            rsi: self.rsi?,
            macd: self.macd?,
            signal_line: self.signal_line?,
            sma20: self.sma20?,
            std20: self.std20?,
            ema12: self.ema12?,
            ema26: self.ema26?,
            macd_histogram: self.macd_histogram?,
            ma50: self.ma50,
            bar: self.bar,
        })
    }
}

/// Indicator rows after removing every row with an undefined required field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredSeries {
    pub rows: Vec<IndicatorRow>,
    /// Rows removed by the filter (leading warm-up rows in practice).
    pub dropped: usize,
}

impl FilteredSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Computes every indicator column for `bars` without dropping anything.
pub fn compute_raw_rows(bars: &[Bar]) -> Vec<RawIndicatorRow> {
    // SMA20 is the band middle so all four band fields share one window mean
    let std20 = calculate_stddev(bars, DEFAULT_PERIOD).simple_values();
    let bollinger = calculate_bollinger(bars, DEFAULT_PERIOD, DEFAULT_STDDEV_MULT_X100);
    let ema12 = calculate_ema(bars, 12).simple_values();
    let ema26 = calculate_ema(bars, 26).simple_values();
    let ma50 = calculate_sma(bars, REGIME_MA_PERIOD).simple_values();
    let rsi = calculate_rsi(bars, DEFAULT_COM).simple_values();
    let macd = calculate_macd_default(bars);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let (upper_band, sma20, lower_band) = match &bollinger.values[i] {
                p if p.valid => match p.value {
                    IndicatorValue::Bollinger {
                        upper,
                        middle,
                        lower,
                    } => (Some(upper), Some(middle), Some(lower)),
                    _ => (None, None, None),
                },
                _ => (None, None, None),
            };
            let (line, signal, histogram) = match &macd.values[i] {
                p if p.valid => match p.value {
                    IndicatorValue::Macd {
                        line,
                        signal,
                        histogram,
                    } => (Some(line), Some(signal), Some(histogram)),
                    _ => (None, None, None),
                },
                _ => (None, None, None),
            };

            RawIndicatorRow {
                bar: bar.clone(),
                sma20,
                std20: std20[i],
                upper_band,
                lower_band,
                ema12: ema12[i],
                ema26: ema26[i],
                ma50: ma50[i],
                rsi: rsi[i],
                macd: line,
                signal_line: signal,
                macd_histogram: histogram,
            }
        })
        .collect()
}

/// Drops rows lacking any of the band, RSI or MACD fields.
pub fn filter_defined(raw: Vec<RawIndicatorRow>) -> FilteredSeries {
    let total = raw.len();
    let rows: Vec<IndicatorRow> = raw
        .into_iter()
        .filter_map(RawIndicatorRow::into_defined)
        .collect();
    FilteredSeries {
        dropped: total - rows.len(),
        rows,
    }
}

/// Raw rows followed by the defined-field filter.
pub fn compute_indicator_rows(bars: &[Bar]) -> FilteredSeries {
    let series = filter_defined(compute_raw_rows(bars));
    tracing::debug!(
        bars = bars.len(),
        rows = series.len(),
        dropped = series.dropped,
        "indicator rows computed"
    );
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::rsi::{RSI_ALL_GAINS, RSI_FLAT};
    use crate::domain::indicator::test_support::make_bars;
    use approx::assert_abs_diff_eq;

    #[test]
    fn flat_series_collapses_bands() {
        let series = compute_indicator_rows(&make_bars(&[100.0; 60]));
        assert_eq!(series.len(), 41);
        for row in &series.rows {
            assert_eq!(row.std20, 0.0);
            assert_eq!(row.sma20, 100.0);
            assert_eq!(row.upper_band, 100.0);
            assert_eq!(row.lower_band, 100.0);
            assert_eq!(row.rsi, RSI_FLAT);
        }
    }

    #[test]
    fn increasing_series_rsi_is_100() {
        let prices: Vec<f64> = (0..40).map(|i| 50.0 + i as f64).collect();
        let series = compute_indicator_rows(&make_bars(&prices));
        assert!(series.rows.iter().all(|r| r.rsi == RSI_ALL_GAINS));
    }

    #[test]
    fn filtered_length_is_input_minus_warmup() {
        let prices: Vec<f64> = (0..35).map(|i| 50.0 + i as f64 * 0.5).collect();
        let series = compute_indicator_rows(&make_bars(&prices));
        assert_eq!(series.len(), 35 - (MIN_WARMUP_BARS - 1));
        assert_eq!(series.dropped, MIN_WARMUP_BARS - 1);
    }

    #[test]
    fn first_filtered_row_is_twentieth_bar() {
        let bars = make_bars(&[100.0; 25]);
        let series = compute_indicator_rows(&bars);
        assert_eq!(series.rows[0].date(), bars[19].date);
        assert_eq!(series.rows.last().map(IndicatorRow::date), Some(bars[24].date));
    }

    #[test]
    fn short_series_filters_to_empty() {
        let series = compute_indicator_rows(&make_bars(&[100.0; 19]));
        assert!(series.is_empty());
        assert_eq!(series.dropped, 19);
    }

    #[test]
    fn ma50_is_optional_until_fifty_bars() {
        let series = compute_indicator_rows(&make_bars(&[100.0; 55]));
        // filtered row k corresponds to bar k + 19
        assert!(series.rows[29].ma50.is_none());
        assert_eq!(series.rows[30].ma50, Some(100.0));
    }

    #[test]
    fn band_ordering_and_macd_identity() {
        let prices: Vec<f64> = (0..60)
            .map(|i| 100.0 + ((i * 7) % 11) as f64 - 5.0)
            .collect();
        let series = compute_indicator_rows(&make_bars(&prices));
        for row in &series.rows {
            assert!(row.upper_band >= row.sma20 && row.sma20 >= row.lower_band);
            assert_abs_diff_eq!(row.macd, row.ema12 - row.ema26, epsilon = 1e-12);
            assert_abs_diff_eq!(row.macd_histogram, row.macd - row.signal_line, epsilon = 1e-12);
        }
    }

    #[test]
    fn band_middle_is_sma20_for_fractional_prices() {
        // fractional closes, then a flat tail long enough to fill the window
        let mut state: u64 = 7;
        let mut prices: Vec<f64> = (0..40)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                10.0 + ((state >> 33) % 400) as f64 * 0.1237
            })
            .collect();
        prices.extend([33.3; 25]);

        let series = compute_indicator_rows(&make_bars(&prices));
        for row in &series.rows {
            assert!(
                row.upper_band >= row.sma20 && row.sma20 >= row.lower_band,
                "{}: {} / {} / {}",
                row.date(),
                row.upper_band,
                row.sma20,
                row.lower_band
            );
        }
        let last = series.rows.last().unwrap();
        assert_abs_diff_eq!(last.sma20, 33.3, epsilon = 1e-9);
        assert!(last.std20 < 1e-9);
    }

    #[test]
    fn raw_rows_keep_every_bar() {
        let raw = compute_raw_rows(&make_bars(&[100.0; 5]));
        assert_eq!(raw.len(), 5);
        assert!(raw[0].rsi.is_none());
        assert!(raw[4].sma20.is_none());
        assert_eq!(raw[0].macd, Some(0.0));
    }
}
