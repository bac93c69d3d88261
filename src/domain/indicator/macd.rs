//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! All three EMAs are seeded by their first input, so every bar is valid.
//! Default parameters: fast=12, slow=26, signal=9

use crate::domain::indicator::ema::{ema_values, span_alpha};
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::{closes, Bar};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(bars: &[Bar], fast: usize, slow: usize, signal_period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    if fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries::empty(indicator_type);
    }

    let closes = closes(bars);
    let ema_fast = ema_values(&closes, span_alpha(fast));
    let ema_slow = ema_values(&closes, span_alpha(slow));

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_values(&macd_line, span_alpha(signal_period));

    let values = bars
        .iter()
        .zip(macd_line.iter().zip(&signal_line))
        .map(|(bar, (&line, &signal))| IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Macd {
                line,
                signal,
                histogram: line - signal,
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(bars: &[Bar]) -> IndicatorSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;
    use approx::assert_abs_diff_eq;

    fn macd_at(series: &IndicatorSeries, i: usize) -> (f64, f64, f64) {
        match series.values[i].value {
            IndicatorValue::Macd {
                line,
                signal,
                histogram,
            } => (line, signal, histogram),
            _ => panic!("Expected Macd value"),
        }
    }

    #[test]
    fn macd_first_bar_is_zero() {
        let series = calculate_macd_default(&make_bars(&[50.0, 55.0]));
        assert_eq!(macd_at(&series, 0), (0.0, 0.0, 0.0));
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let series = calculate_macd_default(&make_bars(&[100.0; 40]));
        for i in 0..40 {
            assert_eq!(macd_at(&series, i), (0.0, 0.0, 0.0));
        }
    }

    #[test]
    fn macd_known_step() {
        // One step of +20 from 100.
        let series = calculate_macd_default(&make_bars(&[100.0, 120.0]));
        let fast = 100.0 + 20.0 * 2.0 / 13.0;
        let slow = 100.0 + 20.0 * 2.0 / 27.0;
        let line = fast - slow;
        let signal = line * 2.0 / 10.0;
        let (l, s, h) = macd_at(&series, 1);
        assert_abs_diff_eq!(l, line, epsilon = 1e-10);
        assert_abs_diff_eq!(s, signal, epsilon = 1e-10);
        assert_abs_diff_eq!(h, line - signal, epsilon = 1e-10);
    }

    #[test]
    fn macd_rising_prices_positive_line() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let series = calculate_macd_default(&make_bars(&prices));
        let (line, signal, _) = macd_at(&series, 39);
        assert!(line > 0.0);
        assert!(line > signal);
    }

    #[test]
    fn macd_zero_period() {
        let bars = make_bars(&[1.0, 2.0]);
        assert!(calculate_macd(&bars, 0, 26, 9).values.is_empty());
    }
}
